//! Aggregation over the bundled Iris table.

use std::path::Path;

use colmeans::data::{filter, loader};
use colmeans::{column_means, geometric_means, AggregateError, Dataset, NegativePolicy};

fn iris() -> Dataset {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/iris.csv");
    loader::load_file(&path).unwrap()
}

fn round4(x: f64) -> f64 {
    (x * 1e4).round() / 1e4
}

#[test]
fn test_iris_shape() {
    let ds = iris();
    assert_eq!(ds.len(), 150);
    let names: Vec<_> = ds.column_names().collect();
    assert_eq!(
        names,
        ["Sepal.Length", "Sepal.Width", "Petal.Length", "Petal.Width", "Species"]
    );
    assert_eq!(ds.column("Species").unwrap().data.kind(), "categorical");
}

#[test]
fn test_sepal_length_mean() {
    let result = column_means(&iris(), &["Sepal.Length"]).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(round4(result.get("Sepal.Length").unwrap()), 5.8433);
}

#[test]
fn test_all_numeric_columns() {
    let result = column_means(
        &iris(),
        &["Sepal.Length", "Sepal.Width", "Petal.Length", "Petal.Width"],
    )
    .unwrap();
    assert_eq!(result.len(), 4);
    assert_eq!(round4(result.get("Sepal.Width").unwrap()), 3.0573);
    assert_eq!(round4(result.get("Petal.Length").unwrap()), 3.758);
    assert_eq!(round4(result.get("Petal.Width").unwrap()), 1.1993);
}

#[test]
fn test_species_is_not_numeric() {
    assert_eq!(
        column_means(&iris(), &["Species"]).unwrap_err(),
        AggregateError::ColumnNotNumeric("Species".into())
    );
}

#[test]
fn test_wrong_case_is_not_found() {
    assert_eq!(
        column_means(&iris(), &["petal.length"]).unwrap_err(),
        AggregateError::ColumnNotFound(vec!["petal.length".into()])
    );
}

#[test]
fn test_geometric_mean_of_sepal_length() {
    let result = geometric_means(&iris(), &["Sepal.Length"], NegativePolicy::Reject).unwrap();
    assert_eq!(round4(result.get("Sepal.Length").unwrap()), 5.7857);
}

#[test]
fn test_mean_per_species_via_filter() {
    let ds = iris();
    let f = filter::parse_clauses(&["Species=setosa"]).unwrap();
    let setosa = ds
        .take(&filter::filtered_indices(&ds, &f).unwrap())
        .unwrap();
    assert_eq!(setosa.len(), 50);

    let result = column_means(&setosa, &["Sepal.Length", "Petal.Width"]).unwrap();
    assert_eq!(round4(result.get("Sepal.Length").unwrap()), 5.006);
    assert_eq!(round4(result.get("Petal.Width").unwrap()), 0.246);
}
