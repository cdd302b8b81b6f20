//! Property tests for column aggregation
//!
//! Verifies over generated tables that:
//! - Shape: one entry per distinct requested column, whatever the width
//! - Validation: unknown names and categorical columns are always rejected
//! - Determinism: same input → same output

use colmeans::{column_means, AggregateError, Column, Dataset};
use proptest::prelude::*;

const LABEL: &str = "Species";

/// A table of `n_numeric` numeric columns `c0..` plus one categorical column.
fn table() -> impl Strategy<Value = (Dataset, Vec<Vec<f64>>)> {
    (1usize..40, 1usize..6).prop_flat_map(|(rows, n_numeric)| {
        prop::collection::vec(prop::collection::vec(-1e6f64..1e6, rows), n_numeric).prop_map(
            move |values| {
                let mut columns: Vec<Column> = values
                    .iter()
                    .enumerate()
                    .map(|(i, col)| {
                        Column::numeric(format!("c{i}"), col.iter().copied().map(Some).collect())
                    })
                    .collect();
                columns.push(Column::categorical(
                    LABEL,
                    (0..rows).map(|r| Some(format!("group{}", r % 3))).collect(),
                ));
                (Dataset::new(columns).unwrap(), values)
            },
        )
    })
}

fn numeric_names(values: &[Vec<f64>]) -> Vec<String> {
    (0..values.len()).map(|i| format!("c{i}")).collect()
}

fn naive_mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: a single-column selection yields exactly one entry, equal to
    /// that column's value inside the full selection
    #[test]
    fn prop_single_column_matches_wide_selection((ds, values) in table()) {
        let names = numeric_names(&values);
        let wide = column_means(&ds, &names).unwrap();
        prop_assert_eq!(wide.len(), names.len());

        for (name, col) in names.iter().zip(&values) {
            let single = column_means(&ds, &[name]).unwrap();
            prop_assert_eq!(single.len(), 1);
            prop_assert_eq!(single.get(name), wide.get(name));

            let mean = single.get(name).unwrap();
            prop_assert!((mean - naive_mean(col)).abs() <= 1e-6, "{} vs {}", mean, naive_mean(col));
        }
    }

    /// Property: any name absent from the table fails with ColumnNotFound
    #[test]
    fn prop_unknown_name_not_found(
        (ds, values) in table(),
        unknown in "[a-zA-Z.]{1,12}",
        position in 0usize..8,
    ) {
        prop_assume!(ds.column(&unknown).is_none());
        let mut names = numeric_names(&values);
        names.insert(position.min(names.len()), unknown.clone());

        prop_assert_eq!(
            column_means(&ds, &names).unwrap_err(),
            AggregateError::ColumnNotFound(vec![unknown])
        );
    }

    /// Property: any selection containing a categorical column fails with
    /// ColumnNotNumeric
    #[test]
    fn prop_categorical_column_not_numeric((ds, values) in table(), position in 0usize..8) {
        let mut names = numeric_names(&values);
        names.insert(position.min(names.len()), LABEL.to_string());

        prop_assert_eq!(
            column_means(&ds, &names).unwrap_err(),
            AggregateError::ColumnNotNumeric(LABEL.to_string())
        );
    }

    /// Property: aggregation is deterministic
    #[test]
    fn prop_column_means_deterministic((ds, values) in table()) {
        let names = numeric_names(&values);
        prop_assert_eq!(column_means(&ds, &names), column_means(&ds, &names));
    }
}
