use std::collections::{BTreeMap, BTreeSet};

use super::model::Dataset;
use crate::error::AggregateError;

// ---------------------------------------------------------------------------
// Row filter: which cell values are accepted per column
// ---------------------------------------------------------------------------

/// Per-column accepted values: column_name → set of display strings.
/// A column with an empty set accepts nothing.
pub type RowFilter = BTreeMap<String, BTreeSet<String>>;

/// Parse `COL=VALUE` clauses into a [`RowFilter`]. Repeating a column adds
/// alternatives for it.
pub fn parse_clauses<S: AsRef<str>>(clauses: &[S]) -> Result<RowFilter, String> {
    let mut filter = RowFilter::new();
    for clause in clauses {
        let clause = clause.as_ref();
        let (col, value) = clause
            .split_once('=')
            .ok_or_else(|| format!("filter '{clause}' is not of the form COL=VALUE"))?;
        filter
            .entry(col.trim().to_string())
            .or_default()
            .insert(value.trim().to_string());
    }
    Ok(filter)
}

/// Return indices of rows that pass every column in `filter`.
///
/// Numeric cells are compared through their display form, so `2` and `2.0`
/// both match a float cell holding `2`. Missing cells never match.
pub fn filtered_indices(dataset: &Dataset, filter: &RowFilter) -> Result<Vec<usize>, AggregateError> {
    let names: Vec<&str> = filter.keys().map(String::as_str).collect();
    let selection = dataset.select(&names)?;

    let predicates: Vec<_> = selection
        .columns()
        .iter()
        .map(|col| {
            let accepted = &filter[&col.name];
            let numeric: Vec<f64> = accepted.iter().filter_map(|v| v.parse().ok()).collect();
            (*col, accepted, numeric)
        })
        .collect();

    let indices = (0..dataset.len())
        .filter(|&row| {
            predicates.iter().all(|(col, accepted, numeric)| {
                match col.cell_text(row) {
                    Some(text) => {
                        accepted.contains(&text)
                            || text
                                .parse::<f64>()
                                .map(|v| numeric.contains(&v))
                                .unwrap_or(false)
                    }
                    None => false,
                }
            })
        })
        .collect();
    Ok(indices)
}
