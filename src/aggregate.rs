//! Column-wise aggregation over a [`Dataset`].
//!
//! All entry points validate the whole request before computing anything:
//! the input must be tabular, every requested column must exist, and every
//! selected column must be numeric. The first failing check aborts the call.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value as JsonValue;

use crate::data::loader::dataset_from_json;
use crate::data::model::{Column, ColumnData, Dataset, Selection};
use crate::error::AggregateError;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Which aggregate to compute per column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Statistic {
    #[default]
    Mean,
    GeometricMean,
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statistic::Mean => write!(f, "mean"),
            Statistic::GeometricMean => write!(f, "geometric mean"),
        }
    }
}

/// How the geometric mean treats negative values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegativePolicy {
    /// Any value `<= 0` fails with [`AggregateError::ColumnNotPositive`].
    #[default]
    Reject,
    /// Negative values are replaced by their absolute value. Zero still fails.
    Absolute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AggregateOptions {
    /// Drop missing cells instead of letting them turn the result into `NaN`.
    pub skip_missing: bool,
    pub negatives: NegativePolicy,
}

// ---------------------------------------------------------------------------
// AggregateResult – fixed-shape output
// ---------------------------------------------------------------------------

/// One value per selected column, in selection order.
///
/// Serializes as a JSON object `{ "column": value, ... }`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregateResult {
    entries: Vec<(String, f64)>,
}

impl AggregateResult {
    pub fn get(&self, column: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AggregateResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            // JSON has no NaN; emit null like serde_json does for non-finite floats.
            if value.is_finite() {
                map.serialize_entry(name, value)?;
            } else {
                map.serialize_entry(name, &Option::<f64>::None)?;
            }
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Arithmetic mean of each named column.
pub fn column_means<S: AsRef<str>>(
    dataset: &Dataset,
    columns: &[S],
) -> Result<AggregateResult, AggregateError> {
    aggregate(dataset, columns, Statistic::Mean, AggregateOptions::default())
}

/// Geometric mean, `exp(mean(ln x))`, of each named column.
pub fn geometric_means<S: AsRef<str>>(
    dataset: &Dataset,
    columns: &[S],
    negatives: NegativePolicy,
) -> Result<AggregateResult, AggregateError> {
    let options = AggregateOptions {
        negatives,
        ..AggregateOptions::default()
    };
    aggregate(dataset, columns, Statistic::GeometricMean, options)
}

/// Column means over a loosely typed JSON input.
///
/// Fails with [`AggregateError::TypeInvalid`] before any column lookup when
/// `input` is not a records array or a column object.
pub fn column_means_value<S: AsRef<str>>(
    input: &JsonValue,
    columns: &[S],
) -> Result<AggregateResult, AggregateError> {
    let dataset = dataset_from_json(input)?;
    column_means(&dataset, columns)
}

/// Select, validate and aggregate in one call.
pub fn aggregate<S: AsRef<str>>(
    dataset: &Dataset,
    columns: &[S],
    statistic: Statistic,
    options: AggregateOptions,
) -> Result<AggregateResult, AggregateError> {
    let selection = dataset.select(columns)?;
    aggregate_selection(&selection, statistic, options)
}

/// Aggregate an already normalized selection.
pub fn aggregate_selection(
    selection: &Selection<'_>,
    statistic: Statistic,
    options: AggregateOptions,
) -> Result<AggregateResult, AggregateError> {
    let numeric = selection
        .columns()
        .iter()
        .map(|col| numeric_values(col).map(|values| (col.name.as_str(), values)))
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!(
        "computing {statistic} over {} column(s): {:?}",
        numeric.len(),
        numeric.iter().map(|(n, _)| *n).collect::<Vec<_>>()
    );

    let mut entries = Vec::with_capacity(numeric.len());
    for (name, values) in numeric {
        let value = match statistic {
            Statistic::Mean => mean(values, options.skip_missing),
            Statistic::GeometricMean => {
                geometric_mean(name, values, options.skip_missing, options.negatives)?
            }
        };
        log::debug!("{name}: n={} {statistic}={value}", values.len());
        entries.push((name.to_string(), value));
    }

    Ok(AggregateResult { entries })
}

// ---------------------------------------------------------------------------
// Per-column math
// ---------------------------------------------------------------------------

fn numeric_values(col: &Column) -> Result<&[Option<f64>], AggregateError> {
    match &col.data {
        ColumnData::Numeric(values) => Ok(values),
        ColumnData::Categorical(_) => Err(AggregateError::ColumnNotNumeric(col.name.clone())),
    }
}

/// `None` if a missing cell is present and not skipped.
fn present(values: &[Option<f64>], skip_missing: bool) -> Option<Vec<f64>> {
    if skip_missing {
        Some(values.iter().flatten().copied().collect())
    } else {
        values.iter().copied().collect()
    }
}

/// Arithmetic mean that stays finite whenever the inputs are finite.
///
/// Each term is divided by `n` before summing so partial sums never exceed
/// the largest input; a second pass adds back the rounding residual.
fn mean(values: &[Option<f64>], skip_missing: bool) -> f64 {
    let xs = match present(values, skip_missing) {
        Some(xs) if !xs.is_empty() => xs,
        _ => return f64::NAN,
    };
    let n = xs.len() as f64;
    let m: f64 = xs.iter().map(|x| x / n).sum();
    if !m.is_finite() {
        return m;
    }
    let residual: f64 = xs.iter().map(|x| x / n - m / n).sum();
    m + residual
}

fn geometric_mean(
    column: &str,
    values: &[Option<f64>],
    skip_missing: bool,
    negatives: NegativePolicy,
) -> Result<f64, AggregateError> {
    let not_positive = |value: f64| AggregateError::ColumnNotPositive {
        column: column.to_string(),
        value,
    };

    // Positivity is checked on every present value, even if a missing cell
    // will turn the result into NaN. A NaN cell is not a sign error; it
    // propagates into the result like it does for the arithmetic mean.
    let mut logs = Vec::with_capacity(values.len());
    for x in values.iter().flatten().copied() {
        let x = match negatives {
            NegativePolicy::Absolute if x < 0.0 => x.abs(),
            _ => x,
        };
        if x <= 0.0 {
            return Err(not_positive(x));
        }
        logs.push(Some(x.ln()));
    }

    let has_missing = values.iter().any(Option::is_none);
    if has_missing && !skip_missing {
        return Ok(f64::NAN);
    }
    Ok(mean(&logs, true).exp())
}
