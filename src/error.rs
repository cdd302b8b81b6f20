use thiserror::Error;

/// Failures raised by column selection and aggregation.
///
/// Every variant aborts the whole call; no partial results are produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregateError {
    #[error("input is not tabular: {0}")]
    TypeInvalid(String),

    #[error("column(s) not found: {}", .0.join(", "))]
    ColumnNotFound(Vec<String>),

    #[error("column '{0}' is not numeric")]
    ColumnNotNumeric(String),

    #[error("column '{column}' has non-positive value {value}")]
    ColumnNotPositive { column: String, value: f64 },
}

/// Violations of the dataset invariants at construction time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}
