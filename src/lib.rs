//! Column-wise mean and geometric-mean aggregation over tabular data.

pub mod aggregate;
pub mod data;
pub mod error;

pub use aggregate::{
    aggregate, column_means, column_means_value, geometric_means, AggregateOptions,
    AggregateResult, NegativePolicy, Statistic,
};
pub use data::model::{CellValue, Column, ColumnData, Dataset, Selection};
pub use error::{AggregateError, DatasetError};
