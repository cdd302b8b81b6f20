use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int16Array, Int32Array,
    Int64Array, Int8Array, UInt16Array, UInt32Array, UInt64Array, UInt8Array,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::model::{CellValue, Column, Dataset};
use crate::error::AggregateError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one column per field
/// * `.json`    – `[{ "col": value, ... }, ...]` or `{ "col": [values], ... }`
/// * `.parquet` – flat scalar columns (numbers, strings, booleans)
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "loaded {} rows x {} columns from {}",
        dataset.len(),
        dataset.columns().len(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    Ok(dataset_from_json(&root)?)
}

/// Interpret a JSON value as a table.
///
/// Two layouts are accepted, the records layout of
/// `df.to_json(orient='records')`:
///
/// ```json
/// [ { "Sepal.Length": 5.1, "Species": "setosa" }, ... ]
/// ```
///
/// and the column layout of `df.to_json(orient='list')`:
///
/// ```json
/// { "Sepal.Length": [5.1, 4.9], "Species": ["setosa", "setosa"] }
/// ```
///
/// Anything else (scalars, arrays of non-objects, ragged columns) is
/// [`AggregateError::TypeInvalid`].
pub fn dataset_from_json(root: &JsonValue) -> Result<Dataset, AggregateError> {
    match root {
        JsonValue::Array(records) => dataset_from_records(records),
        JsonValue::Object(columns) => dataset_from_columns(columns),
        other => Err(AggregateError::TypeInvalid(format!(
            "expected a JSON array of records or an object of columns, got {}",
            json_kind(other)
        ))),
    }
}

fn dataset_from_records(records: &[JsonValue]) -> Result<Dataset, AggregateError> {
    let mut header: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| {
            AggregateError::TypeInvalid(format!("row {i} is {}, not an object", json_kind(rec)))
        })?;
        for key in obj.keys() {
            if !header.contains(key) {
                header.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .into_iter()
        .map(|obj| {
            header
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Dataset::from_rows(header, rows).map_err(|e| AggregateError::TypeInvalid(e.to_string()))
}

fn dataset_from_columns(columns: &Map<String, JsonValue>) -> Result<Dataset, AggregateError> {
    let columns = columns
        .iter()
        .map(|(name, values)| {
            let values = values.as_array().ok_or_else(|| {
                AggregateError::TypeInvalid(format!(
                    "column '{name}' is {}, not an array",
                    json_kind(values)
                ))
            })?;
            Ok(Column::from_cells(
                name.clone(),
                values.iter().map(json_to_cell).collect(),
            ))
        })
        .collect::<Result<Vec<_>, AggregateError>>()?;

    Dataset::new(columns).map_err(|e| AggregateError::TypeInvalid(e.to_string()))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

fn json_kind(val: &JsonValue) -> &'static str {
    match val {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one value per cell.
/// Empty cells and `NA` are missing values.
fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(Dataset::from_rows(headers, rows)?)
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() || s == "NA" {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of flat columns.
///
/// Integer and float columns become numeric, string and boolean columns
/// become categorical. Nested types are rejected. Works with files written
/// by both **Pandas** (`df.to_parquet()`) and **Polars**
/// (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let reader = builder.build().context("building parquet reader")?;

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); schema.fields().len()];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, field) in schema.fields().iter().enumerate() {
            let array = batch.column(col_idx);
            for row in 0..batch.num_rows() {
                let cell = extract_cell(array, row)
                    .with_context(|| format!("column '{}', row {row}", field.name()))?;
                cells[col_idx].push(cell);
            }
        }
    }

    let columns = schema
        .fields()
        .iter()
        .zip(cells)
        .map(|(field, cells)| Column::from_cells(field.name().clone(), cells))
        .collect();
    Ok(Dataset::new(columns)?)
}

// -- Arrow helpers --

macro_rules! downcast_value {
    ($col:expr, $ty:ty, $row:expr) => {
        $col.as_any()
            .downcast_ref::<$ty>()
            .with_context(|| format!("expected {}", stringify!($ty)))?
            .value($row)
    };
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(downcast_value!(col, Int8Array, row) as i64),
        DataType::Int16 => CellValue::Integer(downcast_value!(col, Int16Array, row) as i64),
        DataType::Int32 => CellValue::Integer(downcast_value!(col, Int32Array, row) as i64),
        DataType::Int64 => CellValue::Integer(downcast_value!(col, Int64Array, row)),
        DataType::UInt8 => CellValue::Integer(downcast_value!(col, UInt8Array, row) as i64),
        DataType::UInt16 => CellValue::Integer(downcast_value!(col, UInt16Array, row) as i64),
        DataType::UInt32 => CellValue::Integer(downcast_value!(col, UInt32Array, row) as i64),
        DataType::UInt64 => CellValue::Float(downcast_value!(col, UInt64Array, row) as f64),
        DataType::Float32 => CellValue::Float(downcast_value!(col, Float32Array, row) as f64),
        DataType::Float64 => CellValue::Float(downcast_value!(col, Float64Array, row)),
        DataType::Boolean => CellValue::Bool(downcast_value!(col, BooleanArray, row)),
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(cell)
}
