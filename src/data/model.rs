use std::collections::BTreeSet;
use std::fmt;

use crate::error::{AggregateError, DatasetError};

// ---------------------------------------------------------------------------
// CellValue – a single loosely typed cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as read from CSV, JSON or Parquet, before the
/// owning column has been classified as numeric or categorical.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Column – one named, typed column
// ---------------------------------------------------------------------------

/// Column storage. `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ColumnData::Numeric(_) => "numeric",
            ColumnData::Categorical(_) => "categorical",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Column {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn categorical(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Column {
            name: name.into(),
            data: ColumnData::Categorical(values),
        }
    }

    /// Classify a column of loose cells.
    ///
    /// Numeric when every non-null cell is an integer or float and at least
    /// one such cell exists (or the column has no rows at all). Anything
    /// else, including all-null and boolean columns, is categorical.
    pub fn from_cells(name: impl Into<String>, cells: Vec<CellValue>) -> Self {
        let has_number = cells.iter().any(|c| c.as_f64().is_some());
        let all_numeric_or_null = cells.iter().all(|c| c.is_null() || c.as_f64().is_some());

        if cells.is_empty() || (has_number && all_numeric_or_null) {
            Column::numeric(name, cells.iter().map(CellValue::as_f64).collect())
        } else {
            let values = cells
                .into_iter()
                .map(|c| match c {
                    CellValue::Null => None,
                    CellValue::String(s) => Some(s),
                    other => Some(other.to_string()),
                })
                .collect();
            Column::categorical(name, values)
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Display form of the cell at `row`, `None` when missing.
    pub fn cell_text(&self, row: usize) -> Option<String> {
        match &self.data {
            ColumnData::Numeric(v) => v.get(row).copied().flatten().map(|x| x.to_string()),
            ColumnData::Categorical(v) => v.get(row).cloned().flatten(),
        }
    }

    /// Callers check `indices` against the row count.
    fn take(&self, indices: &[usize]) -> Column {
        let data = match &self.data {
            ColumnData::Numeric(v) => {
                ColumnData::Numeric(indices.iter().map(|&i| v[i]).collect())
            }
            ColumnData::Categorical(v) => {
                ColumnData::Categorical(indices.iter().map(|&i| v[i].clone()).collect())
            }
        };
        Column {
            name: self.name.clone(),
            data,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// A table of uniquely named, equal-length columns. Never mutated after
/// construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Dataset {
    /// Build a dataset, checking name uniqueness and equal column lengths.
    pub fn new(columns: Vec<Column>) -> Result<Self, DatasetError> {
        let mut seen = BTreeSet::new();
        let n_rows = columns.first().map(Column::len).unwrap_or(0);

        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(DatasetError::DuplicateColumn(col.name.clone()));
            }
            if col.len() != n_rows {
                return Err(DatasetError::LengthMismatch {
                    column: col.name.clone(),
                    expected: n_rows,
                    actual: col.len(),
                });
            }
        }

        Ok(Dataset { columns, n_rows })
    }

    /// Build a dataset from row-oriented cells. Short rows are padded with
    /// missing cells; extra cells are ignored.
    pub fn from_rows(header: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self, DatasetError> {
        let mut cells: Vec<Vec<CellValue>> = header
            .iter()
            .map(|_| Vec::with_capacity(rows.len()))
            .collect();

        for row in rows {
            let mut row = row.into_iter();
            for col in cells.iter_mut() {
                col.push(row.next().unwrap_or(CellValue::Null));
            }
        }

        let columns = header
            .into_iter()
            .zip(cells)
            .map(|(name, cells)| Column::from_cells(name, cells))
            .collect();
        Dataset::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Select columns by name.
    ///
    /// The result has the same shape whether one or many names are given.
    /// Names are matched case-sensitively; repeated names keep their first
    /// position. All missing names are reported together.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Selection<'_>, AggregateError> {
        let mut missing = Vec::new();
        let mut columns: Vec<&Column> = Vec::with_capacity(names.len());

        for name in names {
            let name = name.as_ref();
            match self.column(name) {
                Some(col) => {
                    if !columns.iter().any(|c| c.name == name) {
                        columns.push(col);
                    }
                }
                None => {
                    if !missing.iter().any(|m| m == name) {
                        missing.push(name.to_string());
                    }
                }
            }
        }

        if !missing.is_empty() {
            return Err(AggregateError::ColumnNotFound(missing));
        }
        Ok(Selection { columns })
    }

    /// Row subset in the given order. `None` if any index is out of range.
    pub fn take(&self, indices: &[usize]) -> Option<Dataset> {
        if indices.iter().any(|&i| i >= self.n_rows) {
            return None;
        }
        Some(Dataset {
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            n_rows: indices.len(),
        })
    }
}

// ---------------------------------------------------------------------------
// Selection – normalized column subset
// ---------------------------------------------------------------------------

/// An ordered list of borrowed columns. Always a list, even for one column.
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    columns: Vec<&'a Column>,
}

impl<'a> Selection<'a> {
    pub fn columns(&self) -> &[&'a Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(vec![
            Column::numeric("a", vec![Some(1.0), Some(2.0), Some(3.0)]),
            Column::categorical(
                "b",
                vec![Some("x".into()), Some("y".into()), Some("x".into())],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = Dataset::new(vec![
            Column::numeric("a", vec![Some(1.0)]),
            Column::numeric("a", vec![Some(2.0)]),
        ])
        .unwrap_err();
        assert_eq!(err, DatasetError::DuplicateColumn("a".into()));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = Dataset::new(vec![
            Column::numeric("a", vec![Some(1.0), Some(2.0)]),
            Column::numeric("b", vec![Some(2.0)]),
        ])
        .unwrap_err();
        assert!(matches!(err, DatasetError::LengthMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_from_cells_classification() {
        let num = Column::from_cells(
            "n",
            vec![CellValue::Integer(1), CellValue::Null, CellValue::Float(2.5)],
        );
        assert_eq!(num.data, ColumnData::Numeric(vec![Some(1.0), None, Some(2.5)]));

        let mixed = Column::from_cells("m", vec![CellValue::Integer(1), CellValue::String("a".into())]);
        assert_eq!(mixed.data.kind(), "categorical");

        let all_null = Column::from_cells("z", vec![CellValue::Null, CellValue::Null]);
        assert_eq!(all_null.data.kind(), "categorical");

        let flags = Column::from_cells("f", vec![CellValue::Bool(true)]);
        assert_eq!(flags.data, ColumnData::Categorical(vec![Some("true".into())]));

        assert_eq!(Column::from_cells("e", vec![]).data.kind(), "numeric");
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let ds = Dataset::from_rows(
            vec!["a".into(), "b".into()],
            vec![
                vec![CellValue::Integer(1), CellValue::String("x".into())],
                vec![CellValue::Integer(2)],
            ],
        )
        .unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column("b").unwrap().cell_text(1), None);
    }

    #[test]
    fn test_select_single_column_is_still_a_list() {
        let ds = sample();
        let sel = ds.select(&["a"]).unwrap();
        assert_eq!(sel.len(), 1);
        assert_eq!(sel.columns()[0].name, "a");
    }

    #[test]
    fn test_select_reports_all_missing_names() {
        let ds = sample();
        let err = ds.select(&["A", "a", "c", "A"]).unwrap_err();
        assert_eq!(err, AggregateError::ColumnNotFound(vec!["A".into(), "c".into()]));
    }

    #[test]
    fn test_select_collapses_duplicates() {
        let ds = sample();
        let sel = ds.select(&["b", "a", "b"]).unwrap();
        let names: Vec<_> = sel.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn test_take_rows() {
        let ds = sample().take(&[2, 0]).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(
            ds.column("a").unwrap().data,
            ColumnData::Numeric(vec![Some(3.0), Some(1.0)])
        );
    }

    #[test]
    fn test_take_out_of_range_is_none() {
        assert!(sample().take(&[0, 3]).is_none());
        assert_eq!(sample().take(&[]).unwrap().len(), 0);
    }
}
