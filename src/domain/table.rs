// ============================================================
// TABLE
// ============================================================
// Normalized in-memory spreadsheet: named columns, rows of cells.
// No I/O here; the workbook reader builds tables through `Table::new`.

use chrono::{NaiveDateTime, Timelike};
use serde::{Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Rendering of a missing cell everywhere a cell is shown as text.
pub const MISSING_PLACEHOLDER: &str = "";

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    DateTime(NaiveDateTime),
    Text(String),
    Missing,
}

impl CellValue {
    /// Applies the load-time normalization: non-finite numbers and empty
    /// text collapse into `Missing`.
    pub fn normalized(self) -> Self {
        match self {
            CellValue::Number(n) if !n.is_finite() => CellValue::Missing,
            CellValue::Text(s) if s.is_empty() => CellValue::Missing,
            other => other,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Hashable identity used for distinct counts and grouping.
    pub fn key(&self) -> Option<CellKey<'_>> {
        match self {
            CellValue::Number(n) => {
                // -0.0 and 0.0 are the same value
                let n = if *n == 0.0 { 0.0 } else { *n };
                Some(CellKey::Number(n.to_bits()))
            }
            CellValue::DateTime(dt) => Some(CellKey::DateTime(*dt)),
            CellValue::Text(s) => Some(CellKey::Text(s)),
            CellValue::Missing => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::DateTime(dt) => {
                if dt.time().num_seconds_from_midnight() == 0 {
                    write!(f, "{}", dt.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))
                }
            }
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Missing => write!(f, "{}", MISSING_PLACEHOLDER),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::DateTime(_) => serializer.collect_str(self),
            CellValue::Missing => serializer.serialize_str(MISSING_PLACEHOLDER),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKey<'a> {
    Number(u64),
    DateTime(NaiveDateTime),
    Text(&'a str),
}

/// Storage type of a column, inferred from its non-missing cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnDtype {
    Numeric,
    DateTime,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub dtype: ColumnDtype,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row {
    cells: Vec<CellValue>,
}

impl Row {
    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Row>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Table {
    /// Builds a table from header names and raw rows. Rows are padded or
    /// truncated to the header width and cells are normalized. Each column
    /// gets its dtype from the values it holds. Duplicate names get `.1`,
    /// `.2` suffixes.
    pub fn new(names: Vec<String>, raw_rows: Vec<Vec<CellValue>>) -> Self {
        let names = dedupe_names(names);
        let width = names.len();

        let rows: Vec<Row> = raw_rows
            .into_iter()
            .map(|mut cells| {
                cells.resize(width, CellValue::Missing);
                Row {
                    cells: cells.into_iter().map(CellValue::normalized).collect(),
                }
            })
            .collect();

        let columns: Vec<Column> = names
            .into_iter()
            .enumerate()
            .map(|(idx, name)| Column {
                dtype: infer_dtype(rows.iter().map(|row| &row.cells[idx])),
                name,
            })
            .collect();

        let index = columns
            .iter()
            .enumerate()
            .map(|(idx, column)| (column.name.clone(), idx))
            .collect();

        Self {
            columns,
            rows,
            index,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|idx| &self.columns[idx])
    }

    /// Cell lookup by row position and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// All cells of one column, top to bottom.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().filter_map(move |row| row.get(idx))
    }

    /// Indices of columns with the given dtype, in table order.
    pub fn columns_of(&self, dtype: ColumnDtype) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.dtype == dtype)
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn head(&self, n: usize) -> &[Row] {
        &self.rows[..n.min(self.rows.len())]
    }
}

fn dedupe_names(names: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut counters: HashMap<String, usize> = HashMap::new();

    names
        .into_iter()
        .map(|name| {
            let mut candidate = name.clone();
            if seen.contains(&candidate) {
                let counter = counters.entry(name.clone()).or_insert(0);
                loop {
                    *counter += 1;
                    candidate = format!("{}.{}", name, counter);
                    if !seen.contains(&candidate) {
                        break;
                    }
                }
            }
            seen.insert(candidate.clone());
            candidate
        })
        .collect()
}

fn infer_dtype<'a>(values: impl Iterator<Item = &'a CellValue>) -> ColumnDtype {
    let mut seen = None;
    for value in values {
        let dtype = match value {
            CellValue::Missing => continue,
            CellValue::Number(_) => ColumnDtype::Numeric,
            CellValue::DateTime(_) => ColumnDtype::DateTime,
            CellValue::Text(_) => return ColumnDtype::Text,
        };
        match seen {
            None => seen = Some(dtype),
            Some(prev) if prev != dtype => return ColumnDtype::Text,
            _ => {}
        }
    }
    seen.unwrap_or(ColumnDtype::Text)
}
