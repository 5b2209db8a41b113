//! In-memory tabular data handed out by the dataset loader
//!
//! A [`DataTable`] is column-addressable by name and row-iterable. Tables are
//! immutable once built and are shared behind `Arc` by the dataset cache.

mod value;

use std::collections::HashMap;

use chrono::NaiveDateTime;
use num_traits::ToPrimitive;

use crate::error::{Error, Result};

pub use self::value::Value;

/// One named column of cells
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    /// Build a numeric column from any primitive numeric type
    ///
    /// Values that cannot be represented as `f64` become missing.
    pub fn numeric<T: ToPrimitive>(name: impl Into<String>, values: Vec<T>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.to_f64().map(Value::Number).unwrap_or(Value::Missing))
            .collect();
        Column::new(name, values)
    }

    /// Numeric column with explicit gaps
    pub fn numeric_opt<T: ToPrimitive>(name: impl Into<String>, values: Vec<Option<T>>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.and_then(|n| n.to_f64()).map(Value::Number).unwrap_or(Value::Missing))
            .collect();
        Column::new(name, values)
    }

    pub fn text<S: Into<String>>(name: impl Into<String>, values: Vec<S>) -> Self {
        Column::new(name, values.into_iter().map(|s| Value::Text(s.into())).collect())
    }

    pub fn temporal(name: impl Into<String>, values: Vec<NaiveDateTime>) -> Self {
        Column::new(name, values.into_iter().map(Value::Timestamp).collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }
}

/// Column-oriented table
#[derive(Debug, Clone, Default)]
pub struct DataTable {
    columns: Vec<Column>,
    column_indices: HashMap<String, usize>,
    row_count: usize,
}

impl DataTable {
    /// Build a table, checking that names are unique and lengths agree
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        let mut column_indices = HashMap::with_capacity(columns.len());

        for (i, column) in columns.iter().enumerate() {
            if column.len() != row_count {
                return Err(Error::InconsistentRowCount {
                    expected: row_count,
                    found: column.len(),
                });
            }
            if column_indices.insert(column.name.clone(), i).is_some() {
                return Err(Error::DuplicateColumnName(column.name.clone()));
            }
        }

        Ok(DataTable {
            columns,
            column_indices,
            row_count,
        })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.column_indices.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.column_indices
            .get(name)
            .map(|&i| &self.columns[i])
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    /// Iterate over rows as vectors of cell references
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.row_count).map(move |row| self.columns.iter().map(|c| &c.values[row]).collect())
    }
}
