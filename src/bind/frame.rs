use std::collections::HashMap;

use crate::bind::conditionals::Conditionals;
use crate::error::{Error, Result};
use crate::field::{FieldId, FieldSchema, FieldSet};
use crate::table::{Column, DataTable, Value};

/// The rows of a table one spec binds against
///
/// Holds the resolved columns of the spec's fields and the surviving row
/// positions after conditionals and missing-value filtering.
#[derive(Debug)]
pub(crate) struct Frame<'a> {
    columns: HashMap<FieldId, (&'a FieldSchema, &'a Column)>,
    rows: Vec<usize>,
}

impl<'a> Frame<'a> {
    pub(crate) fn new(
        table: &'a DataTable,
        fields: &'a FieldSet,
        ids: &[FieldId],
        conditionals: &Conditionals,
    ) -> Result<Self> {
        let mut columns = HashMap::new();
        for &id in ids.iter().chain(conditionals.field_ids().iter()) {
            let schema = fields.get(id)?;
            columns.insert(id, (schema, table.column(&schema.name)?));
        }

        let cell = |id: FieldId, row: usize| columns.get(&id).and_then(|(_, c)| c.get(row));

        let rows = (0..table.row_count())
            .filter(|&row| conditionals.is_empty() || conditionals.matches(|id| cell(id, row)))
            .filter(|&row| {
                ids.iter()
                    .all(|&id| cell(id, row).map(|v| !v.is_missing()).unwrap_or(false))
            })
            .collect();

        Ok(Frame { columns, rows })
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column(&self, id: FieldId) -> Result<&(&'a FieldSchema, &'a Column)> {
        self.columns.get(&id).ok_or(Error::InvalidFieldReference(id))
    }

    pub(crate) fn field(&self, id: FieldId) -> Result<&'a FieldSchema> {
        Ok(self.column(id)?.0)
    }

    /// Cells of a field in frame row order
    pub(crate) fn cells(&self, id: FieldId) -> Result<Vec<&'a Value>> {
        let (_, column) = *self.column(id)?;
        Ok(self.rows.iter().filter_map(|&row| column.get(row)).collect())
    }

    /// Numeric view of a field in frame row order
    pub(crate) fn numbers(&self, id: FieldId) -> Result<Vec<f64>> {
        let (schema, column) = *self.column(id)?;
        self.rows
            .iter()
            .map(|&row| {
                column.get(row).and_then(Value::as_f64).ok_or_else(|| {
                    Error::InvalidInput(format!(
                        "Field '{}' has a non-numeric value in row {}",
                        schema.name, row
                    ))
                })
            })
            .collect()
    }
}
