use super::Cursor;
use crate::{
    connection::is_temp_pk,
    stmt::{FieldType, Value},
    Error, Result,
};

impl Cursor {
    /// Value of `field` in the current row.
    pub fn get_field_val(&self, field: &str) -> Result<&Value> {
        let idx = self.row_number.ok_or_else(Error::no_records)?;
        self.get_field_val_at(idx, field)
    }

    pub fn get_field_val_at(&self, row_number: usize, field: &str) -> Result<&Value> {
        let row = self
            .rows
            .get(row_number)
            .ok_or_else(|| Error::row_not_found(format!("row {row_number} of `{}`", self.table)))?;

        row.get(field)
            .ok_or_else(|| Error::field_not_found(&self.table, field))
    }

    /// Original value of `field` in the current row.
    pub fn get_orig_val(&self, field: &str) -> Result<&Value> {
        let row = self.current_row().ok_or_else(Error::no_records)?;
        row.orig_val(field)
            .ok_or_else(|| Error::field_not_found(&self.table, field))
    }

    /// Sets `field` in the current row, coercing to the field's type.
    pub fn set_field_val(&mut self, field: &str, value: impl Into<Value>) -> Result<()> {
        let idx = self.row_number.ok_or_else(Error::no_records)?;
        self.set_field_val_at(idx, field, value)
    }

    pub fn set_field_val_at(
        &mut self,
        row_number: usize,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        let ty = self.field_type(field).unwrap_or_default();
        let table = &self.table;

        let row = self
            .rows
            .get_mut(row_number)
            .ok_or_else(|| Error::row_not_found(format!("row {row_number} of `{table}`")))?;

        let slot = row
            .values
            .get_mut(field)
            .ok_or_else(|| Error::field_not_found(table, field))?;

        if let Some(value) = coerce(table, field, ty, value.into()) {
            *slot = value;
        }
        Ok(())
    }
}

/// Best-effort coercion of an incoming value to the field's type.
///
/// Strings headed for date fields are kept as they are; the driver formats
/// them on save. Any other value that does not convert is logged and
/// dropped, leaving the field unchanged.
fn coerce(table: &str, field: &str, ty: FieldType, value: Value) -> Option<Value> {
    // Temp PKs stand in for keys of any type until the parent is inserted
    if is_temp_pk(&value) {
        return Some(value);
    }

    match value.clone().convert(ty) {
        Ok(value) => Some(value),
        Err(_) if ty.is_temporal() && matches!(value, Value::String(_)) => {
            tracing::warn!(table, field, %value, "keeping unparsed date string");
            Some(value)
        }
        Err(err) => {
            tracing::warn!(table, field, %value, error = %err, "ignoring value of the wrong type");
            None
        }
    }
}
