use super::Cursor;
use crate::{stmt::Value, Error, Result};

use std::cmp::Ordering;

impl Cursor {
    /// Searches the rows for `value` in `field` and moves the pointer to the
    /// match.
    ///
    /// `field` defaults to the sort field, then to the first key field. The
    /// value is coerced to the field's type first. With `near`, a miss lands
    /// on the row holding the largest value below `value`. Returns the row
    /// number found, or `None` with the pointer unchanged.
    pub fn seek(
        &mut self,
        value: impl Into<Value>,
        field: Option<&str>,
        case_sensitive: bool,
        near: bool,
    ) -> Result<Option<usize>> {
        let field = match field {
            Some(field) => field.to_string(),
            None => match (&self.sort, self.key_fields.first()) {
                (Some(order), _) => order.field.clone(),
                (None, Some(key)) => key.clone(),
                (None, None) => return Err(Error::missing_pk(&self.table)),
            },
        };

        let Some(ty) = self.field_type(&field) else {
            return Err(Error::field_not_found(&self.table, &field));
        };

        let value = value.into();
        let value = value.clone().convert(ty).unwrap_or(value);

        let projection: Vec<(&Value, usize)> = self
            .rows
            .iter()
            .enumerate()
            .filter_map(|(idx, row)| row.get(&field).map(|v| (v, idx)))
            .collect();

        let exact = projection
            .iter()
            .find(|(v, _)| v.seek_eq(&value, case_sensitive))
            .map(|(_, idx)| *idx);

        let found = match exact {
            Some(idx) => Some(idx),
            None if near => projection
                .iter()
                .filter(|(v, _)| v.sort_cmp(&value, case_sensitive) == Ordering::Less)
                .fold(None::<(&Value, usize)>, |best, &(v, idx)| match best {
                    Some((b, _)) if v.sort_cmp(b, case_sensitive) != Ordering::Greater => best,
                    _ => Some((v, idx)),
                })
                .map(|(_, idx)| idx),
            None => None,
        };

        if let Some(idx) = found {
            self.row_number = Some(idx);
        }
        Ok(found)
    }
}
