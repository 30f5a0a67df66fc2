use super::Cursor;
use crate::{stmt::Value, Error, Result, Row};

use dabo_sql::stmt::{Delete, Insert, Update};
use indexmap::IndexMap;

/// A key rewritten by an insert: the temp PK a new row carried and the key
/// the backend assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyChange {
    pub old: Value,
    pub new: Value,
}

const STALE_ROW: &str = "row changed or deleted by another user";

impl Cursor {
    /// Appends a blank row and moves the pointer onto it.
    ///
    /// With `auto_populate_pk` and a single key field, the row gets the next
    /// temp PK of the session, in both the key field and the temp-PK slot.
    pub async fn new_record(&mut self) -> Result<usize> {
        if self.types.is_empty() {
            self.load_structure().await?;
        }

        let values: IndexMap<String, Value> = self
            .types
            .iter()
            .map(|(field, ty)| (field.clone(), ty.blank()))
            .collect();

        let mut row = Row {
            values,
            is_new: true,
            seq: self.next_seq(),
            ..Row::default()
        };

        if let (true, [key]) = (self.auto_populate_pk, &self.key_fields[..]) {
            let temp_pk = self.conn.next_temp_pk();
            row.values.insert(key.clone(), temp_pk.clone());
            row.temp_pk = Some(temp_pk);
        }

        row.set_memento(&self.non_update_fields);
        self.rows.push(row);

        let idx = self.rows.len() - 1;
        self.row_number = Some(idx);
        tracing::debug!(table = %self.table, row = idx, "new record");
        Ok(idx)
    }

    /// Retakes the memento of the current row, so `is_changed` measures edits
    /// from its present values.
    pub(crate) fn reset_memento(&mut self) {
        if let Some(idx) = self.row_number {
            self.rows[idx].set_memento(&self.non_update_fields);
        }
    }

    /// Rewrites `field` from `change.old` to `change.new` in every row holding
    /// the old value. New rows take the value into their memento too, so a
    /// new row nobody edited stays unchanged.
    pub(crate) fn relink(&mut self, field: &str, change: &KeyChange) -> Result<()> {
        let old = change.old.to_key_string();

        for idx in 0..self.rows.len() {
            if self.get_field_val_at(idx, field)?.to_key_string() != old {
                continue;
            }

            if self.rows[idx].is_new {
                self.rows[idx].rebase(field, change.new.clone());
            } else {
                self.set_field_val_at(idx, field, change.new.clone())?;
            }
        }
        Ok(())
    }

    /// Reverts the current row, or every row with `all_rows`, to its
    /// memento. Unsaved new rows are dropped.
    pub fn cancel(&mut self, all_rows: bool) {
        let targets: Vec<usize> = if all_rows {
            (0..self.rows.len()).collect()
        } else {
            self.row_number.into_iter().collect()
        };

        let pointer = self.row_number.unwrap_or(0);
        let mut removed_before = 0;

        for &idx in targets.iter().rev() {
            let row = &mut self.rows[idx];
            if row.is_new {
                self.rows.remove(idx);
                if idx < pointer {
                    removed_before += 1;
                }
                continue;
            }

            if let Some(memento) = &row.memento {
                for (field, value) in memento.values() {
                    row.values.insert(field.clone(), value.clone());
                }
            }
        }

        self.clamp_pointer(pointer - removed_before);
    }

    /// Deletes the current row, or the row at `row_number`.
    ///
    /// A new row is only dropped from memory. Any other row is deleted from
    /// the backend by its original key first.
    pub async fn delete(&mut self, row_number: Option<usize>) -> Result<()> {
        if self.rows.is_empty() {
            return Err(Error::no_records());
        }

        let idx = row_number
            .or(self.row_number)
            .filter(|&idx| idx < self.rows.len())
            .ok_or_else(|| Error::row_not_found(format!("row to delete in `{}`", self.table)))?;

        if !self.rows[idx].is_new {
            let ser = self.conn.serializer();
            let stmt = Delete {
                table: self.table.clone(),
                filter: self.pk_where(&self.rows[idx])?,
            };

            let mut params: Vec<Value> = vec![];
            let sql = ser.serialize(&stmt.into(), &mut params);
            let response = self.conn.exec(&sql, &params).await?;

            if !ser.no_results_on_delete() && response.row_count() == 0 {
                tracing::warn!(table = %self.table, sql, "delete matched no row");
                return Err(Error::db_query_msg(STALE_ROW));
            }
        }

        self.rows.remove(idx);
        let pointer = match self.row_number {
            Some(current) if current > idx => current - 1,
            Some(current) => current,
            None => 0,
        };
        self.clamp_pointer(pointer);
        Ok(())
    }

    /// Writes the current row, or every changed row with `all_rows`, to the
    /// backend.
    ///
    /// Returns the keys rewritten by inserts that replaced a temp PK.
    pub async fn save(&mut self, all_rows: bool) -> Result<Vec<KeyChange>> {
        let targets: Vec<usize> = if all_rows {
            (0..self.rows.len()).collect()
        } else {
            self.row_number.into_iter().collect()
        };

        let mut changes = vec![];
        for idx in targets {
            if !self.rows[idx].is_changed() {
                continue;
            }

            if self.rows[idx].is_new {
                changes.extend(self.insert_row(idx).await?);
            } else {
                self.update_row(idx).await?;
            }
        }
        Ok(changes)
    }

    async fn insert_row(&mut self, idx: usize) -> Result<Option<KeyChange>> {
        let ser = self.conn.serializer();
        let single_key = match &self.key_fields[..] {
            [key] if self.auto_populate_pk => Some(key.clone()),
            _ => None,
        };
        let old_key = self.rows[idx].temp_pk.clone();

        let mut new_key = None;
        if let (Some(key), true) = (&single_key, ser.capability().pregen_pk) {
            new_key = self.conn.pregen_pk(&self.table, key).await?;
            if let Some(pk) = &new_key {
                self.rows[idx].values.insert(key.clone(), pk.clone());
            }
        }

        let (columns, values): (Vec<_>, Vec<_>) = self.rows[idx]
            .diff()
            .into_iter()
            .filter(|(field, _)| !self.non_update_fields.contains(field))
            .filter(|(field, _)| new_key.is_some() || single_key.as_ref() != Some(field))
            .unzip();

        let stmt = Insert {
            table: self.table.clone(),
            columns,
            values,
        };
        let mut params: Vec<Value> = vec![];
        let sql = ser.serialize(&stmt.into(), &mut params);
        self.conn.exec(&sql, &params).await?;

        if let (Some(key), None) = (&single_key, &new_key) {
            new_key = self.conn.last_insert_id().await?;
            if let Some(pk) = &new_key {
                self.rows[idx].values.insert(key.clone(), pk.clone());
            }
        }

        let row = &mut self.rows[idx];
        row.is_new = false;
        if new_key.is_some() {
            row.temp_pk = new_key.clone();
        }
        row.set_memento(&self.non_update_fields);

        tracing::debug!(table = %self.table, key = ?new_key, "inserted");
        Ok(old_key.zip(new_key).map(|(old, new)| KeyChange { old, new }))
    }

    async fn update_row(&mut self, idx: usize) -> Result<()> {
        let ser = self.conn.serializer();
        let assignments: Vec<(String, Value)> = self.rows[idx]
            .diff()
            .into_iter()
            .filter(|(field, _)| !self.non_update_fields.contains(field))
            .collect();

        if !assignments.is_empty() {
            let stmt = Update {
                table: self.table.clone(),
                assignments,
                filter: self.pk_where(&self.rows[idx])?,
            };
            let mut params: Vec<Value> = vec![];
            let sql = ser.serialize(&stmt.into(), &mut params);
            let response = self.conn.exec(&sql, &params).await?;

            if !ser.no_results_on_save() && response.row_count() == 0 {
                tracing::warn!(table = %self.table, sql, "update matched no row");
                return Err(Error::db_query_msg(STALE_ROW));
            }
        }

        self.rows[idx].set_memento(&self.non_update_fields);
        Ok(())
    }

    /// `[prefix]key = literal` for every key field, joined with AND. Values
    /// come from the memento so an edited key still matches its stored row.
    pub(crate) fn pk_where(&self, row: &Row) -> Result<String> {
        if self.key_fields.is_empty() {
            return Err(Error::missing_pk(&self.table));
        }

        let ser = self.conn.serializer();
        let prefix = ser.where_table_prefix(&self.table);

        let terms = self
            .key_fields
            .iter()
            .map(|field| {
                let value = row
                    .orig_val(field)
                    .ok_or_else(|| Error::field_not_found(&self.table, field))?;
                Ok(match value {
                    Value::Null => format!("{prefix}{field} IS NULL"),
                    value => format!("{prefix}{field} = {}", ser.literal(value)),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(terms.join(" AND "))
    }
}
