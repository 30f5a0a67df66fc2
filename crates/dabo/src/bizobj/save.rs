use super::{Bizobj, Operation, ParentLink};
use crate::{Cursor, Result};

use async_recursion::async_recursion;
use indexmap::IndexMap;

/// Cursor state of a bizobj tree, taken before a save so a rollback can put
/// the rows back: new flags, temp keys, mementos and parked keys.
struct Snapshot {
    cursor: Cursor,
    current_key: String,
    parked: IndexMap<String, Cursor>,
    parent: Option<ParentLink>,
    children: Vec<Snapshot>,
}

impl Bizobj {
    /// Saves the current row and every changed child, in one transaction.
    pub async fn save(&mut self) -> Result<()> {
        self.save_tree(false, true).await
    }

    /// Saves every changed row and every changed child, in one transaction.
    pub async fn save_all(&mut self) -> Result<()> {
        self.save_tree(true, true).await
    }

    /// Saves without opening a transaction; the caller owns it.
    pub async fn save_in_transaction(&mut self, all_rows: bool) -> Result<()> {
        self.save_tree(all_rows, false).await
    }

    #[async_recursion]
    async fn save_tree(&mut self, all_rows: bool, start_transaction: bool) -> Result<()> {
        self.before(Operation::Save)?;
        self.validate(all_rows)?;

        let snapshot = if start_transaction {
            let snapshot = self.snapshot();
            self.conn.begin().await?;
            Some(snapshot)
        } else {
            None
        };

        let result = match self.save_rows(all_rows).await {
            Ok(()) if start_transaction => self.conn.commit().await,
            result => result,
        };

        if let Err(err) = result {
            if let Some(snapshot) = snapshot {
                if let Err(rollback) = self.conn.rollback().await {
                    tracing::warn!(error = %rollback, "rollback failed");
                }
                self.restore(snapshot);
            }
            return Err(err.context(format!("saving `{}`", self.data_source)));
        }

        if self.requery_child_on_save {
            for child in &mut self.children {
                child.requery().await?;
            }
        }

        self.after(Operation::Save);
        Ok(())
    }

    /// Validates the rows about to be written.
    fn validate(&self, all_rows: bool) -> Result<()> {
        if all_rows || self.is_child() {
            for cursor in self.saveable_cursors() {
                for row in cursor.rows().iter().filter(|row| row.is_changed()) {
                    self.validate_row(row)?;
                }
            }
            return Ok(());
        }

        match self.cursor.current_row() {
            Some(row) if row.is_changed() => self.validate_row(row),
            _ => Ok(()),
        }
    }

    async fn save_rows(&mut self, all_rows: bool) -> Result<()> {
        // Children write every cursor whose parent row exists in the backend
        let changes = if self.is_child() {
            let mut changes = vec![];
            if !Bizobj::is_temp_key(&self.current_key) {
                changes.extend(self.cursor.save(true).await?);
            }
            for (key, cursor) in &mut self.parked {
                if !Bizobj::is_temp_key(key) && cursor.is_changed(true) {
                    changes.extend(cursor.save(true).await?);
                }
            }
            changes
        } else {
            self.cursor.save(all_rows).await?
        };

        for change in &changes {
            tracing::debug!(data_source = %self.data_source, old = %change.old, new = %change.new, "rekey");
            for child in &mut self.children {
                child.rekey_parent(&self.key_field, change)?;
            }
        }

        for child in &mut self.children {
            if child.is_any_changed() {
                child.save_tree(true, false).await?;
            }
        }
        Ok(())
    }

    /// Cursors a child writes: those whose parent row exists in the backend.
    fn saveable_cursors(&self) -> impl Iterator<Item = &Cursor> {
        let current = (!self.is_child() || !Bizobj::is_temp_key(&self.current_key))
            .then_some(&self.cursor);
        let parked = self
            .parked
            .iter()
            .filter(|(key, _)| self.is_child() && !Bizobj::is_temp_key(key))
            .map(|(_, cursor)| cursor);
        current.into_iter().chain(parked)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            cursor: self.cursor.clone(),
            current_key: self.current_key.clone(),
            parked: self.parked.clone(),
            parent: self.parent.clone(),
            children: self.children.iter().map(Bizobj::snapshot).collect(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.cursor = snapshot.cursor;
        self.current_key = snapshot.current_key;
        self.parked = snapshot.parked;
        self.parent = snapshot.parent;

        for (child, snapshot) in self.children.iter_mut().zip(snapshot.children) {
            child.restore(snapshot);
        }
    }

    fn is_child(&self) -> bool {
        self.link_field.is_some()
    }
}
