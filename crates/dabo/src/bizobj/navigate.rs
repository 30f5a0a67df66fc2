use super::{Bizobj, Operation, ParentLink, RiPolicy};
use crate::{cursor::KeyChange, stmt::Value, Cursor, Error, Result};

use async_recursion::async_recursion;

impl Bizobj {
    pub async fn first(&mut self) -> Result<()> {
        self.navigate(Operation::First, Cursor::first).await
    }

    pub async fn prior(&mut self) -> Result<()> {
        self.navigate(Operation::Prior, Cursor::prior).await
    }

    pub async fn next(&mut self) -> Result<()> {
        self.navigate(Operation::Next, Cursor::next).await
    }

    pub async fn last(&mut self) -> Result<()> {
        self.navigate(Operation::Last, Cursor::last).await
    }

    pub async fn move_to_row_number(&mut self, row_number: usize) -> Result<()> {
        self.navigate(Operation::PointerMove, |cursor| {
            cursor.move_to_row_num(row_number)
        })
        .await
    }

    /// Moves to the row with key `pk`; a missing key lands on row 0.
    pub async fn move_to_pk(&mut self, pk: &Value) -> Result<bool> {
        self.before(Operation::PointerMove)?;
        let found = self.cursor.move_to_pk(pk);
        self.update_children().await?;
        self.after(Operation::PointerMove);
        Ok(found)
    }

    async fn navigate(
        &mut self,
        operation: Operation,
        step: impl FnOnce(&mut Cursor) -> Result<usize>,
    ) -> Result<()> {
        self.before(operation)?;
        if operation != Operation::PointerMove {
            self.before(Operation::PointerMove)?;
        }

        step(&mut self.cursor)?;
        self.update_children().await?;

        if operation != Operation::PointerMove {
            self.after(Operation::PointerMove);
        }
        self.after(operation);
        Ok(())
    }

    /// Runs the SELECT of the current cursor, then positions and requeries
    /// the children.
    #[async_recursion]
    pub async fn requery(&mut self) -> Result<()> {
        self.before(Operation::Requery)?;

        if let Some(filter) = self.child_filter() {
            self.cursor
                .sql_builder_mut()
                .set_child_filter_clause(filter);
        }

        self.cursor.requery(&[]).await?;
        self.update_children().await?;

        self.after(Operation::Requery);
        Ok(())
    }

    /// Hands the current row to every child.
    #[async_recursion]
    pub(crate) async fn update_children(&mut self) -> Result<()> {
        if self.children.is_empty() {
            return Ok(());
        }

        self.before(Operation::ChildRequery)?;

        let links: Vec<_> = self
            .children
            .iter()
            .map(|child| self.parent_link_for(child))
            .collect();

        for (child, link) in self.children.iter_mut().zip(links) {
            child.set_parent(link).await?;
        }

        self.after(Operation::ChildRequery);
        Ok(())
    }

    /// Swaps in the cursor for the parent row and requeries it unless it
    /// holds unsaved changes or added rows.
    #[async_recursion]
    async fn set_parent(&mut self, link: Option<ParentLink>) -> Result<()> {
        self.attach(link)?;

        if self.cursor.is_changed(true) || self.cursor.has_new_rows() {
            self.update_children().await
        } else {
            self.requery().await
        }
    }

    /// Adds a record: defaults are applied, the link field is filled from
    /// the parent and children are positioned under the new row.
    #[async_recursion]
    pub async fn new_record(&mut self) -> Result<()> {
        if self.link_field.is_some()
            && self.policies.insert == RiPolicy::Restrict
            && self.parent.is_none()
        {
            return Err(Error::business_rule(format!(
                "cannot add to `{}` without a parent record",
                self.data_source
            )));
        }

        self.before(Operation::New)?;
        self.cursor.new_record().await?;

        for (field, default) in &self.defaults {
            self.cursor.set_field_val(field, default.eval())?;
        }

        if let (true, Some(link_field), Some(parent)) = (
            self.fill_link_from_parent,
            &self.link_field,
            &self.parent,
        ) {
            self.cursor.set_field_val(link_field, parent.value.clone())?;
        }

        // The record counts as changed only once edited past this point
        self.cursor.reset_memento();

        self.update_children().await?;

        let new_child_on_new = self.new_child_on_new;
        for child in &mut self.children {
            if new_child_on_new || child.policies.insert == RiPolicy::Cascade {
                child.new_record().await?;
            }
        }

        self.after(Operation::New);
        Ok(())
    }

    /// Sets a field of the current row.
    ///
    /// Changing the key field is subject to the update policy: `Restrict`
    /// refuses while children have rows, `Cascade` carries the new key over
    /// to the children's link fields.
    pub fn set_field_val(&mut self, field: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();

        if field != self.key_field || self.children.is_empty() {
            return self.cursor.set_field_val(field, value);
        }

        let old = self.cursor.get_field_val(field)?.clone();

        if self.policies.update == RiPolicy::Restrict
            && self.children.iter().any(|child| child.row_count() > 0)
        {
            return Err(Error::business_rule(format!(
                "cannot change the key of `{}`: related records exist",
                self.data_source
            )));
        }

        self.cursor.set_field_val(field, value)?;

        let new = self.cursor.get_field_val(field)?.clone();
        if self.policies.update == RiPolicy::Cascade && new != old {
            let change = KeyChange { old, new };
            for child in &mut self.children {
                child.rekey_parent(&self.key_field, &change)?;
            }
        }
        Ok(())
    }

    /// Reverts the current row and the children's edits.
    pub async fn cancel(&mut self) -> Result<()> {
        self.before(Operation::Cancel)?;

        self.cursor.cancel(false);
        for child in &mut self.children {
            child.cancel_cursors();
        }
        self.update_children().await?;
        self.prune_children();

        self.after(Operation::Cancel);
        Ok(())
    }

    /// Reverts every row here and below, then requeries the children.
    pub async fn cancel_all(&mut self) -> Result<()> {
        self.before(Operation::Cancel)?;

        self.cancel_cursors();
        self.update_children().await?;
        self.prune_children();

        self.after(Operation::Cancel);
        Ok(())
    }

    pub(super) fn cancel_cursors(&mut self) {
        self.each_cursor(|cursor| cursor.cancel(true));
        for child in &mut self.children {
            child.cancel_cursors();
        }
    }
}
