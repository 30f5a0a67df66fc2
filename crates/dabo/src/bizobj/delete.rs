use super::{Bizobj, Operation, RiPolicy};
use crate::{Error, Result};

use async_recursion::async_recursion;

impl Bizobj {
    /// Deletes the current row under the delete policy, in one transaction.
    ///
    /// `Restrict` refuses while a child has rows, `Cascade` deletes the
    /// children's rows first and `Ignore` leaves them, dropping their edits.
    pub async fn delete(&mut self) -> Result<()> {
        self.delete_current(true).await
    }

    /// Deletes every row of the current cursor.
    pub async fn delete_all(&mut self) -> Result<()> {
        self.delete_rows(true).await
    }

    #[async_recursion]
    async fn delete_rows(&mut self, start_transaction: bool) -> Result<()> {
        if start_transaction {
            self.conn.begin().await?;
        }

        let mut result = Ok(());
        while self.cursor.row_count() > 0 {
            if let Err(err) = self.cursor.first() {
                result = Err(err);
                break;
            }
            if let Err(err) = self.delete_current(false).await {
                result = Err(err);
                break;
            }
        }

        self.finish(start_transaction, result).await
    }

    #[async_recursion]
    async fn delete_current(&mut self, start_transaction: bool) -> Result<()> {
        if self.cursor.row_count() == 0 {
            return Err(Error::no_records());
        }

        self.before(Operation::Delete)?;

        if self.policies.delete == RiPolicy::Restrict {
            if let Some(child) = self.children.iter().find(|child| child.row_count() > 0) {
                return Err(Error::business_rule(format!(
                    "cannot delete from `{}`: `{}` has related records",
                    self.data_source, child.data_source
                )));
            }
        }

        if start_transaction {
            self.conn.begin().await?;
        }

        let parent_key = self.current_pk().map(|pk| pk.to_key_string());
        let result = self.delete_tree().await;
        self.finish(start_transaction, result).await?;

        self.update_children().await?;
        if let Some(key) = parent_key {
            for child in &mut self.children {
                child.parked.shift_remove(&key);
            }
        }
        self.after(Operation::Delete);
        Ok(())
    }

    async fn delete_tree(&mut self) -> Result<()> {
        match self.policies.delete {
            RiPolicy::Cascade => {
                for child in &mut self.children {
                    child.delete_rows(false).await?;
                }
            }
            RiPolicy::Ignore => {
                for child in &mut self.children {
                    child.cancel_cursors();
                }
            }
            RiPolicy::Restrict => {}
        }

        self.cursor.delete(None).await
    }

    async fn finish(&self, transaction: bool, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) if transaction => self.conn.commit().await,
            Ok(()) => Ok(()),
            Err(err) => {
                if transaction {
                    if let Err(rollback) = self.conn.rollback().await {
                        tracing::warn!(error = %rollback, "rollback failed");
                    }
                }
                Err(err)
            }
        }
    }
}
