use std::borrow::Cow;

/// Tracks nesting depth and generates BEGIN/SAVEPOINT/COMMIT/ROLLBACK SQL.
///
/// Each SQL driver embeds one of these and asks it for the statement to run
/// on `begin`, `commit` and `rollback`. The outermost level uses the
/// dialect's begin statement; inner levels become savepoints.
#[derive(Debug)]
pub struct TransactionManager {
    depth: u32,
    begin_stmt: &'static str,
}

impl TransactionManager {
    pub fn new(begin_stmt: &'static str) -> Self {
        Self {
            depth: 0,
            begin_stmt,
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn in_transaction(&self) -> bool {
        self.depth > 0
    }

    /// Returns the SQL to begin a transaction or create a savepoint, and
    /// increments the nesting depth.
    pub fn start(&mut self) -> Cow<'static, str> {
        let sql = if self.depth == 0 {
            Cow::Borrowed(self.begin_stmt)
        } else {
            Cow::Owned(format!("SAVEPOINT sp_{}", self.depth))
        };
        self.depth += 1;
        sql
    }

    /// Returns the SQL to commit the current transaction or release a
    /// savepoint, and decrements the nesting depth. `None` when no
    /// transaction is open.
    pub fn commit(&mut self) -> Option<Cow<'static, str>> {
        self.depth = self.depth.checked_sub(1)?;
        Some(if self.depth == 0 {
            Cow::Borrowed("COMMIT")
        } else {
            Cow::Owned(format!("RELEASE SAVEPOINT sp_{}", self.depth))
        })
    }

    /// Returns the SQL to roll back the current transaction or savepoint, and
    /// decrements the nesting depth. `None` when no transaction is open.
    pub fn rollback(&mut self) -> Option<Cow<'static, str>> {
        self.depth = self.depth.checked_sub(1)?;
        Some(if self.depth == 0 {
            Cow::Borrowed("ROLLBACK")
        } else {
            Cow::Owned(format!("ROLLBACK TO SAVEPOINT sp_{}", self.depth))
        })
    }

    /// Forgets any open transaction, e.g. after the connection dropped.
    pub fn reset(&mut self) {
        self.depth = 0;
    }
}
