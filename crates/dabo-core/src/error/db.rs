use super::Error;

/// Error when the backend rejects a statement.
///
/// This wraps errors from the native driver libraries (rusqlite,
/// tokio-postgres, mysql_async) as well as statement-level failures detected
/// by the cursor, such as an UPDATE that matched no rows.
#[derive(Debug)]
pub(super) struct DbQueryError {
    pub(super) inner: Box<dyn std::error::Error + Send + Sync>,
}

/// Error when the backend rejects the credentials or refuses a privilege,
/// typically DDL.
#[derive(Debug)]
pub(super) struct DbNoAccessError {
    pub(super) inner: Box<dyn std::error::Error + Send + Sync>,
}

impl std::error::Error for DbQueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl std::error::Error for DbNoAccessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl core::fmt::Display for DbQueryError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        // Display the error and walk its source chain
        core::fmt::Display::fmt(&self.inner, f)?;
        let mut source = self.inner.source();
        while let Some(err) = source {
            write!(f, ": {}", err)?;
            source = err.source();
        }
        Ok(())
    }
}

impl core::fmt::Display for DbNoAccessError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "access denied: {}", self.inner)
    }
}

impl Error {
    /// Creates an error from a statement the backend rejected.
    ///
    /// This is the preferred way to convert driver-specific errors (rusqlite,
    /// tokio-postgres, mysql_async) into dabo errors.
    pub fn db_query(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::from(super::ErrorKind::DbQuery(DbQueryError {
            inner: Box::new(err),
        }))
    }

    /// Creates a statement error from a plain message.
    pub fn db_query_msg(message: impl Into<String>) -> Error {
        let message: String = message.into();
        Error::db_query(std::io::Error::other(message))
    }

    /// Returns `true` if the backend rejected a statement.
    pub fn is_db_query(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::DbQuery(_)))
    }

    /// Creates an error for rejected credentials or a missing privilege.
    pub fn db_no_access(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::from(super::ErrorKind::DbNoAccess(DbNoAccessError {
            inner: Box::new(err),
        }))
    }

    /// Returns `true` if the backend refused access.
    pub fn is_db_no_access(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::DbNoAccess(_)))
    }
}
