mod capability;
pub use capability::{Capability, LimitPosition, PlaceholderStyle, QuoteStyle, StorageTypes};

mod connect_params;
pub use connect_params::ConnectParams;

mod response;
pub use response::{Column, FieldInfo, Response, ResultSet, Rows};

pub mod transaction;

use crate::{async_trait, stmt::Value, Result};

use std::fmt::Debug;

/// Opens native connections for one backend.
#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// Describes the dialect spoken by connections this driver opens.
    fn capability(&self) -> &'static Capability;

    /// Opens a native connection. Fails with `ConnectionFailed` on bad
    /// credentials or an unreachable host.
    async fn connect(&self, params: &ConnectParams) -> Result<Box<dyn Connection>>;
}

/// A native connection plus the stateful dialect shims.
///
/// Every cursor created from one `dabo::Connection` shares a single
/// implementation of this trait.
#[async_trait]
pub trait Connection: Debug + Send + 'static {
    /// Describes the dialect spoken by this connection.
    fn capability(&self) -> &'static Capability;

    /// Executes one statement. Placeholders follow the capability's
    /// [`PlaceholderStyle`].
    ///
    /// Statements producing a result set return [`Rows::Values`], including
    /// the column description when no rows matched; every other statement
    /// returns the affected row count.
    async fn exec(&mut self, sql: &str, params: &[Value]) -> Result<Response>;

    /// Lists table names, optionally including system tables.
    async fn tables(&mut self, include_system: bool) -> Result<Vec<String>>;

    /// Introspects the columns of `table`.
    async fn fields(&mut self, table: &str) -> Result<Vec<FieldInfo>>;

    /// Returns the key generated by the last INSERT on this connection, or
    /// `None` when the backend cannot report one.
    async fn last_insert_id(&mut self) -> Result<Option<Value>>;

    /// Generates the key for a row about to be inserted into `table`, for
    /// backends that cannot return it after the insert.
    async fn pregen_pk(&mut self, _table: &str, _key_field: &str) -> Result<Option<Value>> {
        Ok(None)
    }

    async fn begin(&mut self) -> Result<()>;

    async fn commit(&mut self) -> Result<()>;

    async fn rollback(&mut self) -> Result<()>;

    /// Makes outside-of-transaction writes durable on backends that need it.
    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
