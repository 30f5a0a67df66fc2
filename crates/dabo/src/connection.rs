use crate::{
    cursor::Cursor,
    driver::Capability,
    stmt::{FieldType, Value},
    ConnectInfo, Result,
};

use dabo_core::driver::{self, FieldInfo, Response};
use dabo_sql::Serializer;
use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};
use tokio::sync::Mutex;

/// Suffix marking a synthetic key assigned to a row that was not inserted yet.
pub const TEMP_PK_SUFFIX: &str = "-dabotmp";

/// A handle on one native connection.
///
/// Cloning the handle is cheap; every clone and every cursor vended from it
/// share the native connection and the session's temp-PK counter.
#[derive(Debug, Clone)]
pub struct Connection {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    native: Mutex<Box<dyn driver::Connection>>,
    capability: &'static Capability,
    info: ConnectInfo,
    temp_pk: AtomicI64,
    is_remote: bool,
}

impl Connection {
    /// Opens a connection through the backend selected in `info`.
    pub async fn connect(info: &ConnectInfo) -> Result<Connection> {
        let native = info.connect_native().await?;
        tracing::info!(
            backend = info.backend_name(),
            host = info.host(),
            database = info.database(),
            "connected"
        );
        Ok(Connection::from_native(native, info.clone()))
    }

    /// Wraps an already open native connection.
    pub fn from_native(native: Box<dyn driver::Connection>, info: ConnectInfo) -> Connection {
        let capability = native.capability();
        Connection {
            shared: Arc::new(Shared {
                native: Mutex::new(native),
                capability,
                info,
                temp_pk: AtomicI64::new(0),
                is_remote: false,
            }),
        }
    }

    pub fn capability(&self) -> &'static Capability {
        self.shared.capability
    }

    pub fn serializer(&self) -> Serializer<'static> {
        Serializer::new(self.shared.capability)
    }

    pub fn connect_info(&self) -> &ConnectInfo {
        &self.shared.info
    }

    /// True when the connection goes through a wire adapter rather than a
    /// native driver. No such adapter ships with this crate.
    pub fn is_remote(&self) -> bool {
        self.shared.is_remote
    }

    /// Vends a cursor over `table`.
    pub fn cursor(&self, table: impl Into<String>) -> Cursor {
        Cursor::new(self.clone(), table.into())
    }

    /// Returns the next temp PK of this session: `-1-dabotmp`, `-2-dabotmp`, ...
    pub fn next_temp_pk(&self) -> Value {
        let n = self.shared.temp_pk.fetch_sub(1, Ordering::Relaxed) - 1;
        Value::String(format!("{n}{TEMP_PK_SUFFIX}"))
    }

    pub async fn exec(&self, sql: &str, params: &[Value]) -> Result<Response> {
        tracing::debug!(sql, ?params, "exec");
        self.shared.native.lock().await.exec(sql, params).await
    }

    pub async fn tables(&self, include_system: bool) -> Result<Vec<String>> {
        self.shared.native.lock().await.tables(include_system).await
    }

    pub async fn fields(&self, table: &str) -> Result<Vec<FieldInfo>> {
        self.shared.native.lock().await.fields(table).await
    }

    /// Field types of `table`, keyed by field name.
    pub async fn field_types(&self, table: &str) -> Result<Vec<(String, FieldType)>> {
        Ok(self
            .fields(table)
            .await?
            .into_iter()
            .map(|field| (field.name, field.ty))
            .collect())
    }

    pub async fn last_insert_id(&self) -> Result<Option<Value>> {
        self.shared.native.lock().await.last_insert_id().await
    }

    pub async fn pregen_pk(&self, table: &str, key_field: &str) -> Result<Option<Value>> {
        self.shared
            .native
            .lock()
            .await
            .pregen_pk(table, key_field)
            .await
    }

    pub async fn begin(&self) -> Result<()> {
        tracing::info!("begin transaction");
        self.shared.native.lock().await.begin().await
    }

    pub async fn commit(&self) -> Result<()> {
        tracing::info!("commit transaction");
        self.shared.native.lock().await.commit().await
    }

    pub async fn rollback(&self) -> Result<()> {
        tracing::info!("rollback transaction");
        self.shared.native.lock().await.rollback().await
    }

    pub async fn flush(&self) -> Result<()> {
        self.shared.native.lock().await.flush().await
    }
}

/// True for keys produced by [`Connection::next_temp_pk`].
pub fn is_temp_pk(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.ends_with(TEMP_PK_SUFFIX))
}
