use dabo_core::{
    async_trait,
    driver::{Capability, Connection, FieldInfo, Response},
    stmt::Value,
    Error, Result,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

/// What the wrapped connection was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecOp {
    Exec { sql: String, params: Vec<Value> },
    Begin,
    Commit,
    Rollback,
}

/// A connection wrapper that logs every statement and transaction boundary
/// for assertions.
#[derive(Debug)]
pub struct LoggingConnection {
    /// The connection that actually executes statements
    inner: Box<dyn Connection>,

    /// Shared with the test through [`crate::ExecLog`]
    ops_log: Arc<Mutex<Vec<ExecOp>>>,

    /// When set, `CREATE` statements fail as if the user lacked DDL rights
    deny_ddl: Arc<AtomicBool>,

    /// Statements starting with this prefix fail as if the link dropped
    lose_on: Arc<Mutex<Option<String>>>,
}

impl LoggingConnection {
    pub fn new(inner: Box<dyn Connection>) -> Self {
        Self {
            inner,
            ops_log: Arc::new(Mutex::new(Vec::new())),
            deny_ddl: Arc::new(AtomicBool::new(false)),
            lose_on: Arc::new(Mutex::new(None)),
        }
    }

    pub fn ops_log_handle(&self) -> Arc<Mutex<Vec<ExecOp>>> {
        self.ops_log.clone()
    }

    pub fn deny_ddl_handle(&self) -> Arc<AtomicBool> {
        self.deny_ddl.clone()
    }

    pub fn lose_on_handle(&self) -> Arc<Mutex<Option<String>>> {
        self.lose_on.clone()
    }

    fn log(&self, op: ExecOp) {
        self.ops_log.lock().unwrap().push(op);
    }
}

#[async_trait]
impl Connection for LoggingConnection {
    fn capability(&self) -> &'static Capability {
        self.inner.capability()
    }

    async fn exec(&mut self, sql: &str, params: &[Value]) -> Result<Response> {
        self.log(ExecOp::Exec {
            sql: sql.to_string(),
            params: params.to_vec(),
        });

        if self.deny_ddl.load(Ordering::SeqCst) && sql.trim_start().starts_with("CREATE") {
            return Err(Error::db_no_access(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "CREATE command denied",
            )));
        }

        let lost = self
            .lose_on
            .lock()
            .unwrap()
            .as_deref()
            .is_some_and(|prefix| sql.starts_with(prefix));
        if lost {
            return Err(Error::connection_lost(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "server closed the connection",
            )));
        }

        self.inner.exec(sql, params).await
    }

    async fn tables(&mut self, include_system: bool) -> Result<Vec<String>> {
        self.inner.tables(include_system).await
    }

    async fn fields(&mut self, table: &str) -> Result<Vec<FieldInfo>> {
        self.inner.fields(table).await
    }

    async fn last_insert_id(&mut self) -> Result<Option<Value>> {
        self.inner.last_insert_id().await
    }

    async fn pregen_pk(&mut self, table: &str, key_field: &str) -> Result<Option<Value>> {
        self.inner.pregen_pk(table, key_field).await
    }

    async fn begin(&mut self) -> Result<()> {
        self.log(ExecOp::Begin);
        self.inner.begin().await
    }

    async fn commit(&mut self) -> Result<()> {
        self.log(ExecOp::Commit);
        self.inner.commit().await
    }

    async fn rollback(&mut self) -> Result<()> {
        self.log(ExecOp::Rollback);
        self.inner.rollback().await
    }

    async fn flush(&mut self) -> Result<()> {
        self.inner.flush().await
    }
}
