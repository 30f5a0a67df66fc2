use crate::{ExecLog, LoggingConnection};
use dabo::{ConnectInfo, Connection};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

/// An in-memory SQLite database whose statements are logged.
pub struct TestDb {
    pub conn: Connection,
    pub log: ExecLog,
    deny_ddl: Arc<AtomicBool>,
    lose_on: Arc<Mutex<Option<String>>>,
}

impl TestDb {
    pub async fn new() -> TestDb {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let native = dabo_driver_sqlite::Connection::in_memory().unwrap();
        let logging = LoggingConnection::new(Box::new(native));
        let log = ExecLog::new(logging.ops_log_handle());
        let deny_ddl = logging.deny_ddl_handle();
        let lose_on = logging.lose_on_handle();

        let mut info = ConnectInfo::new("sqlite").unwrap();
        info.set_database(":memory:");

        TestDb {
            conn: Connection::from_native(Box::new(logging), info),
            log,
            deny_ddl,
            lose_on,
        }
    }

    /// Runs setup statements and forgets them.
    pub async fn exec_all(&mut self, statements: &[&str]) {
        for sql in statements {
            self.conn.exec(sql, &[]).await.unwrap();
        }
        self.log.clear();
    }

    /// Makes `CREATE` statements fail with a no-access error.
    pub fn deny_ddl(&self) {
        self.deny_ddl.store(true, Ordering::SeqCst);
    }

    /// Makes statements starting with `prefix` fail with a lost connection.
    pub fn lose_connection_on(&self, prefix: &str) {
        *self.lose_on.lock().unwrap() = Some(prefix.to_string());
    }

    pub fn reconnect(&self) {
        *self.lose_on.lock().unwrap() = None;
    }

    /// `cust(id, name)` with three rows and `ord(id, cust_id, qty)` with
    /// orders for the first two customers.
    pub async fn cust_ord() -> TestDb {
        let mut db = TestDb::new().await;
        db.exec_all(&[
            "CREATE TABLE cust (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT)",
            "CREATE TABLE ord (id INTEGER PRIMARY KEY AUTOINCREMENT, cust_id INTEGER, qty INTEGER)",
            "INSERT INTO cust (name) VALUES ('Alice'), ('Bob'), ('Carol')",
            "INSERT INTO ord (cust_id, qty) VALUES (1, 5), (1, 7), (2, 1)",
        ])
        .await;
        db
    }
}
