mod value;
pub(crate) use value::Value;

use dabo_core::{
    async_trait,
    driver::{
        transaction::TransactionManager, Capability, Column, ConnectParams, Driver, FieldInfo,
        Response, ResultSet,
    },
    stmt::{self, FieldType},
    Error, Result,
};
use rusqlite::{ffi::ErrorCode, params_from_iter, Connection as RusqliteConnection};
use std::path::Path;

/// Embedded SQLite backend. The database field of the connect parameters is
/// the file path, or `:memory:`.
#[derive(Debug, Default)]
pub struct Sqlite;

impl Sqlite {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Driver for Sqlite {
    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    async fn connect(&self, params: &ConnectParams) -> Result<Box<dyn dabo_core::Connection>> {
        let connection = match params.database.as_str() {
            "" | ":memory:" => Connection::in_memory()?,
            path => Connection::open(path)?,
        };
        Ok(Box::new(connection))
    }
}

#[derive(Debug)]
pub struct Connection {
    connection: RusqliteConnection,
    transactions: TransactionManager,
}

impl Connection {
    pub fn in_memory() -> Result<Self> {
        let connection = RusqliteConnection::open_in_memory().map_err(Error::connection_failed)?;
        Ok(Self::new(connection))
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = RusqliteConnection::open(path).map_err(Error::connection_failed)?;
        Ok(Self::new(connection))
    }

    fn new(connection: RusqliteConnection) -> Self {
        Self {
            connection,
            transactions: TransactionManager::new(Capability::SQLITE.begin_stmt),
        }
    }

    fn execute_batch(&mut self, sql: &str) -> Result<()> {
        tracing::debug!(sql, "sqlite batch");
        self.connection.execute_batch(sql).map_err(classify)
    }
}

/// Maps rusqlite failures onto the core error kinds.
fn classify(err: rusqlite::Error) -> Error {
    let code = match &err {
        rusqlite::Error::SqliteFailure(failure, _) => Some(failure.code),
        _ => None,
    };

    match code {
        Some(
            ErrorCode::PermissionDenied
            | ErrorCode::ReadOnly
            | ErrorCode::AuthorizationForStatementDenied,
        ) => Error::db_no_access(err),
        Some(ErrorCode::CannotOpen | ErrorCode::NotADatabase) => Error::connection_lost(err),
        _ => Error::db_query(err),
    }
}

#[async_trait]
impl dabo_core::driver::Connection for Connection {
    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    async fn exec(&mut self, sql: &str, params: &[stmt::Value]) -> Result<Response> {
        tracing::debug!(sql, ?params, "sqlite exec");

        let mut statement = self.connection.prepare_cached(sql).map_err(classify)?;
        let args = params.iter().cloned().map(Value::from);

        if statement.column_count() == 0 {
            let count = statement
                .execute(params_from_iter(args))
                .map_err(classify)?;
            return Ok(Response::count(count as u64));
        }

        let columns: Vec<Column> = statement
            .columns()
            .iter()
            .map(|column| {
                let ty = column
                    .decl_type()
                    .map(FieldType::from_native)
                    .unwrap_or_default();
                Column::new(column.name(), ty)
            })
            .collect();

        let mut result_set = ResultSet::new(columns);
        let mut rows = statement.query(params_from_iter(args)).map_err(classify)?;

        while let Some(row) = rows.next().map_err(classify)? {
            let mut values = Vec::with_capacity(result_set.columns.len());
            for (index, column) in result_set.columns.iter().enumerate() {
                let value = row.get_ref(index).map_err(classify)?;
                values.push(Value::from_sql(value, column.ty).into_inner());
            }
            result_set.rows.push(values);
        }

        Ok(Response::values(result_set))
    }

    async fn tables(&mut self, include_system: bool) -> Result<Vec<String>> {
        let sql = if include_system {
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name"
        } else {
            "SELECT name FROM sqlite_master WHERE type = 'table' \
             AND name NOT LIKE 'sqlite_%' ORDER BY name"
        };

        let mut statement = self.connection.prepare(sql).map_err(classify)?;
        let names = statement
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(classify)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(classify)?;
        Ok(names)
    }

    async fn fields(&mut self, table: &str) -> Result<Vec<FieldInfo>> {
        let sql = format!(
            "PRAGMA table_info({})",
            dabo_sql::Serializer::sqlite().quote_ident(table)
        );

        let mut statement = self.connection.prepare(&sql).map_err(classify)?;
        let fields = statement
            .query_map([], |row| {
                let name: String = row.get("name")?;
                let ty: String = row.get("type")?;
                let pk: i64 = row.get("pk")?;
                Ok(FieldInfo {
                    name,
                    ty: FieldType::from_native(&ty),
                    primary_key: pk > 0,
                })
            })
            .map_err(classify)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(classify)?;

        if fields.is_empty() {
            return Err(Error::db_query_msg(format!("no such table: {table}")));
        }

        Ok(fields)
    }

    async fn last_insert_id(&mut self) -> Result<Option<stmt::Value>> {
        let id = self.connection.last_insert_rowid();
        Ok((id != 0).then_some(stmt::Value::Int(id)))
    }

    async fn begin(&mut self) -> Result<()> {
        let sql = self.transactions.start();
        if let Err(err) = self.execute_batch(&sql) {
            self.transactions.reset();
            return Err(err);
        }
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        match self.transactions.commit() {
            Some(sql) => self.execute_batch(&sql),
            None => Ok(()),
        }
    }

    async fn rollback(&mut self) -> Result<()> {
        match self.transactions.rollback() {
            Some(sql) => self.execute_batch(&sql),
            None => Ok(()),
        }
    }
}
