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
use mysql_async::{
    prelude::{Queryable, ToValue},
    Conn, OptsBuilder, Params,
};

/// Server error codes meaning the user lacks a privilege.
const ACCESS_DENIED: &[u16] = &[
    1044, // ER_DBACCESS_DENIED_ERROR
    1045, // ER_ACCESS_DENIED_ERROR
    1142, // ER_TABLEACCESS_DENIED_ERROR
    1143, // ER_COLUMNACCESS_DENIED_ERROR
    1227, // ER_SPECIFIC_ACCESS_DENIED_ERROR
];

/// Charset number of binary strings.
const BINARY_CHARSET: u16 = 63;

#[derive(Debug, Default)]
pub struct MySQL;

impl MySQL {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Driver for MySQL {
    fn capability(&self) -> &'static Capability {
        &Capability::MYSQL
    }

    async fn connect(&self, params: &ConnectParams) -> Result<Box<dyn dabo_core::Connection>> {
        if params.host.is_empty() {
            return Err(Error::invalid_configuration(
                "no host specified for the mysql backend",
            ));
        }

        let opts = OptsBuilder::default()
            .ip_or_hostname(params.host.clone())
            .tcp_port(params.port.unwrap_or(3306))
            .user((!params.user.is_empty()).then(|| params.user.clone()))
            .pass((!params.password.is_empty()).then(|| params.password.clone()))
            .db_name((!params.database.is_empty()).then(|| params.database.clone()))
            // Report matched rather than changed rows, so an UPDATE that
            // writes identical values still counts.
            .client_found_rows(true);

        let conn = Conn::new(opts).await.map_err(Error::connection_failed)?;

        Ok(Box::new(Connection::new(conn)))
    }
}

#[derive(Debug)]
pub struct Connection {
    conn: Conn,
    transactions: TransactionManager,
}

impl Connection {
    pub fn new(conn: Conn) -> Self {
        Self {
            conn,
            transactions: TransactionManager::new(Capability::MYSQL.begin_stmt),
        }
    }

    async fn query_drop(&mut self, sql: &str) -> Result<()> {
        tracing::debug!(sql, "mysql query");
        self.conn.query_drop(sql).await.map_err(classify)
    }
}

impl From<Conn> for Connection {
    fn from(conn: Conn) -> Self {
        Self::new(conn)
    }
}

/// Maps mysql_async failures onto the core error kinds.
fn classify(err: mysql_async::Error) -> Error {
    match &err {
        mysql_async::Error::Server(server) if ACCESS_DENIED.contains(&server.code) => {
            Error::db_no_access(err)
        }
        mysql_async::Error::Io(_) => Error::connection_lost(err),
        mysql_async::Error::Driver(mysql_async::DriverError::ConnectionClosed) => {
            Error::connection_lost(err)
        }
        _ => Error::db_query(err),
    }
}

#[async_trait]
impl dabo_core::driver::Connection for Connection {
    fn capability(&self) -> &'static Capability {
        &Capability::MYSQL
    }

    async fn exec(&mut self, sql: &str, params: &[stmt::Value]) -> Result<Response> {
        tracing::debug!(sql, ?params, "mysql exec");

        let args = params
            .iter()
            .map(|param| Value::from(param.clone()).to_value())
            .collect::<Vec<_>>();
        let args = if args.is_empty() {
            Params::Empty
        } else {
            Params::Positional(args)
        };

        let mut result = self.conn.exec_iter(sql, args).await.map_err(classify)?;

        let columns: Vec<Column> = result
            .columns_ref()
            .iter()
            .map(|column| {
                let binary = column.character_set() == BINARY_CHARSET;
                let ty = value::field_type(column.column_type(), column.column_length(), binary);
                Column::new(column.name_str(), ty)
            })
            .collect();

        if columns.is_empty() {
            let count = result.affected_rows();
            result.drop_result().await.map_err(classify)?;
            return Ok(Response::count(count));
        }

        let rows: Vec<mysql_async::Row> = result.collect().await.map_err(classify)?;

        let mut result_set = ResultSet::new(columns);
        for row in rows {
            let values = row
                .unwrap_raw()
                .into_iter()
                .zip(&result_set.columns)
                .map(|(value, column)| match value {
                    Some(value) => Value::from_sql(value, column.ty).into_inner(),
                    None => stmt::Value::Null,
                })
                .collect();
            result_set.rows.push(values);
        }

        Ok(Response::values(result_set))
    }

    async fn tables(&mut self, include_system: bool) -> Result<Vec<String>> {
        let sql = if include_system {
            "SELECT table_name FROM information_schema.tables ORDER BY table_name"
        } else {
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = DATABASE() ORDER BY table_name"
        };
        self.conn.query(sql).await.map_err(classify)
    }

    async fn fields(&mut self, table: &str) -> Result<Vec<FieldInfo>> {
        let rows: Vec<(String, String, String)> = self
            .conn
            .exec(
                "SELECT column_name, column_type, column_key FROM information_schema.columns \
                 WHERE table_schema = DATABASE() AND table_name = ? ORDER BY ordinal_position",
                (table,),
            )
            .await
            .map_err(classify)?;

        if rows.is_empty() {
            return Err(Error::db_query_msg(format!("no such table: {table}")));
        }

        Ok(rows
            .into_iter()
            .map(|(name, column_type, key)| FieldInfo {
                name,
                ty: FieldType::from_native(&column_type),
                primary_key: key == "PRI",
            })
            .collect())
    }

    async fn last_insert_id(&mut self) -> Result<Option<stmt::Value>> {
        let id: Option<u64> = self
            .conn
            .query_first("SELECT LAST_INSERT_ID()")
            .await
            .map_err(classify)?;

        Ok(id
            .filter(|id| *id != 0)
            .map(|id| stmt::Value::Int(id as i64)))
    }

    async fn begin(&mut self) -> Result<()> {
        let sql = self.transactions.start();
        if let Err(err) = self.query_drop(&sql).await {
            self.transactions.reset();
            return Err(err);
        }
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        match self.transactions.commit() {
            Some(sql) => self.query_drop(&sql).await,
            None => Ok(()),
        }
    }

    async fn rollback(&mut self) -> Result<()> {
        match self.transactions.rollback() {
            Some(sql) => self.query_drop(&sql).await,
            None => Ok(()),
        }
    }
}
