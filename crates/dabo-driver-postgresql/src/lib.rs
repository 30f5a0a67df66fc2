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
use postgres::{error::SqlState, types::ToSql};
use tokio_postgres::{Client, Config};

#[derive(Debug, Default)]
pub struct PostgreSQL;

impl PostgreSQL {
    pub fn new() -> Self {
        Self
    }

    /// Connects using a fully built [`Config`].
    pub async fn connect_with_config(config: &Config) -> Result<Connection> {
        let (client, connection) = config
            .connect(tokio_postgres::NoTls)
            .await
            .map_err(Error::connection_failed)?;

        tokio::spawn(async move {
            if let Err(err) = connection.await {
                tracing::error!(%err, "postgresql connection error");
            }
        });

        Ok(Connection::new(client))
    }
}

#[async_trait]
impl Driver for PostgreSQL {
    fn capability(&self) -> &'static Capability {
        &Capability::POSTGRESQL
    }

    async fn connect(&self, params: &ConnectParams) -> Result<Box<dyn dabo_core::Connection>> {
        if params.host.is_empty() {
            return Err(Error::invalid_configuration(
                "no host specified for the postgresql backend",
            ));
        }

        let mut config = Config::new();
        config.host(&params.host);
        config.port(params.port.unwrap_or(5432));

        if !params.database.is_empty() {
            config.dbname(&params.database);
        }

        if !params.user.is_empty() {
            config.user(&params.user);
        }

        if !params.password.is_empty() {
            config.password(&params.password);
        }

        Ok(Box::new(Self::connect_with_config(&config).await?))
    }
}

#[derive(Debug)]
pub struct Connection {
    client: Client,
    transactions: TransactionManager,
}

impl Connection {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            transactions: TransactionManager::new(Capability::POSTGRESQL.begin_stmt),
        }
    }

    async fn batch_execute(&mut self, sql: &str) -> Result<()> {
        tracing::debug!(sql, "postgresql batch");
        self.client.batch_execute(sql).await.map_err(classify)
    }
}

impl From<Client> for Connection {
    fn from(client: Client) -> Self {
        Self::new(client)
    }
}

/// Maps tokio-postgres failures onto the core error kinds.
fn classify(err: tokio_postgres::Error) -> Error {
    if err.is_closed() {
        return Error::connection_lost(err);
    }

    match err.code() {
        Some(code)
            if *code == SqlState::INSUFFICIENT_PRIVILEGE
                || *code == SqlState::INVALID_PASSWORD
                || *code == SqlState::INVALID_AUTHORIZATION_SPECIFICATION =>
        {
            Error::db_no_access(err)
        }
        _ => Error::db_query(err),
    }
}

#[async_trait]
impl dabo_core::driver::Connection for Connection {
    fn capability(&self) -> &'static Capability {
        &Capability::POSTGRESQL
    }

    async fn exec(&mut self, sql: &str, params: &[stmt::Value]) -> Result<Response> {
        tracing::debug!(sql, ?params, "postgresql exec");

        let params = params.iter().cloned().map(Value::from).collect::<Vec<_>>();
        let args = params
            .iter()
            .map(|param| param as &(dyn ToSql + Sync))
            .collect::<Vec<_>>();

        let statement = self.client.prepare(sql).await.map_err(classify)?;

        if statement.columns().is_empty() {
            let count = self
                .client
                .execute(&statement, &args)
                .await
                .map_err(classify)?;
            return Ok(Response::count(count));
        }

        let columns = statement
            .columns()
            .iter()
            .map(|column| Column::new(column.name(), value::field_type(column.type_())))
            .collect();

        let rows = self
            .client
            .query(&statement, &args)
            .await
            .map_err(classify)?;

        let mut result_set = ResultSet::new(columns);
        for row in rows {
            let mut values = Vec::with_capacity(row.len());
            for (index, column) in row.columns().iter().enumerate() {
                let value = Value::from_sql(&row, index, column).map_err(Error::db_query)?;
                values.push(value.into_inner());
            }
            result_set.rows.push(values);
        }

        Ok(Response::values(result_set))
    }

    async fn tables(&mut self, include_system: bool) -> Result<Vec<String>> {
        let sql = if include_system {
            "SELECT tablename::text FROM pg_catalog.pg_tables ORDER BY tablename"
        } else {
            "SELECT tablename::text FROM pg_catalog.pg_tables \
             WHERE schemaname NOT IN ('pg_catalog', 'information_schema') ORDER BY tablename"
        };

        let rows = self.client.query(sql, &[]).await.map_err(classify)?;
        rows.iter()
            .map(|row| row.try_get::<_, String>(0).map_err(Error::db_query))
            .collect()
    }

    async fn fields(&mut self, table: &str) -> Result<Vec<FieldInfo>> {
        let sql = "SELECT c.column_name::text, c.data_type::text, EXISTS ( \
                SELECT 1 FROM information_schema.table_constraints tc \
                JOIN information_schema.key_column_usage k \
                  ON k.constraint_name = tc.constraint_name \
                 AND k.table_schema = tc.table_schema \
                WHERE tc.constraint_type = 'PRIMARY KEY' \
                  AND tc.table_name = c.table_name \
                  AND tc.table_schema = c.table_schema \
                  AND k.column_name = c.column_name) \
            FROM information_schema.columns c \
            WHERE c.table_name = $1 AND c.table_schema = current_schema() \
            ORDER BY c.ordinal_position";

        let rows = self.client.query(sql, &[&table]).await.map_err(classify)?;
        if rows.is_empty() {
            return Err(Error::db_query_msg(format!("no such table: {table}")));
        }

        rows.iter()
            .map(|row| {
                let name: String = row.try_get(0)?;
                let ty: String = row.try_get(1)?;
                let primary_key: bool = row.try_get(2)?;
                Ok(FieldInfo {
                    name,
                    ty: FieldType::from_native(&ty),
                    primary_key,
                })
            })
            .collect::<std::result::Result<_, tokio_postgres::Error>>()
            .map_err(Error::db_query)
    }

    async fn last_insert_id(&mut self) -> Result<Option<stmt::Value>> {
        // Keys are generated ahead of the insert
        Ok(None)
    }

    async fn pregen_pk(&mut self, table: &str, key_field: &str) -> Result<Option<stmt::Value>> {
        let row = self
            .client
            .query_one(
                "SELECT nextval(pg_get_serial_sequence($1, $2))",
                &[&table, &key_field],
            )
            .await
            .map_err(classify)?;

        let id: Option<i64> = row.try_get(0).map_err(Error::db_query)?;
        Ok(id.map(stmt::Value::Int))
    }

    async fn begin(&mut self) -> Result<()> {
        let sql = self.transactions.start();
        if let Err(err) = self.batch_execute(&sql).await {
            self.transactions.reset();
            return Err(err);
        }
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        match self.transactions.commit() {
            Some(sql) => self.batch_execute(&sql).await,
            None => Ok(()),
        }
    }

    async fn rollback(&mut self) -> Result<()> {
        match self.transactions.rollback() {
            Some(sql) => self.batch_execute(&sql).await,
            None => Ok(()),
        }
    }
}
