use crate::{
    stmt::{FieldType, Value},
    Connection, Result,
};

use dabo_sql::stmt::{ColumnDef, CreateTable};
use indexmap::IndexMap;
use std::{
    collections::HashSet,
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

/// File the registry writes refused `CREATE TABLE` statements to.
pub const DEFAULT_QUERIES_PATH: &str = "queries.sql";

/// Definition of a table the application expects to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    name: String,
    columns: Vec<ColumnDef>,
}

impl TableDef {
    pub fn new(name: impl Into<String>) -> TableDef {
        TableDef {
            name: name.into(),
            columns: vec![],
        }
    }

    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> TableDef {
        self.columns.push(ColumnDef::new(name, ty));
        self
    }

    /// Adds a key field. Several calls build a composite key.
    pub fn key(mut self, name: impl Into<String>, ty: FieldType) -> TableDef {
        self.columns.push(ColumnDef {
            primary_key: true,
            ..ColumnDef::new(name, ty)
        });
        self
    }

    /// Adds an integer key assigned by the backend.
    pub fn auto_key(mut self, name: impl Into<String>) -> TableDef {
        self.columns.push(ColumnDef {
            primary_key: true,
            auto_increment: true,
            ..ColumnDef::new(name, FieldType::Int)
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn to_create_table(&self) -> CreateTable {
        CreateTable {
            name: self.name.clone(),
            columns: self.columns.clone(),
        }
    }
}

/// Tables created on demand when the application starts.
///
/// `ensure_tables` creates whatever the backend lacks. When the backend
/// refuses DDL, the statements go to a queries file for an administrator to
/// run, and the refusal is returned.
#[derive(Debug, Clone)]
pub struct TableRegistry {
    tables: IndexMap<String, TableDef>,
    queries_path: Option<PathBuf>,
}

impl Default for TableRegistry {
    fn default() -> Self {
        TableRegistry {
            tables: IndexMap::new(),
            queries_path: Some(PathBuf::from(DEFAULT_QUERIES_PATH)),
        }
    }
}

impl TableRegistry {
    pub fn new() -> TableRegistry {
        TableRegistry::default()
    }

    pub fn register(&mut self, table: TableDef) {
        self.tables.insert(table.name.clone(), table);
    }

    pub fn get(&self, name: &str) -> Option<&TableDef> {
        self.tables.get(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableDef> {
        self.tables.values()
    }

    pub fn queries_path(&self) -> Option<&Path> {
        self.queries_path.as_deref()
    }

    /// Where refused statements are written; `None` disables writing.
    pub fn set_queries_path(&mut self, path: Option<PathBuf>) {
        self.queries_path = path;
    }

    /// Creates the registered tables missing from the backend and returns
    /// their names.
    pub async fn ensure_tables(&self, conn: &Connection) -> Result<Vec<String>> {
        let existing: HashSet<String> = conn
            .tables(false)
            .await?
            .into_iter()
            .map(|name| name.to_lowercase())
            .collect();

        let ser = conn.serializer();
        let pending: Vec<(&str, String)> = self
            .tables
            .values()
            .filter(|table| !existing.contains(&table.name.to_lowercase()))
            .map(|table| {
                let mut params: Vec<Value> = vec![];
                let sql = ser.serialize(&table.to_create_table().into(), &mut params);
                (table.name.as_str(), sql)
            })
            .collect();

        let mut created = vec![];
        for (idx, (name, sql)) in pending.iter().enumerate() {
            match conn.exec(sql, &[]).await {
                Ok(_) => {
                    tracing::info!(table = *name, "created table");
                    created.push(name.to_string());
                }
                Err(err) if err.is_db_no_access() => {
                    let refused: Vec<&str> =
                        pending[idx..].iter().map(|(_, sql)| sql.as_str()).collect();
                    self.write_queries(conn, &refused);
                    return Err(err);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(created)
    }

    fn write_queries(&self, conn: &Connection, statements: &[&str]) {
        let Some(path) = &self.queries_path else {
            return;
        };

        let info = conn.connect_info();
        let mut text = format!(
            "#Queries for DB '{}' on host '{}':\n",
            info.database(),
            info.host()
        );
        for sql in statements {
            text.push_str(sql);
            text.push_str(";\n");
        }

        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(text.as_bytes()));

        match written {
            Ok(()) => tracing::warn!(path = %path.display(), "no DDL access; queries written"),
            Err(err) => tracing::error!(path = %path.display(), error = %err, "failed to write queries"),
        }
    }
}
