mod encoding;
pub use encoding::Encoding;

mod fields;
mod navigate;

mod seek;

mod sort;
pub use sort::{SortDirection, SortOrder};

mod write;
pub use write::KeyChange;

use crate::{
    stmt::{FieldType, Value},
    Connection, Result, Row,
};

use dabo_core::{
    driver::{Column, ResultSet, Rows},
    Error,
};
use dabo_sql::SqlBuilder;
use indexmap::IndexMap;

/// One-table CRUD over an in-memory result set.
///
/// A cursor owns the rows fetched by its last query, the row pointer, the
/// clause buffers of its SELECT and the sort state. Writes (INSERT, UPDATE,
/// DELETE) and side queries go through the shared connection without touching
/// the result set.
#[derive(Debug, Clone)]
pub struct Cursor {
    conn: Connection,
    table: String,
    key_fields: Vec<String>,
    auto_populate_pk: bool,
    restore_position: bool,
    encoding: Encoding,
    builder: SqlBuilder,

    rows: Vec<Row>,
    row_number: Option<usize>,
    next_seq: u64,

    /// Description of the last result set
    columns: Vec<Column>,
    types: IndexMap<String, FieldType>,
    non_update_fields: Vec<String>,

    /// Field and FROM clauses the non-update fields were computed for
    probed_clauses: Option<(String, String)>,

    sort: Option<SortOrder>,
    last_sql: String,
    last_params: Vec<Value>,
}

impl Cursor {
    pub(crate) fn new(conn: Connection, table: String) -> Cursor {
        Cursor {
            conn,
            table,
            key_fields: vec![],
            auto_populate_pk: true,
            restore_position: false,
            encoding: Encoding::default(),
            builder: SqlBuilder::new(),
            rows: vec![],
            row_number: None,
            next_seq: 0,
            columns: vec![],
            types: IndexMap::new(),
            non_update_fields: vec![],
            probed_clauses: None,
            sort: None,
            last_sql: String::new(),
            last_params: vec![],
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn key_fields(&self) -> &[String] {
        &self.key_fields
    }

    /// The key field names joined with commas.
    pub fn key_field(&self) -> String {
        self.key_fields.join(",")
    }

    /// Sets the primary key. Composite keys are comma separated.
    pub fn set_key_field(&mut self, key_field: &str) {
        self.key_fields = key_field
            .split(',')
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .map(str::to_string)
            .collect();
    }

    pub fn auto_populate_pk(&self) -> bool {
        self.auto_populate_pk
    }

    /// Whether the backend assigns keys on insert.
    pub fn set_auto_populate_pk(&mut self, auto_populate_pk: bool) {
        self.auto_populate_pk = auto_populate_pk;
    }

    /// Whether `requery` moves the pointer back to the current key.
    pub fn set_restore_position_on_requery(&mut self, restore: bool) {
        self.restore_position = restore;
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Encoding used to decode byte strings fetched for text fields.
    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = encoding;
    }

    pub fn sql_builder(&self) -> &SqlBuilder {
        &self.builder
    }

    pub fn sql_builder_mut(&mut self) -> &mut SqlBuilder {
        &mut self.builder
    }

    /// The SELECT `requery` sends.
    pub fn get_sql(&self) -> String {
        self.builder.get_sql(&self.conn.serializer(), &self.table)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, row_number: usize) -> Option<&Row> {
        self.rows.get(row_number)
    }

    pub fn current_row(&self) -> Option<&Row> {
        self.row_number.and_then(|idx| self.rows.get(idx))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The pointer, `None` when there is no current row.
    pub fn row_number(&self) -> Option<usize> {
        self.row_number
    }

    /// True when the current row is new and not inserted yet.
    pub fn is_adding(&self) -> bool {
        self.current_row().is_some_and(Row::is_new)
    }

    /// Key of the current row.
    pub fn current_pk(&self) -> Option<Value> {
        self.row_number.and_then(|idx| self.pk_at(idx))
    }

    /// Key of the row at `row_number`; a [`Value::List`] for composite keys.
    pub fn pk_at(&self, row_number: usize) -> Option<Value> {
        let row = self.rows.get(row_number)?;
        match &self.key_fields[..] {
            [] => None,
            [field] => row.get(field).cloned(),
            fields => Some(Value::List(
                fields
                    .iter()
                    .map(|field| row.get(field).cloned().unwrap_or_default())
                    .collect(),
            )),
        }
    }

    /// Field names of the result set, in column order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        self.types.get(field).copied()
    }

    /// Fields present in the result set but not writable to the table.
    pub fn non_update_fields(&self) -> &[String] {
        &self.non_update_fields
    }

    pub fn last_sql(&self) -> &str {
        &self.last_sql
    }

    pub fn last_params(&self) -> &[Value] {
        &self.last_params
    }

    /// True when a row was added and not inserted yet, edited or not.
    pub fn has_new_rows(&self) -> bool {
        self.rows.iter().any(Row::is_new)
    }

    /// True when the current row, or any row with `all_rows`, has unsaved
    /// changes.
    pub fn is_changed(&self, all_rows: bool) -> bool {
        if all_rows {
            self.rows.iter().any(Row::is_changed)
        } else {
            self.current_row().is_some_and(Row::is_changed)
        }
    }

    /// Sends a statement to the backend.
    ///
    /// A statement producing rows replaces the result set; any other leaves
    /// it untouched. Returns the number of fetched or affected rows.
    pub async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        tracing::debug!(table = %self.table, sql, ?params, "execute");
        let response = self.conn.exec(sql, params).await?;

        self.last_sql = sql.to_string();
        self.last_params = params.to_vec();

        match response.rows {
            Rows::Count(count) => Ok(count),
            Rows::Values(result_set) => {
                self.materialize(result_set);
                Ok(self.rows.len() as u64)
            }
        }
    }

    /// Runs the current SELECT and rebuilds the result set: field types,
    /// non-update fields, mementos and sort order are refreshed.
    pub async fn requery(&mut self, params: &[Value]) -> Result<()> {
        if self.key_fields.is_empty() {
            return Err(Error::missing_pk(&self.table));
        }

        let restore = if self.restore_position {
            self.current_pk()
        } else {
            None
        };

        let sql = self.get_sql();
        self.execute(&sql, params).await?;
        self.record_types();
        self.refresh_non_update_fields().await?;

        let skip = self.non_update_fields.clone();
        for row in &mut self.rows {
            row.set_memento(&skip);
        }

        self.apply_sort();

        if let Some(pk) = restore {
            self.move_to_pk(&pk);
        }

        Ok(())
    }

    /// Computes the non-update fields by comparing the result set against
    /// the authoritative columns of the table.
    pub async fn set_non_update_fields(&mut self) -> Result<()> {
        self.probed_clauses = None;
        self.refresh_non_update_fields().await
    }

    async fn refresh_non_update_fields(&mut self) -> Result<()> {
        let clauses = (
            self.builder.field_clause().trim().to_string(),
            self.builder.from_clause().trim().to_string(),
        );

        // `SELECT * FROM table` only yields the table's own columns
        if clauses.0.is_empty() && clauses.1.is_empty() {
            self.non_update_fields.clear();
            self.probed_clauses = Some(clauses);
            return Ok(());
        }

        if self.probed_clauses.as_ref() == Some(&clauses) {
            return Ok(());
        }

        let sql = SqlBuilder::new().get_structure_only_sql(&self.conn.serializer(), &self.table);
        let authoritative = match self.conn.exec(&sql, &[]).await?.rows {
            Rows::Values(result_set) => result_set.columns,
            Rows::Count(_) => vec![],
        };

        self.non_update_fields = self
            .types
            .iter()
            .filter(|(name, ty)| {
                match authoritative.iter().find(|column| &column.name == *name) {
                    None => true,
                    Some(column) => {
                        column.ty != FieldType::Unknown
                            && **ty != FieldType::Unknown
                            && column.ty != **ty
                    }
                }
            })
            .map(|(name, _)| name.clone())
            .collect();

        tracing::debug!(table = %self.table, non_update = ?self.non_update_fields, "non-update fields");
        self.probed_clauses = Some(clauses);
        Ok(())
    }

    /// Loads the field description without fetching rows.
    pub(crate) async fn load_structure(&mut self) -> Result<()> {
        let sql = self
            .builder
            .get_structure_only_sql(&self.conn.serializer(), &self.table);

        if let Rows::Values(result_set) = self.conn.exec(&sql, &[]).await?.rows {
            self.columns = result_set.columns;
            self.record_types();
            self.refresh_non_update_fields().await?;
        }
        Ok(())
    }

    pub async fn begin_transaction(&self) -> Result<()> {
        self.conn.begin().await
    }

    pub async fn commit_transaction(&self) -> Result<()> {
        self.conn.commit().await
    }

    pub async fn rollback_transaction(&self) -> Result<()> {
        self.conn.rollback().await
    }

    pub async fn flush(&self) -> Result<()> {
        self.conn.flush().await
    }

    /// Visits every row with the pointer on it, then restores the pointer.
    pub fn scan<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&mut Cursor) -> Result<()>,
    {
        let saved = self.row_number;
        let mut result = Ok(());

        let mut idx = 0;
        while idx < self.rows.len() {
            self.row_number = Some(idx);
            if let Err(err) = f(self) {
                result = Err(err);
                break;
            }
            idx += 1;
        }

        self.row_number = match saved {
            _ if self.rows.is_empty() => None,
            Some(idx) => Some(idx.min(self.rows.len() - 1)),
            None => Some(0),
        };
        result
    }

    fn materialize(&mut self, result_set: ResultSet) {
        let ResultSet { columns, rows } = result_set;

        self.rows = Vec::with_capacity(rows.len());
        for values in rows {
            let values = columns
                .iter()
                .zip(values)
                .map(|(column, value)| (column.name.clone(), self.decode(column.ty, value)))
                .collect();

            let mut row = Row::fetched(values, self.next_seq);
            row.set_memento(&self.non_update_fields);
            self.next_seq += 1;
            self.rows.push(row);
        }

        self.columns = columns;
        self.row_number = if self.rows.is_empty() { None } else { Some(0) };
    }

    fn decode(&self, ty: FieldType, value: Value) -> Value {
        match value {
            Value::Bytes(bytes) if ty.is_text() => Value::String(self.encoding.decode(&bytes)),
            value => value,
        }
    }

    /// Field types come from the description; unknown ones are inferred from
    /// the first row.
    fn record_types(&mut self) {
        let first = self.rows.first();
        self.types = self
            .columns
            .iter()
            .map(|column| {
                let ty = match (column.ty, first.and_then(|row| row.get(&column.name))) {
                    (FieldType::Unknown, Some(value)) => FieldType::of(value),
                    (ty, _) => ty,
                };
                (column.name.clone(), ty)
            })
            .collect();
    }

    fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn clamp_pointer(&mut self, preferred: usize) {
        self.row_number = if self.rows.is_empty() {
            None
        } else {
            Some(preferred.min(self.rows.len() - 1))
        };
    }
}
