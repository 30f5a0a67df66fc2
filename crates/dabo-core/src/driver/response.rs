use crate::stmt::{FieldType, Value};

#[derive(Debug, Clone)]
pub struct Response {
    pub rows: Rows,
}

#[derive(Debug, Clone)]
pub enum Rows {
    /// Number of rows impacted by the statement
    Count(u64),

    /// Result set of a query
    Values(ResultSet),
}

/// A materialized result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// The cursor description
    pub columns: Vec<Column>,

    /// Row values, in column order
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub ty: FieldType,
}

/// A column as reported by table introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub ty: FieldType,
    pub primary_key: bool,
}

impl Response {
    pub fn count(count: u64) -> Self {
        Self {
            rows: Rows::Count(count),
        }
    }

    pub fn values(result_set: ResultSet) -> Self {
        Self {
            rows: Rows::Values(result_set),
        }
    }

    /// Affected rows for counts, the number of fetched rows otherwise.
    pub fn row_count(&self) -> u64 {
        match &self.rows {
            Rows::Count(count) => *count,
            Rows::Values(set) => set.rows.len() as u64,
        }
    }
}

impl Rows {
    pub fn is_count(&self) -> bool {
        matches!(self, Self::Count(_))
    }

    pub fn is_values(&self) -> bool {
        matches!(self, Self::Values(_))
    }

    pub fn into_values(self) -> Option<ResultSet> {
        match self {
            Self::Values(values) => Some(values),
            Self::Count(_) => None,
        }
    }
}

impl ResultSet {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: vec![],
        }
    }

    /// First value of the first row.
    pub fn scalar(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.first())
    }
}

impl Column {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}
