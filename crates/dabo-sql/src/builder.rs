use crate::{stmt::Select, Serializer};

/// Row cap applied to a SELECT when no limit clause was set.
pub const DEFAULT_LIMIT: usize = 1000;

/// Joins a new WHERE fragment onto the existing clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Connector {
    #[default]
    And,
    Or,
}

impl Connector {
    pub fn as_str(self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

impl std::str::FromStr for Connector {
    type Err = dabo_core::Error;

    fn from_str(s: &str) -> dabo_core::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" => Ok(Connector::And),
            "or" => Ok(Connector::Or),
            _ => Err(dabo_core::Error::invalid_configuration(format!(
                "unknown WHERE connector `{s}`"
            ))),
        }
    }
}

/// Clause buffers of a cursor's SELECT.
///
/// Every mutation either appends to or replaces a whole clause. The final
/// statement is assembled by the dialect's [`Serializer::form_sql`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlBuilder {
    field: String,
    from: String,
    filter: String,
    child_filter: String,
    group_by: String,
    order_by: String,

    /// `None` applies [`DEFAULT_LIMIT`]; an empty string disables the limit.
    limit: Option<String>,
}

fn append(clause: &mut String, expr: &str, separator: &str) {
    let expr = expr.trim();
    if expr.is_empty() {
        return;
    }
    if !clause.is_empty() {
        clause.push_str(separator);
    }
    clause.push_str(expr);
}

impl SqlBuilder {
    pub fn new() -> SqlBuilder {
        SqlBuilder::default()
    }

    pub fn field_clause(&self) -> &str {
        &self.field
    }

    pub fn set_field_clause(&mut self, clause: impl Into<String>) {
        self.field = clause.into();
    }

    pub fn add_field(&mut self, expr: &str) {
        append(&mut self.field, expr, ", ");
    }

    pub fn from_clause(&self) -> &str {
        &self.from
    }

    /// Replaces the FROM clause. Joins must be expressed this way.
    pub fn set_from_clause(&mut self, clause: impl Into<String>) {
        self.from = clause.into();
    }

    pub fn add_from(&mut self, expr: &str) {
        append(&mut self.from, expr, ", ");
    }

    pub fn where_clause(&self) -> &str {
        &self.filter
    }

    pub fn set_where_clause(&mut self, clause: impl Into<String>) {
        self.filter = clause.into();
    }

    pub fn add_where(&mut self, expr: &str, connector: Connector) {
        let separator = format!(" {} ", connector.as_str());
        append(&mut self.filter, expr, &separator);
    }

    pub fn child_filter_clause(&self) -> &str {
        &self.child_filter
    }

    /// Sets the fragment constraining a child cursor to its parent's key.
    pub fn set_child_filter_clause(&mut self, clause: impl Into<String>) {
        self.child_filter = clause.into();
    }

    pub fn group_by_clause(&self) -> &str {
        &self.group_by
    }

    pub fn set_group_by_clause(&mut self, clause: impl Into<String>) {
        self.group_by = clause.into();
    }

    pub fn add_group_by(&mut self, expr: &str) {
        append(&mut self.group_by, expr, ", ");
    }

    pub fn order_by_clause(&self) -> &str {
        &self.order_by
    }

    pub fn set_order_by_clause(&mut self, clause: impl Into<String>) {
        self.order_by = clause.into();
    }

    pub fn add_order_by(&mut self, expr: &str) {
        append(&mut self.order_by, expr, ", ");
    }

    pub fn limit_clause(&self) -> Option<&str> {
        self.limit.as_deref()
    }

    /// Sets the row count restriction. An empty clause removes the limit.
    pub fn set_limit_clause(&mut self, clause: impl Into<String>) {
        self.limit = Some(clause.into());
    }

    /// Reverts to the default row cap.
    pub fn clear_limit_clause(&mut self) {
        self.limit = None;
    }

    /// Resets every clause, the child filter included.
    pub fn clear(&mut self) {
        *self = SqlBuilder::default();
    }

    /// The WHERE expression sent to the backend: the child filter, then the
    /// user clause in parentheses.
    pub fn assembled_where(&self) -> String {
        match (self.child_filter.is_empty(), self.filter.is_empty()) {
            (true, _) => self.filter.clone(),
            (false, true) => self.child_filter.clone(),
            (false, false) => format!("{} AND ({})", self.child_filter, self.filter),
        }
    }

    /// Returns the SELECT for `table`, used when no FROM clause was set.
    pub fn get_sql(&self, serializer: &Serializer<'_>, table: &str) -> String {
        serializer.form_sql(&self.select(table, self.assembled_where()))
    }

    /// Returns a SELECT yielding only the column description of `table`.
    pub fn get_structure_only_sql(&self, serializer: &Serializer<'_>, table: &str) -> String {
        serializer.form_sql(&self.select(table, "1 = 0".to_string()))
    }

    fn select(&self, table: &str, filter: String) -> Select {
        let fields = if self.field.trim().is_empty() {
            "*".to_string()
        } else {
            self.field.clone()
        };
        let from = if self.from.trim().is_empty() {
            table.to_string()
        } else {
            self.from.clone()
        };
        let limit = match &self.limit {
            Some(limit) => limit.trim().to_string(),
            None => DEFAULT_LIMIT.to_string(),
        };

        Select {
            fields,
            from,
            filter,
            group_by: self.group_by.clone(),
            order_by: self.order_by.clone(),
            limit,
        }
    }
}
