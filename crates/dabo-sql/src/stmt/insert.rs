use dabo_core::stmt::Value;

/// `INSERT INTO table (columns) VALUES (values)`; values are sent as
/// parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: String,
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}
