use dabo_core::stmt::Value;

/// `UPDATE table SET assignments WHERE filter`; assigned values are sent as
/// parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: String,
    pub assignments: Vec<(String, Value)>,

    /// Fully rendered WHERE expression
    pub filter: String,
}
