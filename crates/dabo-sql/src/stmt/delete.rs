/// `DELETE FROM table WHERE filter`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delete {
    pub table: String,

    /// Fully rendered WHERE expression
    pub filter: String,
}
