use dabo_core::stmt::FieldType;

/// A `CREATE TABLE` statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTable {
    /// Name of the table
    pub name: String,

    /// Column definitions
    pub columns: Vec<ColumnDef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub ty: FieldType,

    /// Part of the primary key
    pub primary_key: bool,

    /// Values are assigned by the backend on insert. Only honored on a
    /// single-column key.
    pub auto_increment: bool,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            primary_key: false,
            auto_increment: false,
        }
    }
}
