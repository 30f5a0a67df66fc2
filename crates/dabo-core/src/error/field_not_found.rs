use super::Error;

/// Error when a field name is not part of the result set.
#[derive(Debug)]
pub(super) struct FieldNotFoundError {
    pub(super) table: Box<str>,
    pub(super) field: Box<str>,
}

impl std::error::Error for FieldNotFoundError {}

impl core::fmt::Display for FieldNotFoundError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "field `{}` not found in `{}`", self.field, self.table)
    }
}

impl Error {
    /// Creates an error for an unknown field of `table`.
    pub fn field_not_found(table: impl Into<String>, field: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::FieldNotFound(FieldNotFoundError {
            table: table.into().into(),
            field: field.into().into(),
        }))
    }

    /// Returns `true` if this error is an unknown field.
    pub fn is_field_not_found(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::FieldNotFound(_)))
    }
}
