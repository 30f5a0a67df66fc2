use super::Error;

/// Error when a cursor is asked to requery or save without a key field.
#[derive(Debug)]
pub(super) struct MissingPkError {
    pub(super) table: Box<str>,
}

impl std::error::Error for MissingPkError {}

impl core::fmt::Display for MissingPkError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "no key field configured for `{}`", self.table)
    }
}

impl Error {
    /// Creates an error for a table without a configured key field.
    pub fn missing_pk(table: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::MissingPk(MissingPkError {
            table: table.into().into(),
        }))
    }

    /// Returns `true` if this error is a missing key field.
    pub fn is_missing_pk(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::MissingPk(_)))
    }
}
