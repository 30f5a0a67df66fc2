use super::Error;

/// Errors raised by row-pointer movement.
#[derive(Debug)]
pub(super) struct NavigationError {
    pub(super) kind: NavigationErrorKind,
}

#[derive(Debug, PartialEq, Eq)]
pub(super) enum NavigationErrorKind {
    /// The result set is empty.
    NoRecords,

    /// Tried to move before the first row.
    BeginningOfFile,

    /// Tried to move past the last row.
    EndOfFile,

    /// A requested row does not exist.
    RowNotFound(Box<str>),
}

impl std::error::Error for NavigationError {}

impl core::fmt::Display for NavigationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match &self.kind {
            NavigationErrorKind::NoRecords => f.write_str("no records"),
            NavigationErrorKind::BeginningOfFile => f.write_str("beginning of file"),
            NavigationErrorKind::EndOfFile => f.write_str("end of file"),
            NavigationErrorKind::RowNotFound(what) => write!(f, "row not found: {what}"),
        }
    }
}

impl Error {
    pub fn no_records() -> Error {
        Error::navigation(NavigationErrorKind::NoRecords)
    }

    pub fn beginning_of_file() -> Error {
        Error::navigation(NavigationErrorKind::BeginningOfFile)
    }

    pub fn end_of_file() -> Error {
        Error::navigation(NavigationErrorKind::EndOfFile)
    }

    pub fn row_not_found(what: impl Into<String>) -> Error {
        Error::navigation(NavigationErrorKind::RowNotFound(what.into().into()))
    }

    pub fn is_no_records(&self) -> bool {
        self.is_navigation(|kind| matches!(kind, NavigationErrorKind::NoRecords))
    }

    pub fn is_beginning_of_file(&self) -> bool {
        self.is_navigation(|kind| matches!(kind, NavigationErrorKind::BeginningOfFile))
    }

    pub fn is_end_of_file(&self) -> bool {
        self.is_navigation(|kind| matches!(kind, NavigationErrorKind::EndOfFile))
    }

    pub fn is_row_not_found(&self) -> bool {
        self.is_navigation(|kind| matches!(kind, NavigationErrorKind::RowNotFound(_)))
    }

    fn navigation(kind: NavigationErrorKind) -> Error {
        Error::from(super::ErrorKind::Navigation(NavigationError { kind }))
    }

    fn is_navigation(&self, f: impl Fn(&NavigationErrorKind) -> bool) -> bool {
        self.any_kind(|kind| match kind {
            super::ErrorKind::Navigation(err) => f(&err.kind),
            _ => false,
        })
    }
}
