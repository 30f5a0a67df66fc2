use super::Error;

/// Error raised when a `before*` hook vetoes an operation.
#[derive(Debug)]
pub(super) struct AbortedError {
    pub(super) operation: &'static str,
    pub(super) message: Box<str>,
}

impl std::error::Error for AbortedError {}

impl core::fmt::Display for AbortedError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{} aborted: {}", self.operation, self.message)
    }
}

impl Error {
    /// Creates an error for an operation vetoed by a hook with the given message.
    pub fn aborted(operation: &'static str, message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Aborted(AbortedError {
            operation,
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a hook veto.
    pub fn is_aborted(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::Aborted(_)))
    }

    /// Returns the veto message when this error is a hook veto.
    pub fn aborted_message(&self) -> Option<&str> {
        self.chain().find_map(|err| match err.kind() {
            super::ErrorKind::Aborted(err) => Some(&*err.message),
            _ => None,
        })
    }
}
