use super::Error;

/// Error for unusable connection settings: unknown backend name, backend
/// compiled out, malformed URL or definition file.
#[derive(Debug)]
pub(super) struct InvalidConfigurationError {
    pub(super) message: Box<str>,
}

impl std::error::Error for InvalidConfigurationError {}

impl core::fmt::Display for InvalidConfigurationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid configuration: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidConfiguration(
            InvalidConfigurationError {
                message: message.into().into(),
            },
        ))
    }

    /// Returns `true` if this error is an invalid configuration.
    pub fn is_invalid_configuration(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::InvalidConfiguration(_)))
    }
}
