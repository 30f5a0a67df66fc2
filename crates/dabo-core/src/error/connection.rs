use super::Error;

/// Error when a native connection cannot be opened: bad credentials,
/// unreachable host, missing database file.
#[derive(Debug)]
pub(super) struct ConnectionFailedError {
    pub(super) inner: Box<dyn std::error::Error + Send + Sync>,
}

/// Error when a native connection drops in the middle of an operation.
#[derive(Debug)]
pub(super) struct ConnectionLostError {
    pub(super) inner: Box<dyn std::error::Error + Send + Sync>,
}

impl std::error::Error for ConnectionFailedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl std::error::Error for ConnectionLostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl core::fmt::Display for ConnectionFailedError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "connection failed: {}", self.inner)
    }
}

impl core::fmt::Display for ConnectionLostError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "connection lost: {}", self.inner)
    }
}

impl Error {
    /// Creates an error for a connection that could not be established.
    pub fn connection_failed(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::from(super::ErrorKind::ConnectionFailed(ConnectionFailedError {
            inner: Box::new(err),
        }))
    }

    /// Returns `true` if this error is a failure to connect.
    pub fn is_connection_failed(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::ConnectionFailed(_)))
    }

    /// Creates an error for a connection dropped mid-operation.
    pub fn connection_lost(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::from(super::ErrorKind::ConnectionLost(ConnectionLostError {
            inner: Box::new(err),
        }))
    }

    /// Returns `true` if the native connection was lost.
    pub fn is_connection_lost(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::ConnectionLost(_)))
    }
}
