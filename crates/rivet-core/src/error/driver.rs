use super::Error;

/// An error reported by the database connection, passed through untouched.
#[derive(Debug)]
pub(super) struct DriverError {
    inner: Box<dyn std::error::Error + Send + Sync>,
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl core::fmt::Display for DriverError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.inner, f)
    }
}

impl Error {
    /// Wraps an error raised by the underlying connection.
    pub fn driver(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Error {
        Error::from(super::ErrorKind::Driver(DriverError { inner: err.into() }))
    }

    /// Returns `true` if this error came from the underlying connection.
    pub fn is_driver(&self) -> bool {
        self.chain().any(|err| matches!(err.kind(), super::ErrorKind::Driver(_)))
    }
}
