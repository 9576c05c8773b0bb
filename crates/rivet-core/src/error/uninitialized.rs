use super::Error;

/// Error when a process-wide handle is read before it was installed.
///
/// This points at a startup ordering bug: the handle must be set once during
/// initialization, before any reader runs.
#[derive(Debug)]
pub(super) struct Uninitialized {
    message: Box<str>,
}

impl std::error::Error for Uninitialized {}

impl core::fmt::Display for Uninitialized {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "uninitialized: {}", self.message)
    }
}

impl Error {
    /// Creates an uninitialized error.
    pub fn uninitialized(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Uninitialized(Uninitialized {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an uninitialized error.
    pub fn is_uninitialized(&self) -> bool {
        self.chain().any(|err| matches!(err.kind(), super::ErrorKind::Uninitialized(_)))
    }
}
