use super::Error;

/// Error when a statement cannot be built.
///
/// This occurs when:
/// - A filter path names a field or column the model does not have
/// - An operator receives the wrong number of arguments
/// - `isnull` receives something other than a boolean
/// - A model value passed as an argument has no usable primary key
///
/// These indicate a bug in the calling code and are never retried.
#[derive(Debug)]
pub(super) struct InvalidStatement {
    message: Box<str>,
}

impl std::error::Error for InvalidStatement {}

impl core::fmt::Display for InvalidStatement {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid statement: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid statement error.
    pub fn invalid_statement(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidStatement(InvalidStatement {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid statement error.
    pub fn is_invalid_statement(&self) -> bool {
        self.chain().any(|err| matches!(err.kind(), super::ErrorKind::InvalidStatement(_)))
    }
}
