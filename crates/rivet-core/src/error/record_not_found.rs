use super::Error;

#[derive(Debug)]
pub(super) struct RecordNotFound {
    message: Box<str>,
}

impl std::error::Error for RecordNotFound {}

impl core::fmt::Display for RecordNotFound {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "record not found: {}", self.message)
    }
}

impl Error {
    /// Creates a record not found error.
    pub fn record_not_found(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::RecordNotFound(RecordNotFound {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a record not found error.
    pub fn is_record_not_found(&self) -> bool {
        self.chain().any(|err| matches!(err.kind(), super::ErrorKind::RecordNotFound(_)))
    }
}
