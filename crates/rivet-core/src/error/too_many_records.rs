use super::Error;

#[derive(Debug)]
pub(super) struct TooManyRecords {
    message: Box<str>,
}

impl std::error::Error for TooManyRecords {}

impl core::fmt::Display for TooManyRecords {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "too many records: {}", self.message)
    }
}

impl Error {
    /// Creates a too many records error.
    pub fn too_many_records(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::TooManyRecords(TooManyRecords {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a too many records error.
    pub fn is_too_many_records(&self) -> bool {
        self.chain().any(|err| matches!(err.kind(), super::ErrorKind::TooManyRecords(_)))
    }
}
