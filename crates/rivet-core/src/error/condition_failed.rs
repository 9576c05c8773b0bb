use super::Error;

/// Error when a conditional write matched no rows.
///
/// Raised when an update or delete guarded by a version column affects zero
/// rows, meaning another writer changed the record first.
#[derive(Debug)]
pub(super) struct ConditionFailed {
    message: Box<str>,
}

impl std::error::Error for ConditionFailed {}

impl core::fmt::Display for ConditionFailed {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "condition failed: {}", self.message)
    }
}

impl Error {
    /// Creates a condition failed error.
    pub fn condition_failed(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::ConditionFailed(ConditionFailed {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a condition failed error.
    pub fn is_condition_failed(&self) -> bool {
        self.chain().any(|err| matches!(err.kind(), super::ErrorKind::ConditionFailed(_)))
    }
}
