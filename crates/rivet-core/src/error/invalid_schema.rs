use super::Error;

/// Error when a model definition is invalid.
///
/// This occurs when:
/// - A field tag is malformed or combines incompatible attributes
/// - A table name or model path is registered twice
/// - A relation points at a model that was never registered
/// - A junction model does not link both sides of a many-to-many relation
/// - A reverse relation has no forward counterpart
///
/// These errors surface from registration and bootstrap. They describe a
/// mistake in the model definitions, so callers are expected to abort
/// startup rather than retry.
#[derive(Debug)]
pub(super) struct InvalidSchema {
    message: Box<str>,
}

impl std::error::Error for InvalidSchema {}

impl core::fmt::Display for InvalidSchema {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid schema: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidSchema(InvalidSchema {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid schema error.
    pub fn is_invalid_schema(&self) -> bool {
        self.chain().any(|err| matches!(err.kind(), super::ErrorKind::InvalidSchema(_)))
    }
}
