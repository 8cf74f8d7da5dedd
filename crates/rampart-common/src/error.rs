//! Common error types for Rampart components.

use thiserror::Error;

/// Common errors across Rampart components
#[derive(Debug, Error)]
pub enum RampartError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Durable storage read/write error
    #[error("Storage error: {0}")]
    Storage(String),

    /// No form registered under this id
    #[error("Unknown form: {0}")]
    UnknownForm(String),

    /// Form exists but has no such field
    #[error("Unknown field {field} on form {form_id}")]
    UnknownField { form_id: String, field: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RampartError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Config(_) => 500,
            Self::Storage(_) => 503,
            Self::UnknownForm(_) => 404,
            Self::UnknownField { .. } => 404,
            Self::Internal(_) => 500,
        }
    }
}

impl From<std::io::Error> for RampartError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_errors_are_not_found() {
        assert_eq!(RampartError::UnknownForm("x".into()).status_code(), 404);
        let err = RampartError::UnknownField {
            form_id: "signup-form".into(),
            field: "age".into(),
        };
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_string(), "Unknown field age on form signup-form");
    }

    #[test]
    fn test_io_failure_is_storage_error() {
        let err: RampartError = std::io::Error::other("disk full").into();
        assert!(matches!(err, RampartError::Storage(_)));
        assert_eq!(err.status_code(), 503);
    }
}
