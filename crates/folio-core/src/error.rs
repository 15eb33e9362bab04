//! Error taxonomy for the content core
//!
//! Four kinds cover the whole surface: validation failures raised by the
//! service before any store call, missing documents, authorization refusals,
//! and transient store unavailability. Store-level errors are converted at
//! the adapter boundary and never cross into callers in their native form.

use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by the content service and repositories
#[derive(Error, Debug)]
pub enum Error {
    /// Caller-supplied data violates a declared invariant. Raised before any
    /// store call; `field` names the offending field.
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// The referenced document does not exist in its collection
    #[error("Not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// The caller's capability was insufficient for the operation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Transient store failure; safe to retry at the caller's discretion.
    /// The core performs no automatic retry.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl Error {
    /// Shorthand for a validation failure
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True when retrying the operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// The offending field for a validation error
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } => Self::NotFound { collection, id },
            StoreError::PermissionDenied(msg) => Self::PermissionDenied(msg),
            StoreError::Unavailable(msg) => Self::Unavailable(msg),
            StoreError::InvalidQuery(msg) => Self::Unavailable(format!("bad query: {}", msg)),
        }
    }
}

/// Result type for content operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_names_field() {
        let err = Error::validation("title", "must be at least 3 characters");
        assert_eq!(err.field(), Some("title"));
        let msg = err.to_string();
        assert!(msg.contains("title"));
        assert!(msg.contains("3 characters"));
    }

    #[test]
    fn test_store_error_kinds_preserved() {
        let err: Error = StoreError::NotFound {
            collection: "projects".to_string(),
            id: "p1".to_string(),
        }
        .into();
        assert!(matches!(err, Error::NotFound { .. }));

        let err: Error = StoreError::PermissionDenied("write refused".to_string()).into();
        assert!(matches!(err, Error::PermissionDenied(_)));

        let err: Error = StoreError::Unavailable("timeout".to_string()).into();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_only_unavailable_is_retryable() {
        let err = Error::validation("year", "in the future");
        assert!(!err.is_retryable());
        let err = Error::PermissionDenied("admin role required".to_string());
        assert!(!err.is_retryable());
    }
}
