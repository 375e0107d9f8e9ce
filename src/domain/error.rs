// src/domain/error.rs
use crate::domain::StorageKey;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Note name must not be empty")]
    EmptyName,
    #[error("Note description must not be empty")]
    EmptyDescription,
    #[error("Storage key must not be empty")]
    EmptyStorageKey,
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Invalid note: {0}")]
    Validation(#[from] ValidationError),
    #[error("Network error: {0}")]
    Transient(String),
    #[error("Not authorized: {0}")]
    Unauthorized(String),
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("Blob store error for key '{key}': {message}")]
    BlobStore { key: String, message: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    pub fn blob(key: &StorageKey, message: impl Into<String>) -> Self {
        Self::BlobStore {
            key: key.to_string(),
            message: message.into(),
        }
    }

    /// Whether retrying the same call could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_transient_error_when_checking_retryable_then_true() {
        assert!(SyncError::Transient("timeout".to_string()).is_retryable());
    }

    #[test]
    fn given_backend_or_validation_error_when_checking_retryable_then_false() {
        assert!(!SyncError::Backend("rejected".to_string()).is_retryable());
        assert!(!SyncError::from(ValidationError::EmptyName).is_retryable());
    }

    #[test]
    fn given_blob_error_when_formatting_then_names_key() {
        let key = StorageKey::new("trip").unwrap();
        let error = SyncError::blob(&key, "denied");
        assert_eq!(error.to_string(), "Blob store error for key 'trip': denied");
    }
}
