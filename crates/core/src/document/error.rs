//! Document error types.

use std::fmt;

use dealdesk_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::storage::StorageError;

/// What happened to the blob after a failed metadata write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compensation {
    /// The blob was deleted; storage and rows agree again.
    RolledBack,
    /// The compensating delete failed; the blob needs manual cleanup.
    Orphaned {
        /// Why the compensating delete failed.
        reason: String,
    },
}

impl fmt::Display for Compensation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RolledBack => write!(f, "blob rolled back"),
            Self::Orphaned { reason } => write!(f, "blob orphaned: {reason}"),
        }
    }
}

/// Document operation errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Missing or invalid input. No I/O was performed.
    #[error("invalid upload: {0}")]
    Validation(String),

    /// Document not found.
    #[error("document not found: {0}")]
    NotFound(Uuid),

    /// The blob write failed; nothing was persisted.
    #[error("failed to write blob {storage_key}: {source}")]
    StorageWrite {
        /// Key the write targeted.
        storage_key: String,
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },

    /// The row insert failed after the blob was written.
    #[error("failed to insert document row for {storage_key}: {message} ({compensation})")]
    MetadataWrite {
        /// Key of the blob written before the failure.
        storage_key: String,
        /// Repository error text.
        message: String,
        /// Outcome of the compensating delete.
        compensation: Compensation,
    },

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl DocumentError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Validation(msg) => Self::Validation(msg),
            DocumentError::NotFound(_) => Self::NotFound("Document not found".to_string()),
            err @ DocumentError::StorageWrite { .. } => Self::StorageWrite(err.to_string()),
            err @ DocumentError::MetadataWrite { .. } => Self::MetadataWrite(err.to_string()),
            DocumentError::Repository(msg) => Self::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_write_display_includes_compensation() {
        let err = DocumentError::MetadataWrite {
            storage_key: "deal-1/1.pdf".to_string(),
            message: "connection reset".to_string(),
            compensation: Compensation::Orphaned {
                reason: "timeout".to_string(),
            },
        };
        let text = err.to_string();
        assert!(text.contains("deal-1/1.pdf"));
        assert!(text.contains("blob orphaned: timeout"));
    }

    #[test]
    fn test_into_app_error_kinds() {
        let app: AppError = DocumentError::validation("file is required").into();
        assert!(matches!(app, AppError::Validation(ref m) if m == "file is required"));

        let app: AppError = DocumentError::NotFound(Uuid::new_v4()).into();
        assert_eq!(app.status_code(), 404);

        let app: AppError = DocumentError::StorageWrite {
            storage_key: "k".to_string(),
            source: StorageError::operation("bucket missing"),
        }
        .into();
        assert_eq!(app.error_code(), "STORAGE_WRITE_ERROR");

        let app: AppError = DocumentError::MetadataWrite {
            storage_key: "k".to_string(),
            message: "fk violation".to_string(),
            compensation: Compensation::RolledBack,
        }
        .into();
        assert_eq!(app.error_code(), "METADATA_WRITE_ERROR");
        assert!(!app.public_message().contains("fk violation"));

        let app: AppError = DocumentError::repository("db down").into();
        assert_eq!(app.error_code(), "DATABASE_ERROR");
    }
}
