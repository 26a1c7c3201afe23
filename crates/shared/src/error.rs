//! Application-wide error types.
//!
//! Every variant carries the full internal detail in its `Display` output.
//! Only [`AppError::public_message`] is ever shown to API clients.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed input, the caller's fault.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but lacks the required role.
    #[error("Access denied: {0}")]
    Authorization(String),

    /// Referenced record is absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict (e.g., duplicate entry).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Object store write failed.
    #[error("Storage write failed: {0}")]
    StorageWrite(String),

    /// Object store delete failed.
    #[error("Storage delete failed: {0}")]
    StorageDelete(String),

    /// Metadata row write failed after the blob write succeeded.
    #[error("Metadata write failed: {0}")]
    MetadataWrite(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Third-party service error.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// A collaborator is not configured.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Authorization(_) => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::ExternalService(_) => 502,
            Self::ServiceUnavailable(_) => 503,
            Self::StorageWrite(_)
            | Self::StorageDelete(_)
            | Self::MetadataWrite(_)
            | Self::Database(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Authorization(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::StorageWrite(_) => "STORAGE_WRITE_ERROR",
            Self::StorageDelete(_) => "STORAGE_DELETE_ERROR",
            Self::MetadataWrite(_) => "METADATA_WRITE_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true for errors caused by the caller (4xx).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }

    /// Message safe to render to clients.
    ///
    /// Client errors carry messages written by this service, so they pass
    /// through. Server errors are replaced by a fixed text per kind.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(msg)
            | Self::Unauthorized(msg)
            | Self::Authorization(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::StorageWrite(_) => "Failed to store the file".to_string(),
            Self::StorageDelete(_) => "Failed to remove the file".to_string(),
            Self::MetadataWrite(_) => "Failed to save the document record".to_string(),
            Self::Database(_) => "A database error occurred".to_string(),
            Self::ExternalService(_) => "The external service request failed".to_string(),
            Self::ServiceUnavailable(_) => "This feature is not configured".to_string(),
            Self::Internal(_) => "An internal error occurred".to_string(),
        }
    }

    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
