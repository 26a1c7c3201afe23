//! HTTP error rendering.
//!
//! Every handler error becomes `{"error": <message>, "code": <KIND>}`.
//! Server-side kinds render a fixed message and log the detail.

use axum::{
    Json,
    extract::multipart::MultipartRejection,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use tracing::{debug, error, warn};

use dealdesk_core::auth::PasswordError;
use dealdesk_core::crm::CrmValidationError;
use dealdesk_core::document::DocumentError;
use dealdesk_shared::{AppError, JwtError};

use crate::oauth::OAuthError;

/// Error body returned to clients.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Curated, human-readable message.
    pub error: String,
    /// Error kind, e.g. `VALIDATION_ERROR`.
    pub code: &'static str,
}

/// Error returned by handlers.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// 400 with a client-facing message.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self(AppError::Validation(msg.into()))
    }

    /// 401 with a client-facing message.
    #[must_use]
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self(AppError::Unauthorized(msg.into()))
    }

    /// 403 with a client-facing message.
    #[must_use]
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self(AppError::Authorization(msg.into()))
    }

    /// 404 for the named resource.
    #[must_use]
    pub fn not_found(resource: &str) -> Self {
        Self(AppError::NotFound(format!("{resource} not found")))
    }

    /// 409 with a client-facing message.
    #[must_use]
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self(AppError::Conflict(msg.into()))
    }

    /// 500 with detail for the log only.
    #[must_use]
    pub fn internal(detail: impl Into<String>) -> Self {
        Self(AppError::Internal(detail.into()))
    }

    /// The wrapped error kind.
    #[must_use]
    pub fn kind(&self) -> &AppError {
        &self.0
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.0.is_client_error() {
            warn!(code = self.0.error_code(), error = %self.0, "Request rejected");
        } else {
            error!(code = self.0.error_code(), error = %self.0, "Request failed");
        }

        let body = ErrorBody {
            error: self.0.public_message(),
            code: self.0.error_code(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(detail = %rejection.body_text(), "JSON body rejected");
        Self::validation(match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                "Expected a JSON body with Content-Type: application/json"
            }
            JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
            JsonRejection::JsonDataError(_) => "Request body has missing or invalid fields",
            _ => "Request body could not be read",
        })
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(detail) => {
                debug!(detail = %detail.body_text(), "Path rejected");
                Self::validation("Invalid path parameter")
            }
            other => Self::internal(other.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        debug!(detail = %rejection.body_text(), "Query string rejected");
        Self::validation("Invalid query string")
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        debug!(detail = %rejection.body_text(), "Multipart body rejected");
        Self::validation("Expected a multipart/form-data body")
    }
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        Self(err.into())
    }
}

impl From<CrmValidationError> for ApiError {
    fn from(err: CrmValidationError) -> Self {
        Self(err.into())
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                warn!(detail = %detail, "Unique constraint violated");
                Self::conflict("A record with these values already exists")
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                warn!(detail = %detail, "Foreign key constraint violated");
                Self::validation("A referenced record does not exist")
            }
            _ => Self(AppError::Database(err.to_string())),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self::unauthorized("Token has expired"),
            JwtError::Invalid(_) => Self::unauthorized("Invalid or malformed token"),
            JwtError::Signing(detail) => Self::internal(detail),
        }
    }
}

impl From<OAuthError> for ApiError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::NotConfigured(provider) => Self(AppError::ServiceUnavailable(format!(
                "{provider} integration is not configured"
            ))),
            other => Self(AppError::ExternalService(other.to_string())),
        }
    }
}
