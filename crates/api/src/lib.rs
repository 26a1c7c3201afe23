//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for the CRM resources, documents and identity
//! - Authentication middleware and the admin gate
//! - Request extractors
//! - Error rendering
//! - The OAuth client for calendar integration

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod oauth;
pub mod routes;

use axum::{Router, http::header::AUTHORIZATION};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

use dealdesk_core::auth::AdminPolicy;
use dealdesk_core::storage::StorageService;
use dealdesk_shared::JwtService;

pub use error::{ApiError, ApiResult};
use oauth::GoogleOAuthClient;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Object storage for document blobs.
    pub storage: Arc<StorageService>,
    /// Admin email allow-list.
    pub admin: Arc<AdminPolicy>,
    /// Google OAuth client, when configured.
    pub google: Option<Arc<GoogleOAuthClient>>,
    /// Upload size limit in bytes.
    pub max_file_size: u64,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetSensitiveRequestHeadersLayer::new([AUTHORIZATION]))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
