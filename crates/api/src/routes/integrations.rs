//! Calendar integration routes (Google OAuth2).

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    AppState,
    error::ApiResult,
    extractors::ApiJson,
    middleware::AuthUser,
    oauth::{GoogleOAuthClient, OAuthError},
};
use dealdesk_core::crm::require_text;
use dealdesk_db::{OAuthTokenRepository, UpsertOAuthTokenInput};

/// Creates the integration routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/integrations/google/authorize", get(google_authorize))
        .route("/integrations/google/callback", post(google_callback))
        .route("/integrations/google/status", get(google_status))
}

/// Consent URL to redirect the user to.
#[derive(Debug, Serialize)]
pub struct AuthorizeResponse {
    /// Provider consent URL.
    pub url: String,
}

/// Request body for the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackRequest {
    /// Authorization code returned by the provider.
    pub code: String,
}

/// Connection state of the caller's grant.
#[derive(Debug, Serialize)]
pub struct ConnectionResponse {
    /// Whether a grant is stored.
    pub connected: bool,
    /// Access token expiry, if known.
    pub expires_at: Option<DateTime<Utc>>,
    /// Granted scopes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

fn google(state: &AppState) -> Result<&Arc<GoogleOAuthClient>, OAuthError> {
    state
        .google
        .as_ref()
        .ok_or(OAuthError::NotConfigured(GoogleOAuthClient::PROVIDER))
}

/// GET /integrations/google/authorize
async fn google_authorize(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<AuthorizeResponse>> {
    let url = google(&state)?.authorize_url(&auth.user_id().to_string())?;
    Ok(Json(AuthorizeResponse { url }))
}

/// POST /integrations/google/callback
async fn google_callback(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<CallbackRequest>,
) -> ApiResult<Json<ConnectionResponse>> {
    let code = require_text("code", &payload.code)?;
    let client = google(&state)?;

    let tokens = client.exchange_code(&code).await?;
    let expires_at = tokens.expires_at(Utc::now());

    let repo = OAuthTokenRepository::new((*state.db).clone());
    let stored = repo
        .upsert(UpsertOAuthTokenInput {
            user_id: auth.user_id(),
            provider: GoogleOAuthClient::PROVIDER.to_string(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            scope: tokens.scope,
            expires_at,
        })
        .await?;

    info!(user_id = %auth.user_id(), provider = %stored.provider, "OAuth grant stored");

    Ok(Json(ConnectionResponse {
        connected: true,
        expires_at,
        scope: stored.scope,
    }))
}

/// GET /integrations/google/status
async fn google_status(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ConnectionResponse>> {
    let repo = OAuthTokenRepository::new((*state.db).clone());
    let grant = repo
        .find(auth.user_id(), GoogleOAuthClient::PROVIDER)
        .await?;

    Ok(Json(match grant {
        Some(grant) => ConnectionResponse {
            connected: true,
            expires_at: grant.expires_at.map(|t| t.with_timezone(&Utc)),
            scope: grant.scope,
        },
        None => ConnectionResponse {
            connected: false,
            expires_at: None,
            scope: None,
        },
    }))
}
