//! Admin-only user management.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tracing::info;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::{ApiJson, ApiQuery},
    middleware::AdminUser,
};
use dealdesk_core::auth::{hash_password, normalize_email, validate_new_user};
use dealdesk_db::{UserRepository, entities::users};
use dealdesk_shared::types::{PageRequest, PageResponse};

/// Creates the admin routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/users", get(list_users).post(create_user))
}

/// Request body for creating a user.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Login email.
    pub email: String,
    /// Plain-text password, hashed before storage.
    pub password: String,
    /// Display name.
    pub full_name: String,
}

/// GET /admin/users
async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> ApiResult<Json<PageResponse<users::Model>>> {
    let user_repo = UserRepository::new((*state.db).clone());
    let (users, total) = user_repo.list(&page).await?;
    Ok(Json(PageResponse::new(users, &page, total)))
}

/// POST /admin/users
async fn create_user(
    State(state): State<AppState>,
    admin: AdminUser,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<users::Model>)> {
    validate_new_user(&payload.email, &payload.password, &payload.full_name)
        .map_err(ApiError::validation)?;

    let email = normalize_email(&payload.email);
    let user_repo = UserRepository::new((*state.db).clone());
    if user_repo.email_exists(&email).await? {
        return Err(ApiError::conflict("Email already registered"));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = user_repo
        .create(&email, &password_hash, &payload.full_name)
        .await?;

    info!(user_id = %user.id, created_by = %admin.0.user_id(), "User created");

    Ok((StatusCode::CREATED, Json(user)))
}
