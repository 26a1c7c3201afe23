//! Authentication routes.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::ApiJson,
    middleware::AuthUser,
};
use dealdesk_core::auth::verify_login;
use dealdesk_db::UserRepository;
use dealdesk_shared::auth::{LoginRequest, TokenResponse};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Creates public auth routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// Creates auth routes that need a session.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

/// Current caller.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// User ID.
    pub id: Uuid,
    /// Email.
    pub email: String,
    /// Whether the caller is on the admin allow-list.
    pub is_admin: bool,
}

/// POST /auth/login - Exchange credentials for a bearer token.
async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("email and password are required"));
    }

    let user_repo = UserRepository::new((*state.db).clone());
    let user = user_repo.find_by_email(&payload.email).await?;

    let password_ok = verify_login(
        &payload.password,
        user.as_ref().map(|u| u.password_hash.as_str()),
    )?;

    let Some(user) = user else {
        warn!("Login attempt for unknown email");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    if !password_ok || !user.is_active {
        warn!(user_id = %user.id, "Login rejected");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = state.jwt_service.issue(user.id, &user.email)?;

    info!(user_id = %user.id, "User logged in");

    Ok(Json(TokenResponse::bearer(
        token,
        state.jwt_service.expires_in(),
    )))
}

/// GET /me - Who am I.
async fn me(State(state): State<AppState>, auth: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: auth.user_id(),
        email: auth.email().to_string(),
        is_admin: state.admin.is_admin(auth.email()),
    })
}

#[cfg(test)]
mod tests {
    use crate::test_support::{bearer, empty_state, json_body, send, state_with};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use dealdesk_core::auth::hash_password;
    use dealdesk_db::entities::users;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    fn user(password: &str, active: bool) -> users::Model {
        users::Model {
            id: Uuid::new_v4(),
            email: "rep@dealdesk.io".to_string(),
            password_hash: hash_password(password).unwrap(),
            full_name: "Sam Rep".to_string(),
            is_active: active,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn login_request(email: &str, password: &str) -> Request<Body> {
        Request::post("/api/v1/auth/login")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({ "email": email, "password": password }).to_string(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_issues_usable_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user("correct horse", true)]]);
        let state = state_with(db);

        let response = send(state.clone(), login_request("Rep@DealDesk.io", "correct horse")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["token_type"], "Bearer");
        assert_eq!(body["expires_in"], 300);

        let token = body["access_token"].as_str().unwrap();
        let me = send(
            state,
            Request::get("/api/v1/me")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(me.status(), StatusCode::OK);
        let me = json_body(me).await;
        assert_eq!(me["email"], "rep@dealdesk.io");
        assert_eq!(me["is_admin"], false);
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_generic_401() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user("correct horse", true)]]);

        let response = send(state_with(db), login_request("rep@dealdesk.io", "nope")).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Invalid email or password");
    }

    #[tokio::test]
    async fn test_login_unknown_email_matches_wrong_password() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()]);

        let response = send(state_with(db), login_request("ghost@dealdesk.io", "correct horse")).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Invalid email or password");
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_login_inactive_user_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user("correct horse", false)]]);

        let response = send(state_with(db), login_request("rep@dealdesk.io", "correct horse")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_blank_fields_is_validation() {
        let response = send(empty_state(), login_request(" ", "")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_me_reports_admin() {
        let state = empty_state();
        let auth = bearer(&state, "OPS@dealdesk.io");

        let response = send(
            state,
            Request::get("/api/v1/me")
                .header("authorization", auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        let body = json_body(response).await;
        assert_eq!(body["is_admin"], true);
    }
}
