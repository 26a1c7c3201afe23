//! Deal routes, including tags, activities and documents of a deal.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::documents::{DocumentResponse, document_service};
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::{ApiJson, ApiPath, ApiQuery, ValidatedJson, double_option},
    middleware::AuthUser,
};
use dealdesk_core::crm::{ActivityKind, DealStage, require_text};
use dealdesk_db::{
    ActivityRepository, CreateActivityInput, CreateDealInput, DealFilter, DealRepository,
    TagRepository, UpdateDealInput,
    entities::{activities, deals, tags},
};
use dealdesk_shared::types::{PageRequest, PageResponse};

/// Currency used when a deal is created without one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Creates the deal routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/deals", get(list_deals).post(create_deal))
        .route(
            "/deals/{id}",
            get(get_deal).patch(update_deal).delete(delete_deal),
        )
        .route("/deals/{id}/tags", get(list_deal_tags))
        .route(
            "/deals/{id}/tags/{tag_id}",
            post(attach_tag).delete(detach_tag),
        )
        .route(
            "/deals/{id}/activities",
            get(list_activities).post(create_activity),
        )
        .route("/deals/{id}/documents", get(list_deal_documents))
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for listing deals.
#[derive(Debug, Deserialize)]
pub struct ListDealsQuery {
    /// Pipeline stage.
    pub stage: Option<String>,
    /// Owning organization.
    pub organization_id: Option<Uuid>,
}

/// Request body for creating a deal.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDealRequest {
    /// Deal title.
    pub title: String,
    /// Counterparty organization.
    pub organization_id: Option<Uuid>,
    /// Main contact.
    pub contact_id: Option<Uuid>,
    /// Pipeline stage, `lead` when absent.
    pub stage: Option<String>,
    /// Expected value.
    pub value: Option<Decimal>,
    /// ISO 4217 code.
    #[validate(length(equal = 3, message = "must be a 3-letter currency code"))]
    pub currency: Option<String>,
    /// Expected close date.
    pub expected_close_date: Option<NaiveDate>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Request body for updating a deal.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateDealRequest {
    /// Deal title.
    pub title: Option<String>,
    /// Counterparty organization, `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub organization_id: Option<Option<Uuid>>,
    /// Main contact, `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub contact_id: Option<Option<Uuid>>,
    /// Pipeline stage.
    pub stage: Option<String>,
    /// Expected value, `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub value: Option<Option<Decimal>>,
    /// ISO 4217 code.
    #[validate(length(equal = 3, message = "must be a 3-letter currency code"))]
    pub currency: Option<String>,
    /// Expected close date, `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub expected_close_date: Option<Option<NaiveDate>>,
    /// Notes, `null` clears them.
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

/// Request body for logging an activity.
#[derive(Debug, Deserialize)]
pub struct CreateActivityRequest {
    /// One of `call`, `email`, `meeting`, `note`, `task`.
    pub kind: String,
    /// What happened.
    pub summary: String,
    /// When it happened, now when absent.
    pub occurred_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Helper Functions
// ============================================================================

fn parse_stage(raw: &str) -> ApiResult<DealStage> {
    DealStage::parse(raw).ok_or_else(|| {
        let allowed: Vec<&str> = DealStage::ALL.iter().map(DealStage::as_str).collect();
        ApiError::validation(format!("stage must be one of: {}", allowed.join(", ")))
    })
}

fn normalize_currency(code: &str) -> String {
    code.trim().to_uppercase()
}

async fn ensure_deal(repo: &DealRepository, id: Uuid) -> ApiResult<deals::Model> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Deal"))
}

// ============================================================================
// Deals
// ============================================================================

async fn list_deals(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageRequest>,
    ApiQuery(query): ApiQuery<ListDealsQuery>,
) -> ApiResult<Json<PageResponse<deals::Model>>> {
    let filter = DealFilter {
        stage: query.stage.as_deref().map(parse_stage).transpose()?,
        organization_id: query.organization_id,
    };

    let repo = DealRepository::new((*state.db).clone());
    let (items, total) = repo.list(filter, &page).await?;
    Ok(Json(PageResponse::new(items, &page, total)))
}

async fn get_deal(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<deals::Model>> {
    let repo = DealRepository::new((*state.db).clone());
    ensure_deal(&repo, id).await.map(Json)
}

async fn create_deal(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateDealRequest>,
) -> ApiResult<(StatusCode, Json<deals::Model>)> {
    let input = CreateDealInput {
        title: require_text("title", &payload.title)?,
        organization_id: payload.organization_id,
        contact_id: payload.contact_id,
        stage: payload
            .stage
            .as_deref()
            .map(parse_stage)
            .transpose()?
            .unwrap_or_default(),
        value: payload.value,
        currency: payload
            .currency
            .as_deref()
            .map_or_else(|| DEFAULT_CURRENCY.to_string(), normalize_currency),
        expected_close_date: payload.expected_close_date,
        notes: payload.notes,
    };

    let repo = DealRepository::new((*state.db).clone());
    let deal = repo.create(input).await?;

    info!(deal_id = %deal.id, stage = %deal.stage, "Deal created");
    Ok((StatusCode::CREATED, Json(deal)))
}

async fn update_deal(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateDealRequest>,
) -> ApiResult<Json<deals::Model>> {
    let input = UpdateDealInput {
        title: payload
            .title
            .as_deref()
            .map(|t| require_text("title", t))
            .transpose()?,
        organization_id: payload.organization_id,
        contact_id: payload.contact_id,
        stage: payload.stage.as_deref().map(parse_stage).transpose()?,
        value: payload.value,
        currency: payload.currency.as_deref().map(normalize_currency),
        expected_close_date: payload.expected_close_date,
        notes: payload.notes,
    };

    let repo = DealRepository::new((*state.db).clone());
    let deal = repo
        .update(id, input)
        .await?
        .ok_or_else(|| ApiError::not_found("Deal"))?;

    info!(deal_id = %id, stage = %deal.stage, "Deal updated");
    Ok(Json(deal))
}

async fn delete_deal(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    let repo = DealRepository::new((*state.db).clone());
    if !repo.delete(id).await? {
        return Err(ApiError::not_found("Deal"));
    }

    info!(deal_id = %id, "Deal deleted");
    Ok(Json(json!({ "success": true })))
}

// ============================================================================
// Tags
// ============================================================================

async fn list_deal_tags(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<tags::Model>>> {
    let repo = DealRepository::new((*state.db).clone());
    ensure_deal(&repo, id).await?;
    Ok(Json(repo.list_tags(id).await?))
}

async fn attach_tag(
    State(state): State<AppState>,
    ApiPath((id, tag_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<Value>> {
    let repo = DealRepository::new((*state.db).clone());
    ensure_deal(&repo, id).await?;

    let tag_repo = TagRepository::new((*state.db).clone());
    if tag_repo.find_by_id(tag_id).await?.is_none() {
        return Err(ApiError::not_found("Tag"));
    }

    repo.attach_tag(id, tag_id).await?;

    info!(deal_id = %id, tag_id = %tag_id, "Tag attached");
    Ok(Json(json!({ "success": true })))
}

async fn detach_tag(
    State(state): State<AppState>,
    ApiPath((id, tag_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<Value>> {
    let repo = DealRepository::new((*state.db).clone());
    if !repo.detach_tag(id, tag_id).await? {
        return Err(ApiError::not_found("Tag link"));
    }

    info!(deal_id = %id, tag_id = %tag_id, "Tag detached");
    Ok(Json(json!({ "success": true })))
}

// ============================================================================
// Activities
// ============================================================================

async fn list_activities(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<activities::Model>>> {
    ensure_deal(&DealRepository::new((*state.db).clone()), id).await?;

    let repo = ActivityRepository::new((*state.db).clone());
    Ok(Json(repo.list_by_deal(id).await?))
}

async fn create_activity(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CreateActivityRequest>,
) -> ApiResult<(StatusCode, Json<activities::Model>)> {
    let kind = ActivityKind::parse(&payload.kind).ok_or_else(|| {
        ApiError::validation("kind must be one of: call, email, meeting, note, task")
    })?;
    let summary = require_text("summary", &payload.summary)?;

    ensure_deal(&DealRepository::new((*state.db).clone()), id).await?;

    let input = CreateActivityInput {
        deal_id: id,
        kind,
        summary,
        occurred_at: payload.occurred_at.unwrap_or_else(Utc::now),
        created_by: Some(auth.user_id()),
    };

    let repo = ActivityRepository::new((*state.db).clone());
    let activity = repo.create(input).await?;

    info!(deal_id = %id, activity_id = %activity.id, kind = %kind, "Activity logged");
    Ok((StatusCode::CREATED, Json(activity)))
}

// ============================================================================
// Documents
// ============================================================================

async fn list_deal_documents(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<DocumentResponse>>> {
    let documents = document_service(&state)
        .list_by_deal(&id.to_string())
        .await?;

    Ok(Json(documents.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{
        bearer, count_row, empty_request, empty_state, json_body, json_request, send, state_with,
        ts,
    };
    use axum::http::StatusCode;
    use dealdesk_db::entities::{activities, deals, tags};
    use rstest::rstest;
    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;
    use uuid::Uuid;

    fn deal(stage: &str) -> deals::Model {
        deals::Model {
            id: Uuid::new_v4(),
            title: "Summit 2025 gold sponsorship".to_string(),
            organization_id: None,
            contact_id: None,
            stage: stage.to_string(),
            value: Some(Decimal::new(2_500_000, 2)),
            currency: "EUR".to_string(),
            expected_close_date: None,
            notes: None,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    fn tag(name: &str) -> tags::Model {
        tags::Model {
            id: Uuid::new_v4(),
            name: name.to_string(),
            color: None,
            created_at: ts(),
        }
    }

    #[rstest]
    #[case("/api/v1/deals?stage=closed")]
    #[case("/api/v1/deals?stage=")]
    #[tokio::test]
    async fn test_list_rejects_unknown_stage(#[case] uri: &str) {
        let state = empty_state();
        let auth = bearer(&state, "rep@dealdesk.io");

        let response = send(state, empty_request("GET", uri, &auth)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("stage must be one of"));
    }

    #[tokio::test]
    async fn test_list_by_stage() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(1)]])
            .append_query_results([[deal("negotiation")]]);
        let state = state_with(db);
        let auth = bearer(&state, "rep@dealdesk.io");

        let response = send(
            state,
            empty_request("GET", "/api/v1/deals?stage=Negotiation", &auth),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"][0]["stage"], "negotiation");
        assert_eq!(body["data"][0]["value"], "25000.00");
    }

    #[tokio::test]
    async fn test_create_defaults_to_lead() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[deal("lead")]]);
        let state = state_with(db);
        let auth = bearer(&state, "rep@dealdesk.io");
        let body = json!({ "title": "Summit 2025 gold sponsorship", "value": "25000.00", "currency": "eur" });

        let response = send(state, json_request("POST", "/api/v1/deals", &auth, &body)).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(json_body(response).await["stage"], "lead");
    }

    #[tokio::test]
    async fn test_create_rejects_bad_currency() {
        let state = empty_state();
        let auth = bearer(&state, "rep@dealdesk.io");
        let body = json!({ "title": "Deal", "currency": "EURO" });

        let response = send(state, json_request("POST", "/api/v1/deals", &auth, &body)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_missing_deal_is_404() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<deals::Model>::new()]);
        let state = state_with(db);
        let auth = bearer(&state, "rep@dealdesk.io");

        let response = send(
            state,
            json_request(
                "PATCH",
                &format!("/api/v1/deals/{}", Uuid::new_v4()),
                &auth,
                &json!({ "stage": "won" }),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"], "Deal not found");
    }

    #[tokio::test]
    async fn test_attach_tag_is_idempotent() {
        let d = deal("lead");
        let t = tag("conference");
        let uri = format!("/api/v1/deals/{}/tags/{}", d.id, t.id);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[d.clone()]])
            .append_query_results([[t.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([[d]])
            .append_query_results([[t]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }]);
        let state = state_with(db);
        let auth = bearer(&state, "rep@dealdesk.io");

        for _ in 0..2 {
            let response = send(state.clone(), empty_request("POST", &uri, &auth)).await;
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_attach_unknown_tag_is_404() {
        let d = deal("lead");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[d.clone()]])
            .append_query_results([Vec::<tags::Model>::new()]);
        let state = state_with(db);
        let auth = bearer(&state, "rep@dealdesk.io");

        let response = send(
            state,
            empty_request(
                "POST",
                &format!("/api/v1/deals/{}/tags/{}", d.id, Uuid::new_v4()),
                &auth,
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"], "Tag not found");
    }

    #[tokio::test]
    async fn test_activity_rejects_unknown_kind() {
        let state = empty_state();
        let auth = bearer(&state, "rep@dealdesk.io");

        let response = send(
            state,
            json_request(
                "POST",
                &format!("/api/v1/deals/{}/activities", Uuid::new_v4()),
                &auth,
                &json!({ "kind": "lunch", "summary": "Talked budget" }),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_activity_created_for_caller() {
        let d = deal("qualified");
        let activity = activities::Model {
            id: Uuid::new_v4(),
            deal_id: d.id,
            kind: "call".to_string(),
            summary: "Talked budget".to_string(),
            occurred_at: ts(),
            created_by: None,
            created_at: ts(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[d.clone()]])
            .append_query_results([[activity]]);
        let state = state_with(db);
        let auth = bearer(&state, "rep@dealdesk.io");

        let response = send(
            state,
            json_request(
                "POST",
                &format!("/api/v1/deals/{}/activities", d.id),
                &auth,
                &json!({ "kind": "Call", "summary": "Talked budget" }),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(json_body(response).await["kind"], "call");
    }

    #[tokio::test]
    async fn test_deal_documents_empty() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<dealdesk_db::entities::documents::Model>::new()]);
        let state = state_with(db);
        let auth = bearer(&state, "rep@dealdesk.io");

        let response = send(
            state,
            empty_request("GET", &format!("/api/v1/deals/{}/documents", Uuid::new_v4()), &auth),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!([]));
    }
}
