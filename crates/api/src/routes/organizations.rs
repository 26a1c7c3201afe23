//! Organization routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::{ApiJson, ApiPath, ApiQuery, ValidatedJson, double_option},
};
use dealdesk_core::crm::require_text;
use dealdesk_db::{
    CreateOrganizationInput, OrganizationRepository, UpdateOrganizationInput,
    entities::organizations,
};
use dealdesk_shared::types::{PageRequest, PageResponse};

/// Creates the organization routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizations", get(list_organizations).post(create_organization))
        .route(
            "/organizations/{id}",
            get(get_organization)
                .patch(update_organization)
                .delete(delete_organization),
        )
}

/// Request body for creating an organization.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrganizationRequest {
    /// Display name.
    pub name: String,
    /// Website URL.
    #[validate(url(message = "must be a valid URL"))]
    pub website: Option<String>,
    /// Industry label.
    pub industry: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Request body for updating an organization.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrganizationRequest {
    /// Display name.
    pub name: Option<String>,
    /// Website URL, `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub website: Option<Option<String>>,
    /// Industry label, `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub industry: Option<Option<String>>,
    /// Notes, `null` clears them.
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

async fn list_organizations(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> ApiResult<Json<PageResponse<organizations::Model>>> {
    let repo = OrganizationRepository::new((*state.db).clone());
    let (items, total) = repo.list(&page).await?;
    Ok(Json(PageResponse::new(items, &page, total)))
}

async fn get_organization(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<organizations::Model>> {
    let repo = OrganizationRepository::new((*state.db).clone());
    repo.find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Organization"))
}

async fn create_organization(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateOrganizationRequest>,
) -> ApiResult<(StatusCode, Json<organizations::Model>)> {
    let input = CreateOrganizationInput {
        name: require_text("name", &payload.name)?,
        website: payload.website,
        industry: payload.industry,
        notes: payload.notes,
    };

    let repo = OrganizationRepository::new((*state.db).clone());
    let organization = repo.create(input).await?;

    info!(organization_id = %organization.id, "Organization created");
    Ok((StatusCode::CREATED, Json(organization)))
}

async fn update_organization(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateOrganizationRequest>,
) -> ApiResult<Json<organizations::Model>> {
    let name = payload
        .name
        .as_deref()
        .map(|name| require_text("name", name))
        .transpose()?;

    let input = UpdateOrganizationInput {
        name,
        website: payload.website,
        industry: payload.industry,
        notes: payload.notes,
    };

    let repo = OrganizationRepository::new((*state.db).clone());
    let organization = repo
        .update(id, input)
        .await?
        .ok_or_else(|| ApiError::not_found("Organization"))?;

    info!(organization_id = %id, "Organization updated");
    Ok(Json(organization))
}

async fn delete_organization(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    let repo = OrganizationRepository::new((*state.db).clone());
    if !repo.delete(id).await? {
        return Err(ApiError::not_found("Organization"));
    }

    info!(organization_id = %id, "Organization deleted");
    Ok(Json(json!({ "success": true })))
}
