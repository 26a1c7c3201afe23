//! Tag routes.

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
use dealdesk_db::{CreateTagInput, TagRepository, UpdateTagInput, entities::tags};
use dealdesk_shared::types::{PageRequest, PageResponse};

/// Creates the tag routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tags", get(list_tags).post(create_tag))
        .route(
            "/tags/{id}",
            get(get_tag).patch(update_tag).delete(delete_tag),
        )
}

/// Request body for creating a tag.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTagRequest {
    /// Unique name.
    #[validate(length(max = 64))]
    pub name: String,
    /// Display color, e.g. `#ff8800`.
    #[validate(length(max = 16))]
    pub color: Option<String>,
}

/// Request body for updating a tag.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTagRequest {
    /// Unique name.
    pub name: Option<String>,
    /// Display color, `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub color: Option<Option<String>>,
}

async fn list_tags(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> ApiResult<Json<PageResponse<tags::Model>>> {
    let repo = TagRepository::new((*state.db).clone());
    let (items, total) = repo.list(&page).await?;
    Ok(Json(PageResponse::new(items, &page, total)))
}

async fn get_tag(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<tags::Model>> {
    let repo = TagRepository::new((*state.db).clone());
    repo.find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Tag"))
}

async fn create_tag(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateTagRequest>,
) -> ApiResult<(StatusCode, Json<tags::Model>)> {
    let name = require_text("name", &payload.name)?;

    let repo = TagRepository::new((*state.db).clone());
    if repo.name_exists(&name, None).await? {
        return Err(ApiError::conflict(format!("Tag '{name}' already exists")));
    }

    let tag = repo
        .create(CreateTagInput {
            name,
            color: payload.color,
        })
        .await?;

    info!(tag_id = %tag.id, name = %tag.name, "Tag created");
    Ok((StatusCode::CREATED, Json(tag)))
}

async fn update_tag(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateTagRequest>,
) -> ApiResult<Json<tags::Model>> {
    let name = payload
        .name
        .as_deref()
        .map(|n| require_text("name", n))
        .transpose()?;

    let repo = TagRepository::new((*state.db).clone());
    if let Some(name) = &name
        && repo.name_exists(name, Some(id)).await?
    {
        return Err(ApiError::conflict(format!("Tag '{name}' already exists")));
    }

    let tag = repo
        .update(
            id,
            UpdateTagInput {
                name,
                color: payload.color,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Tag"))?;

    info!(tag_id = %id, "Tag updated");
    Ok(Json(tag))
}

async fn delete_tag(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    let repo = TagRepository::new((*state.db).clone());
    if !repo.delete(id).await? {
        return Err(ApiError::not_found("Tag"));
    }

    info!(tag_id = %id, "Tag deleted");
    Ok(Json(json!({ "success": true })))
}
