//! Event routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::{ApiJson, ApiPath, ApiQuery, double_option},
};
use dealdesk_core::crm::{require_text, validate_event_window};
use dealdesk_db::{CreateEventInput, EventRepository, UpdateEventInput, entities::events};
use dealdesk_shared::types::{PageRequest, PageResponse};

/// Creates the event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/{id}",
            get(get_event).patch(update_event).delete(delete_event),
        )
}

/// Request body for creating an event.
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    /// Event name.
    pub name: String,
    /// Venue or city.
    pub location: Option<String>,
    /// Start time.
    pub starts_at: DateTime<Utc>,
    /// End time, not before `starts_at`.
    pub ends_at: Option<DateTime<Utc>>,
    /// Description.
    pub description: Option<String>,
}

/// Request body for updating an event.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateEventRequest {
    /// Event name.
    pub name: Option<String>,
    /// Venue, `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    /// Start time.
    pub starts_at: Option<DateTime<Utc>>,
    /// End time, `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub ends_at: Option<Option<DateTime<Utc>>>,
    /// Description, `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

async fn list_events(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> ApiResult<Json<PageResponse<events::Model>>> {
    let repo = EventRepository::new((*state.db).clone());
    let (items, total) = repo.list(&page).await?;
    Ok(Json(PageResponse::new(items, &page, total)))
}

async fn get_event(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<events::Model>> {
    let repo = EventRepository::new((*state.db).clone());
    repo.find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Event"))
}

async fn create_event(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<events::Model>)> {
    let name = require_text("name", &payload.name)?;
    validate_event_window(payload.starts_at, payload.ends_at)?;

    let repo = EventRepository::new((*state.db).clone());
    let event = repo
        .create(CreateEventInput {
            name,
            location: payload.location,
            starts_at: payload.starts_at,
            ends_at: payload.ends_at,
            description: payload.description,
        })
        .await?;

    info!(event_id = %event.id, "Event created");
    Ok((StatusCode::CREATED, Json(event)))
}

async fn update_event(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateEventRequest>,
) -> ApiResult<Json<events::Model>> {
    let name = payload
        .name
        .as_deref()
        .map(|n| require_text("name", n))
        .transpose()?;

    let repo = EventRepository::new((*state.db).clone());

    // Check the window against the stored values.
    if payload.starts_at.is_some() || payload.ends_at.is_some() {
        let current = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Event"))?;

        let starts_at = payload
            .starts_at
            .unwrap_or_else(|| current.starts_at.with_timezone(&Utc));
        let ends_at = payload
            .ends_at
            .unwrap_or_else(|| current.ends_at.map(|t| t.with_timezone(&Utc)));
        validate_event_window(starts_at, ends_at)?;
    }

    let event = repo
        .update(
            id,
            UpdateEventInput {
                name,
                location: payload.location,
                starts_at: payload.starts_at,
                ends_at: payload.ends_at,
                description: payload.description,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Event"))?;

    info!(event_id = %id, "Event updated");
    Ok(Json(event))
}

async fn delete_event(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    let repo = EventRepository::new((*state.db).clone());
    if !repo.delete(id).await? {
        return Err(ApiError::not_found("Event"));
    }

    info!(event_id = %id, "Event deleted");
    Ok(Json(json!({ "success": true })))
}
