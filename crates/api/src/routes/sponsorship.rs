//! Sponsorship tier and counterpart routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::{ApiJson, ApiPath, ApiQuery, double_option},
};
use dealdesk_core::crm::{
    require_text, validate_counterpart_quantity, validate_tier_price, validate_tier_slots,
};
use dealdesk_db::{
    CreateCounterpartInput, CreateTierInput, SponsorshipRepository, TierFilter, UpdateTierInput,
    entities::{sponsorship_tiers, tier_counterparts},
};
use dealdesk_shared::types::{PageRequest, PageResponse};

/// Creates the sponsorship routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sponsorship-tiers", get(list_tiers).post(create_tier))
        .route(
            "/sponsorship-tiers/{id}",
            get(get_tier).patch(update_tier).delete(delete_tier),
        )
        .route(
            "/sponsorship-tiers/{id}/counterparts",
            get(list_counterparts).post(add_counterpart),
        )
        .route(
            "/sponsorship-tiers/{id}/counterparts/{counterpart_id}",
            delete(remove_counterpart),
        )
}

/// Query parameters for listing tiers.
#[derive(Debug, Deserialize)]
pub struct ListTiersQuery {
    /// Only tiers of this event.
    pub event_id: Option<Uuid>,
}

/// Request body for creating a tier.
#[derive(Debug, Deserialize)]
pub struct CreateTierRequest {
    /// Event the tier is sold for.
    pub event_id: Option<Uuid>,
    /// Tier name, e.g. "Gold".
    pub name: String,
    /// Price per slot.
    pub price: Decimal,
    /// Number of sponsors the tier can take.
    pub slots: i32,
    /// Description.
    pub description: Option<String>,
}

/// Request body for updating a tier.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTierRequest {
    /// Event, `null` detaches.
    #[serde(default, deserialize_with = "double_option")]
    pub event_id: Option<Option<Uuid>>,
    /// Tier name.
    pub name: Option<String>,
    /// Price per slot.
    pub price: Option<Decimal>,
    /// Number of slots.
    pub slots: Option<i32>,
    /// Description, `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

/// Request body for adding a counterpart.
#[derive(Debug, Deserialize)]
pub struct CreateCounterpartRequest {
    /// What the sponsor receives.
    pub description: String,
    /// How many, at least 1.
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

const fn default_quantity() -> i32 {
    1
}

async fn list_tiers(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageRequest>,
    ApiQuery(query): ApiQuery<ListTiersQuery>,
) -> ApiResult<Json<PageResponse<sponsorship_tiers::Model>>> {
    let repo = SponsorshipRepository::new((*state.db).clone());
    let (items, total) = repo
        .list_tiers(
            TierFilter {
                event_id: query.event_id,
            },
            &page,
        )
        .await?;
    Ok(Json(PageResponse::new(items, &page, total)))
}

async fn get_tier(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<sponsorship_tiers::Model>> {
    let repo = SponsorshipRepository::new((*state.db).clone());
    repo.find_tier(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Sponsorship tier"))
}

async fn create_tier(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateTierRequest>,
) -> ApiResult<(StatusCode, Json<sponsorship_tiers::Model>)> {
    let name = require_text("name", &payload.name)?;
    validate_tier_price(payload.price)?;
    validate_tier_slots(payload.slots)?;

    let repo = SponsorshipRepository::new((*state.db).clone());
    let tier = repo
        .create_tier(CreateTierInput {
            event_id: payload.event_id,
            name,
            price: payload.price,
            slots: payload.slots,
            description: payload.description,
        })
        .await?;

    info!(tier_id = %tier.id, price = %tier.price, slots = tier.slots, "Sponsorship tier created");
    Ok((StatusCode::CREATED, Json(tier)))
}

async fn update_tier(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateTierRequest>,
) -> ApiResult<Json<sponsorship_tiers::Model>> {
    let name = payload
        .name
        .as_deref()
        .map(|n| require_text("name", n))
        .transpose()?;
    if let Some(price) = payload.price {
        validate_tier_price(price)?;
    }
    if let Some(slots) = payload.slots {
        validate_tier_slots(slots)?;
    }

    let repo = SponsorshipRepository::new((*state.db).clone());
    let tier = repo
        .update_tier(
            id,
            UpdateTierInput {
                event_id: payload.event_id,
                name,
                price: payload.price,
                slots: payload.slots,
                description: payload.description,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Sponsorship tier"))?;

    info!(tier_id = %id, "Sponsorship tier updated");
    Ok(Json(tier))
}

async fn delete_tier(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    let repo = SponsorshipRepository::new((*state.db).clone());
    if !repo.delete_tier(id).await? {
        return Err(ApiError::not_found("Sponsorship tier"));
    }

    info!(tier_id = %id, "Sponsorship tier deleted");
    Ok(Json(json!({ "success": true })))
}

async fn list_counterparts(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<tier_counterparts::Model>>> {
    let repo = SponsorshipRepository::new((*state.db).clone());
    if repo.find_tier(id).await?.is_none() {
        return Err(ApiError::not_found("Sponsorship tier"));
    }
    Ok(Json(repo.list_counterparts(id).await?))
}

async fn add_counterpart(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CreateCounterpartRequest>,
) -> ApiResult<(StatusCode, Json<tier_counterparts::Model>)> {
    let description = require_text("description", &payload.description)?;
    validate_counterpart_quantity(payload.quantity)?;

    let repo = SponsorshipRepository::new((*state.db).clone());
    if repo.find_tier(id).await?.is_none() {
        return Err(ApiError::not_found("Sponsorship tier"));
    }

    let counterpart = repo
        .add_counterpart(
            id,
            CreateCounterpartInput {
                description,
                quantity: payload.quantity,
            },
        )
        .await?;

    info!(tier_id = %id, counterpart_id = %counterpart.id, "Counterpart added");
    Ok((StatusCode::CREATED, Json(counterpart)))
}

async fn remove_counterpart(
    State(state): State<AppState>,
    ApiPath((id, counterpart_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<Value>> {
    let repo = SponsorshipRepository::new((*state.db).clone());
    if !repo.remove_counterpart(id, counterpart_id).await? {
        return Err(ApiError::not_found("Counterpart"));
    }

    info!(tier_id = %id, counterpart_id = %counterpart_id, "Counterpart removed");
    Ok(Json(json!({ "success": true })))
}
