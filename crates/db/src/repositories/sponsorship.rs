//! Sponsorship tier and counterpart repository.

use dealdesk_shared::types::PageRequest;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::fetch_page;
use crate::entities::{sponsorship_tiers, tier_counterparts};

/// Input for creating a sponsorship tier.
#[derive(Debug, Clone)]
pub struct CreateTierInput {
    /// Event the tier is sold for.
    pub event_id: Option<Uuid>,
    /// Tier name, e.g. "Gold".
    pub name: String,
    /// Price, zero or more.
    pub price: Decimal,
    /// Number of sponsors the tier can take, zero or more.
    pub slots: i32,
    /// Description.
    pub description: Option<String>,
}

/// Input for updating a tier. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateTierInput {
    /// Event the tier is sold for.
    pub event_id: Option<Option<Uuid>>,
    /// Tier name.
    pub name: Option<String>,
    /// Price.
    pub price: Option<Decimal>,
    /// Slots.
    pub slots: Option<i32>,
    /// Description.
    pub description: Option<Option<String>>,
}

/// Filter options for listing tiers.
#[derive(Debug, Clone, Default)]
pub struct TierFilter {
    /// Only tiers for this event.
    pub event_id: Option<Uuid>,
}

/// Input for adding a counterpart to a tier.
#[derive(Debug, Clone)]
pub struct CreateCounterpartInput {
    /// What the sponsor receives.
    pub description: String,
    /// How many, at least one.
    pub quantity: i32,
}

/// Repository for sponsorship tiers and their counterparts.
#[derive(Debug, Clone)]
pub struct SponsorshipRepository {
    db: DatabaseConnection,
}

impl SponsorshipRepository {
    /// Creates a new sponsorship repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists tiers, most expensive first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_tiers(
        &self,
        filter: TierFilter,
        page: &PageRequest,
    ) -> Result<(Vec<sponsorship_tiers::Model>, u64), DbErr> {
        let mut query = sponsorship_tiers::Entity::find()
            .order_by_desc(sponsorship_tiers::Column::Price)
            .order_by_asc(sponsorship_tiers::Column::Name);

        if let Some(event_id) = filter.event_id {
            query = query.filter(sponsorship_tiers::Column::EventId.eq(event_id));
        }

        fetch_page(&self.db, query, page).await
    }

    /// Finds a tier by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_tier(&self, id: Uuid) -> Result<Option<sponsorship_tiers::Model>, DbErr> {
        sponsorship_tiers::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a new tier.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_tier(
        &self,
        input: CreateTierInput,
    ) -> Result<sponsorship_tiers::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let tier = sponsorship_tiers::ActiveModel {
            id: Set(Uuid::new_v4()),
            event_id: Set(input.event_id),
            name: Set(input.name),
            price: Set(input.price),
            slots: Set(input.slots),
            description: Set(input.description),
            created_at: Set(now),
            updated_at: Set(now),
        };

        tier.insert(&self.db).await
    }

    /// Updates a tier. Returns `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn update_tier(
        &self,
        id: Uuid,
        input: UpdateTierInput,
    ) -> Result<Option<sponsorship_tiers::Model>, DbErr> {
        let Some(tier) = self.find_tier(id).await? else {
            return Ok(None);
        };

        let mut active: sponsorship_tiers::ActiveModel = tier.into();
        if let Some(event_id) = input.event_id {
            active.event_id = Set(event_id);
        }
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(price) = input.price {
            active.price = Set(price);
        }
        if let Some(slots) = input.slots {
            active.slots = Set(slots);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(&self.db).await.map(Some)
    }

    /// Deletes a tier. Counterparts cascade. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete_tier(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = sponsorship_tiers::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Lists a tier's counterparts in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_counterparts(
        &self,
        tier_id: Uuid,
    ) -> Result<Vec<tier_counterparts::Model>, DbErr> {
        tier_counterparts::Entity::find()
            .filter(tier_counterparts::Column::TierId.eq(tier_id))
            .order_by_asc(tier_counterparts::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Adds a counterpart to a tier.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn add_counterpart(
        &self,
        tier_id: Uuid,
        input: CreateCounterpartInput,
    ) -> Result<tier_counterparts::Model, DbErr> {
        let counterpart = tier_counterparts::ActiveModel {
            id: Set(Uuid::new_v4()),
            tier_id: Set(tier_id),
            description: Set(input.description),
            quantity: Set(input.quantity),
            created_at: Set(chrono::Utc::now().into()),
        };

        counterpart.insert(&self.db).await
    }

    /// Removes a counterpart from a tier. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn remove_counterpart(&self, tier_id: Uuid, id: Uuid) -> Result<bool, DbErr> {
        let result = tier_counterparts::Entity::delete_many()
            .filter(tier_counterparts::Column::Id.eq(id))
            .filter(tier_counterparts::Column::TierId.eq(tier_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
