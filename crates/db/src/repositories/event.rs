//! Event repository for database operations.

use chrono::{DateTime, Utc};
use dealdesk_shared::types::PageRequest;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use super::fetch_page;
use crate::entities::events;

/// Input for creating an event.
#[derive(Debug, Clone)]
pub struct CreateEventInput {
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

/// Input for updating an event. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateEventInput {
    /// Event name.
    pub name: Option<String>,
    /// Venue or city.
    pub location: Option<Option<String>>,
    /// Start time.
    pub starts_at: Option<DateTime<Utc>>,
    /// End time.
    pub ends_at: Option<Option<DateTime<Utc>>>,
    /// Description.
    pub description: Option<Option<String>>,
}

/// Event repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct EventRepository {
    db: DatabaseConnection,
}

impl EventRepository {
    /// Creates a new event repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists events, soonest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, page: &PageRequest) -> Result<(Vec<events::Model>, u64), DbErr> {
        let query = events::Entity::find().order_by_asc(events::Column::StartsAt);
        fetch_page(&self.db, query, page).await
    }

    /// Finds an event by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<events::Model>, DbErr> {
        events::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a new event.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: CreateEventInput) -> Result<events::Model, DbErr> {
        let now = Utc::now().into();
        let event = events::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            location: Set(input.location),
            starts_at: Set(input.starts_at.into()),
            ends_at: Set(input.ends_at.map(Into::into)),
            description: Set(input.description),
            created_at: Set(now),
            updated_at: Set(now),
        };

        event.insert(&self.db).await
    }

    /// Updates an event. Returns `None` if it does not exist.
    ///
    /// The caller checks the resulting window against the stored row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateEventInput,
    ) -> Result<Option<events::Model>, DbErr> {
        let Some(event) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active: events::ActiveModel = event.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(location) = input.location {
            active.location = Set(location);
        }
        if let Some(starts_at) = input.starts_at {
            active.starts_at = Set(starts_at.into());
        }
        if let Some(ends_at) = input.ends_at {
            active.ends_at = Set(ends_at.map(Into::into));
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map(Some)
    }

    /// Deletes an event. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = events::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
