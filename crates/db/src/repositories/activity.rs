//! Deal activity repository.

use chrono::{DateTime, Utc};
use dealdesk_core::crm::ActivityKind;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::activities;

/// Input for logging an activity on a deal.
#[derive(Debug, Clone)]
pub struct CreateActivityInput {
    /// Deal the activity belongs to.
    pub deal_id: Uuid,
    /// Kind of activity.
    pub kind: ActivityKind,
    /// What happened.
    pub summary: String,
    /// When it happened.
    pub occurred_at: DateTime<Utc>,
    /// Logged by.
    pub created_by: Option<Uuid>,
}

/// Activity repository.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    db: DatabaseConnection,
}

impl ActivityRepository {
    /// Creates a new activity repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists a deal's activities, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_deal(&self, deal_id: Uuid) -> Result<Vec<activities::Model>, DbErr> {
        activities::Entity::find()
            .filter(activities::Column::DealId.eq(deal_id))
            .order_by_desc(activities::Column::OccurredAt)
            .all(&self.db)
            .await
    }

    /// Logs an activity.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: CreateActivityInput) -> Result<activities::Model, DbErr> {
        let activity = activities::ActiveModel {
            id: Set(Uuid::new_v4()),
            deal_id: Set(input.deal_id),
            kind: Set(input.kind.as_str().to_string()),
            summary: Set(input.summary),
            occurred_at: Set(input.occurred_at.into()),
            created_by: Set(input.created_by),
            created_at: Set(Utc::now().into()),
        };

        activity.insert(&self.db).await
    }
}
