//! Deal repository for database operations.
//!
//! Also owns the `deal_tags` join table.

use chrono::NaiveDate;
use dealdesk_core::crm::DealStage;
use dealdesk_shared::types::PageRequest;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, sea_query::OnConflict,
};
use uuid::Uuid;

use super::fetch_page;
use crate::entities::{deal_tags, deals, tags};

/// Input for creating a deal.
#[derive(Debug, Clone)]
pub struct CreateDealInput {
    /// Deal title.
    pub title: String,
    /// Counterparty organization.
    pub organization_id: Option<Uuid>,
    /// Primary contact.
    pub contact_id: Option<Uuid>,
    /// Pipeline stage.
    pub stage: DealStage,
    /// Expected value.
    pub value: Option<Decimal>,
    /// ISO 4217 code.
    pub currency: String,
    /// Expected close date.
    pub expected_close_date: Option<NaiveDate>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Input for updating a deal. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateDealInput {
    /// Deal title.
    pub title: Option<String>,
    /// Counterparty organization.
    pub organization_id: Option<Option<Uuid>>,
    /// Primary contact.
    pub contact_id: Option<Option<Uuid>>,
    /// Pipeline stage.
    pub stage: Option<DealStage>,
    /// Expected value.
    pub value: Option<Option<Decimal>>,
    /// ISO 4217 code.
    pub currency: Option<String>,
    /// Expected close date.
    pub expected_close_date: Option<Option<NaiveDate>>,
    /// Free-form notes.
    pub notes: Option<Option<String>>,
}

/// Filter options for listing deals.
#[derive(Debug, Clone, Default)]
pub struct DealFilter {
    /// Only deals in this stage.
    pub stage: Option<DealStage>,
    /// Only deals with this organization.
    pub organization_id: Option<Uuid>,
}

/// Deal repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct DealRepository {
    db: DatabaseConnection,
}

impl DealRepository {
    /// Creates a new deal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists deals, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: DealFilter,
        page: &PageRequest,
    ) -> Result<(Vec<deals::Model>, u64), DbErr> {
        let mut query = deals::Entity::find().order_by_desc(deals::Column::CreatedAt);

        if let Some(stage) = filter.stage {
            query = query.filter(deals::Column::Stage.eq(stage.as_str()));
        }
        if let Some(org_id) = filter.organization_id {
            query = query.filter(deals::Column::OrganizationId.eq(org_id));
        }

        fetch_page(&self.db, query, page).await
    }

    /// Finds a deal by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<deals::Model>, DbErr> {
        deals::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a new deal.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: CreateDealInput) -> Result<deals::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let deal = deals::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(input.title),
            organization_id: Set(input.organization_id),
            contact_id: Set(input.contact_id),
            stage: Set(input.stage.as_str().to_string()),
            value: Set(input.value),
            currency: Set(input.currency),
            expected_close_date: Set(input.expected_close_date),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };

        deal.insert(&self.db).await
    }

    /// Updates a deal. Returns `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateDealInput,
    ) -> Result<Option<deals::Model>, DbErr> {
        let Some(deal) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active: deals::ActiveModel = deal.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(organization_id) = input.organization_id {
            active.organization_id = Set(organization_id);
        }
        if let Some(contact_id) = input.contact_id {
            active.contact_id = Set(contact_id);
        }
        if let Some(stage) = input.stage {
            active.stage = Set(stage.as_str().to_string());
        }
        if let Some(value) = input.value {
            active.value = Set(value);
        }
        if let Some(currency) = input.currency {
            active.currency = Set(currency);
        }
        if let Some(expected_close_date) = input.expected_close_date {
            active.expected_close_date = Set(expected_close_date);
        }
        if let Some(notes) = input.notes {
            active.notes = Set(notes);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(&self.db).await.map(Some)
    }

    /// Deletes a deal. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = deals::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Tags
    // ========================================================================

    /// Tags a deal. Attaching an existing tag again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn attach_tag(&self, deal_id: Uuid, tag_id: Uuid) -> Result<(), DbErr> {
        let link = deal_tags::ActiveModel {
            deal_id: Set(deal_id),
            tag_id: Set(tag_id),
            created_at: Set(chrono::Utc::now().into()),
        };

        deal_tags::Entity::insert(link)
            .on_conflict(
                OnConflict::columns([deal_tags::Column::DealId, deal_tags::Column::TagId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(())
    }

    /// Removes a tag from a deal. Returns whether a link was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn detach_tag(&self, deal_id: Uuid, tag_id: Uuid) -> Result<bool, DbErr> {
        let result = deal_tags::Entity::delete_many()
            .filter(deal_tags::Column::DealId.eq(deal_id))
            .filter(deal_tags::Column::TagId.eq(tag_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Lists a deal's tags by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_tags(&self, deal_id: Uuid) -> Result<Vec<tags::Model>, DbErr> {
        let tag_ids: Vec<Uuid> = deal_tags::Entity::find()
            .select_only()
            .column(deal_tags::Column::TagId)
            .filter(deal_tags::Column::DealId.eq(deal_id))
            .into_tuple()
            .all(&self.db)
            .await?;

        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }

        tags::Entity::find()
            .filter(tags::Column::Id.is_in(tag_ids))
            .order_by_asc(tags::Column::Name)
            .all(&self.db)
            .await
    }
}
