//! Contact repository for database operations.

use dealdesk_shared::types::PageRequest;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::fetch_page;
use crate::entities::contacts;

/// Input for creating a contact.
#[derive(Debug, Clone)]
pub struct CreateContactInput {
    /// Employer, if known.
    pub organization_id: Option<Uuid>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Job title.
    pub job_title: Option<String>,
}

/// Input for updating a contact. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateContactInput {
    /// Employer.
    pub organization_id: Option<Option<Uuid>>,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Email address.
    pub email: Option<Option<String>>,
    /// Phone number.
    pub phone: Option<Option<String>>,
    /// Job title.
    pub job_title: Option<Option<String>>,
}

/// Filter options for listing contacts.
#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    /// Only contacts at this organization.
    pub organization_id: Option<Uuid>,
}

/// Contact repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ContactRepository {
    db: DatabaseConnection,
}

impl ContactRepository {
    /// Creates a new contact repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists contacts by last name, then first name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: ContactFilter,
        page: &PageRequest,
    ) -> Result<(Vec<contacts::Model>, u64), DbErr> {
        let mut query = contacts::Entity::find()
            .order_by_asc(contacts::Column::LastName)
            .order_by_asc(contacts::Column::FirstName);

        if let Some(org_id) = filter.organization_id {
            query = query.filter(contacts::Column::OrganizationId.eq(org_id));
        }

        fetch_page(&self.db, query, page).await
    }

    /// Finds a contact by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<contacts::Model>, DbErr> {
        contacts::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a new contact.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: CreateContactInput) -> Result<contacts::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let contact = contacts::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(input.organization_id),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            email: Set(input.email),
            phone: Set(input.phone),
            job_title: Set(input.job_title),
            created_at: Set(now),
            updated_at: Set(now),
        };

        contact.insert(&self.db).await
    }

    /// Updates a contact. Returns `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateContactInput,
    ) -> Result<Option<contacts::Model>, DbErr> {
        let Some(contact) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active: contacts::ActiveModel = contact.into();
        if let Some(organization_id) = input.organization_id {
            active.organization_id = Set(organization_id);
        }
        if let Some(first_name) = input.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(phone);
        }
        if let Some(job_title) = input.job_title {
            active.job_title = Set(job_title);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(&self.db).await.map(Some)
    }

    /// Deletes a contact. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = contacts::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
