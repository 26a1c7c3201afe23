//! Organization repository for database operations.

use dealdesk_shared::types::PageRequest;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set,
};
use uuid::Uuid;

use super::fetch_page;
use crate::entities::organizations;

/// Input for creating an organization.
#[derive(Debug, Clone)]
pub struct CreateOrganizationInput {
    /// Display name.
    pub name: String,
    /// Website URL.
    pub website: Option<String>,
    /// Industry label.
    pub industry: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Input for updating an organization. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateOrganizationInput {
    /// Display name.
    pub name: Option<String>,
    /// Website URL.
    pub website: Option<Option<String>>,
    /// Industry label.
    pub industry: Option<Option<String>>,
    /// Free-form notes.
    pub notes: Option<Option<String>>,
}

/// Organization repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    db: DatabaseConnection,
}

impl OrganizationRepository {
    /// Creates a new organization repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists organizations by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        page: &PageRequest,
    ) -> Result<(Vec<organizations::Model>, u64), DbErr> {
        let query = organizations::Entity::find().order_by_asc(organizations::Column::Name);
        fetch_page(&self.db, query, page).await
    }

    /// Finds an organization by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a new organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        input: CreateOrganizationInput,
    ) -> Result<organizations::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let org = organizations::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            website: Set(input.website),
            industry: Set(input.industry),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };

        org.insert(&self.db).await
    }

    /// Updates an organization. Returns `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateOrganizationInput,
    ) -> Result<Option<organizations::Model>, DbErr> {
        let Some(org) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active: organizations::ActiveModel = org.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(website) = input.website {
            active.website = Set(website);
        }
        if let Some(industry) = input.industry {
            active.industry = Set(industry);
        }
        if let Some(notes) = input.notes {
            active.notes = Set(notes);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(&self.db).await.map(Some)
    }

    /// Deletes an organization. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = organizations::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::{count_row, ts};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn acme() -> organizations::Model {
        organizations::Model {
            id: Uuid::new_v4(),
            name: "Acme Events".to_string(),
            website: Some("https://acme.example".to_string()),
            industry: Some("Media".to_string()),
            notes: None,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    #[tokio::test]
    async fn test_list_returns_page_and_total() {
        let org = acme();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(41)]])
            .append_query_results([[org.clone()]])
            .into_connection();

        let repo = OrganizationRepository::new(db);
        let (items, total) = repo.list(&PageRequest::default()).await.unwrap();

        assert_eq!(total, 41);
        assert_eq!(items, vec![org]);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<organizations::Model>::new()])
            .into_connection();

        let repo = OrganizationRepository::new(db);
        let result = repo
            .update(Uuid::new_v4(), UpdateOrganizationInput::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_applies_fields() {
        let org = acme();
        let mut renamed = org.clone();
        renamed.name = "Acme Live".to_string();
        renamed.website = None;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[org.clone()]])
            .append_query_results([[renamed.clone()]])
            .into_connection();

        let repo = OrganizationRepository::new(db);
        let updated = repo
            .update(
                org.id,
                UpdateOrganizationInput {
                    name: Some("Acme Live".to_string()),
                    website: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Acme Live");
        assert!(updated.website.is_none());
    }

    #[tokio::test]
    async fn test_delete_reports_rows_affected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();

        let repo = OrganizationRepository::new(db);
        assert!(repo.delete(Uuid::new_v4()).await.unwrap());
        assert!(!repo.delete(Uuid::new_v4()).await.unwrap());
    }
}
