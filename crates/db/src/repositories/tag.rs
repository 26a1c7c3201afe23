//! Tag repository for database operations.

use dealdesk_shared::types::PageRequest;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::fetch_page;
use crate::entities::tags;

/// Input for creating a tag.
#[derive(Debug, Clone)]
pub struct CreateTagInput {
    /// Unique name.
    pub name: String,
    /// Display colour, e.g. `#0ea5e9`.
    pub color: Option<String>,
}

/// Input for updating a tag. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateTagInput {
    /// Unique name.
    pub name: Option<String>,
    /// Display colour.
    pub color: Option<Option<String>>,
}

/// Tag repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct TagRepository {
    db: DatabaseConnection,
}

impl TagRepository {
    /// Creates a new tag repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists tags by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, page: &PageRequest) -> Result<(Vec<tags::Model>, u64), DbErr> {
        let query = tags::Entity::find().order_by_asc(tags::Column::Name);
        fetch_page(&self.db, query, page).await
    }

    /// Finds a tag by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<tags::Model>, DbErr> {
        tags::Entity::find_by_id(id).one(&self.db).await
    }

    /// Checks if a tag name is taken by a tag other than `except`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn name_exists(&self, name: &str, except: Option<Uuid>) -> Result<bool, DbErr> {
        let mut query = tags::Entity::find().filter(tags::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(tags::Column::Id.ne(id));
        }
        Ok(query.count(&self.db).await? > 0)
    }

    /// Creates a new tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: CreateTagInput) -> Result<tags::Model, DbErr> {
        let tag = tags::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            color: Set(input.color),
            created_at: Set(chrono::Utc::now().into()),
        };

        tag.insert(&self.db).await
    }

    /// Updates a tag. Returns `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn update(&self, id: Uuid, input: UpdateTagInput) -> Result<Option<tags::Model>, DbErr> {
        let Some(tag) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active: tags::ActiveModel = tag.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(color) = input.color {
            active.color = Set(color);
        }

        active.update(&self.db).await.map(Some)
    }

    /// Deletes a tag. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = tags::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::count_row;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_name_exists() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(1)], [count_row(0)]])
            .into_connection();

        let repo = TagRepository::new(db);
        assert!(repo.name_exists("vip", None).await.unwrap());
        assert!(!repo.name_exists("vip", Some(Uuid::new_v4())).await.unwrap());
    }
}
