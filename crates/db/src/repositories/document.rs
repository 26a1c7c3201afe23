//! Document repository for database operations.
//!
//! Implements the core `DocumentRepository` trait using SeaORM.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::documents;
use dealdesk_core::document::{
    CreateDocumentInput, Document, DocumentError, DocumentRepository as DocumentRepoTrait,
};

/// Document repository implementation.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    db: DatabaseConnection,
}

impl DocumentRepository {
    /// Create a new document repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl DocumentRepoTrait for DocumentRepository {
    async fn create(&self, input: CreateDocumentInput) -> Result<Document, DocumentError> {
        let deal_id = parse_deal_id(&input.owning_deal_id)?;

        let active_model = documents::ActiveModel {
            id: Set(Uuid::new_v4()),
            deal_id: Set(deal_id),
            file_name: Set(input.file_name),
            storage_key: Set(input.storage_key),
            file_size: Set(input.file_size),
            mime_type: Set(input.mime_type),
            uploaded_by: Set(input.uploaded_by),
            created_at: Set(Utc::now().into()),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| DocumentError::repository(e.to_string()))?;

        Ok(to_domain(model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>, DocumentError> {
        let model = documents::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| DocumentError::repository(e.to_string()))?;

        Ok(model.map(to_domain))
    }

    async fn list_by_deal(&self, deal_id: &str) -> Result<Vec<Document>, DocumentError> {
        let deal_id = parse_deal_id(deal_id)?;

        let models = documents::Entity::find()
            .filter(documents::Column::DealId.eq(deal_id))
            .order_by_desc(documents::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| DocumentError::repository(e.to_string()))?;

        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DocumentError> {
        let result = documents::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| DocumentError::repository(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

/// `deals.id` is a UUID column.
fn parse_deal_id(raw: &str) -> Result<Uuid, DocumentError> {
    Uuid::parse_str(raw).map_err(|_| DocumentError::validation("deal_id must be a UUID"))
}

/// Convert database model to domain model.
fn to_domain(model: documents::Model) -> Document {
    Document {
        id: model.id,
        owning_deal_id: model.deal_id.to_string(),
        file_name: model.file_name,
        storage_key: model.storage_key,
        file_size: model.file_size,
        mime_type: model.mime_type,
        uploaded_by: model.uploaded_by,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
