//! Document routes.
//!
//! Uploads go through the coordinator in `dealdesk_core::document`, which
//! writes the blob, inserts the row and removes the blob again if the insert
//! fails.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::{ApiMultipart, ApiPath},
    middleware::AuthUser,
};
use dealdesk_core::document::{
    DeleteOutcome, DocumentService, UploadFile, UploadInput, UploadedDocument,
};
use dealdesk_core::storage::StorageService;
use dealdesk_db::repositories::DocumentRepository;

/// Room for multipart boundaries and the `deal_id` field on top of the file.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Document service wired to the shared storage and the database.
pub(crate) type Documents = DocumentService<StorageService, DocumentRepository>;

/// Creates the document routes.
///
/// The body limit sits just above `max_file_size` so oversized files reach
/// the coordinator and get its validation message.
pub fn routes(max_file_size: u64) -> Router<AppState> {
    let body_limit = usize::try_from(max_file_size.saturating_add(MULTIPART_OVERHEAD))
        .unwrap_or(usize::MAX);

    Router::new()
        .route(
            "/documents/upload",
            post(upload_document).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/documents/{id}", get(get_document).delete(delete_document))
}

/// Builds the document service for one request.
pub(crate) fn document_service(state: &AppState) -> Documents {
    let repo = DocumentRepository::new((*state.db).clone());
    DocumentService::new(state.storage.clone(), std::sync::Arc::new(repo))
        .with_max_file_size(state.max_file_size)
}

/// A document record with its public URL.
#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    /// Document ID.
    pub id: Uuid,
    /// Owning deal.
    pub deal_id: String,
    /// Original filename.
    pub file_name: String,
    /// Key in object storage.
    pub storage_key: String,
    /// Size in bytes.
    pub file_size: i64,
    /// MIME type.
    pub mime_type: String,
    /// Uploader.
    pub uploaded_by: Option<Uuid>,
    /// Created at (ISO 8601).
    pub created_at: String,
    /// Public URL of the blob.
    pub public_url: String,
}

impl From<UploadedDocument> for DocumentResponse {
    fn from(uploaded: UploadedDocument) -> Self {
        let doc = uploaded.document;
        Self {
            id: doc.id,
            deal_id: doc.owning_deal_id,
            file_name: doc.file_name,
            storage_key: doc.storage_key,
            file_size: doc.file_size,
            mime_type: doc.mime_type,
            uploaded_by: doc.uploaded_by,
            created_at: doc.created_at.to_rfc3339(),
            public_url: uploaded.public_url,
        }
    }
}

/// POST /documents/upload
///
/// Multipart form with a `file` part and a `deal_id` text part.
async fn upload_document(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiMultipart(mut multipart): ApiMultipart,
) -> ApiResult<(StatusCode, Json<DocumentResponse>)> {
    let mut deal_id: Option<String> = None;
    let mut file: Option<UploadFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "deal_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::validation(e.body_text()))?;
                deal_id = Some(text);
            }
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let mime_type = field.content_type().map(ToString::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(e.body_text()))?;
                file = Some(UploadFile {
                    name: file_name,
                    bytes,
                    mime_type,
                });
            }
            _ => {}
        }
    }

    // `deals.id` is a UUID; anything else would only fail at the insert.
    if let Some(raw) = deal_id.as_deref().map(str::trim).filter(|s| !s.is_empty())
        && Uuid::parse_str(raw).is_err()
    {
        return Err(ApiError::validation("deal_id must be a UUID"));
    }

    let input = UploadInput {
        owner_id: deal_id,
        file,
        uploaded_by: Some(auth.user_id()),
    };

    let uploaded = document_service(&state).upload(input).await?;

    info!(
        document_id = %uploaded.document.id,
        deal_id = %uploaded.document.owning_deal_id,
        user_id = %auth.user_id(),
        "Document uploaded"
    );

    Ok((StatusCode::CREATED, Json(uploaded.into())))
}

/// GET /documents/{id}
async fn get_document(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<DocumentResponse>> {
    let document = document_service(&state).get(id).await?;
    Ok(Json(document.into()))
}

/// DELETE /documents/{id}
async fn delete_document(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    match document_service(&state).delete(id).await? {
        DeleteOutcome::Removed => {
            info!(document_id = %id, user_id = %auth.user_id(), "Document removed");
        }
        DeleteOutcome::BlobRetained { storage_key } => {
            warn!(document_id = %id, storage_key = %storage_key, "Document removed, blob retained");
        }
    }

    Ok(Json(json!({ "success": true })))
}
