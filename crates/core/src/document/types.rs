//! Document types and data structures.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// MIME type recorded when the client sends none.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// A file received from a client.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Original client-supplied name.
    pub name: String,
    /// Raw content.
    pub bytes: Bytes,
    /// Declared MIME type.
    pub mime_type: Option<String>,
}

/// Input for uploading a document.
///
/// Both fields are optional so that missing form fields are reported by the
/// coordinator's validation rather than by each caller.
#[derive(Debug, Clone, Default)]
pub struct UploadInput {
    /// Owning deal.
    pub owner_id: Option<String>,
    /// File to store.
    pub file: Option<UploadFile>,
    /// Authenticated caller.
    pub uploaded_by: Option<Uuid>,
}

/// Input for creating a document record.
#[derive(Debug, Clone)]
pub struct CreateDocumentInput {
    /// Owning deal.
    pub owning_deal_id: String,
    /// Original filename.
    pub file_name: String,
    /// Storage key of the already-written blob.
    pub storage_key: String,
    /// File size in bytes.
    pub file_size: i64,
    /// MIME type.
    pub mime_type: String,
    /// User who uploaded.
    pub uploaded_by: Option<Uuid>,
}

/// Document domain model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning deal.
    pub owning_deal_id: String,
    /// Original filename, informational only.
    pub file_name: String,
    /// Sole handle into object storage.
    pub storage_key: String,
    /// File size in bytes.
    pub file_size: i64,
    /// MIME type.
    pub mime_type: String,
    /// User who uploaded.
    pub uploaded_by: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A document together with its derived public URL.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    /// The stored record.
    pub document: Document,
    /// Public URL derived from the storage key.
    pub public_url: String,
}

/// Result of a successful delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Blob and row are both gone.
    Removed,
    /// The row is gone but the blob delete failed.
    BlobRetained {
        /// Key of the retained blob.
        storage_key: String,
    },
}
