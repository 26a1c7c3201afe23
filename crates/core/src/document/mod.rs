//! Document upload and deletion.
//!
//! Blobs live in object storage under keys derived from the owning deal;
//! rows in the `documents` table reference them. Upload writes the blob
//! first and deletes it again if the row insert fails. Delete removes the
//! blob first and keeps going if that fails.

mod error;
mod key;
mod service;
mod types;

pub use error::{Compensation, DocumentError};
pub use key::{derive_storage_key, file_extension, timestamp_token};
pub use service::{DocumentRepository, DocumentService};
pub use types::{
    CreateDocumentInput, DEFAULT_MIME_TYPE, DeleteOutcome, Document, UploadFile, UploadInput,
    UploadedDocument,
};
