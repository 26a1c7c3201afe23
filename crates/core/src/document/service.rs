//! Document service implementation.

use std::future::Future;
use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use super::error::{Compensation, DocumentError};
use super::key::{derive_storage_key, timestamp_token};
use super::types::{
    CreateDocumentInput, DEFAULT_MIME_TYPE, DeleteOutcome, Document, UploadFile, UploadInput,
    UploadedDocument,
};
use crate::storage::{ObjectStore, StorageConfig};

/// Repository trait for document persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait DocumentRepository: Send + Sync {
    /// Create a new document record.
    fn create(
        &self,
        input: CreateDocumentInput,
    ) -> impl Future<Output = Result<Document, DocumentError>> + Send;

    /// Find document by ID.
    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Document>, DocumentError>> + Send;

    /// List documents for a deal, newest first.
    fn list_by_deal(
        &self,
        deal_id: &str,
    ) -> impl Future<Output = Result<Vec<Document>, DocumentError>> + Send;

    /// Delete document by ID. Returns whether a row was removed.
    fn delete(&self, id: Uuid) -> impl Future<Output = Result<bool, DocumentError>> + Send;
}

/// Coordinates blob storage and document rows.
pub struct DocumentService<S: ObjectStore, R: DocumentRepository> {
    storage: Arc<S>,
    repo: Arc<R>,
    max_file_size: u64,
}

impl<S: ObjectStore, R: DocumentRepository> DocumentService<S, R> {
    /// Create a new document service.
    #[must_use]
    pub fn new(storage: Arc<S>, repo: Arc<R>) -> Self {
        Self {
            storage,
            repo,
            max_file_size: StorageConfig::DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Set the upload size limit.
    #[must_use]
    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Check preconditions before any I/O.
    fn validate(&self, input: UploadInput) -> Result<(String, UploadFile), DocumentError> {
        let owner_id = input
            .owner_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| DocumentError::validation("deal_id is required"))?;

        if owner_id.contains('/') {
            return Err(DocumentError::validation("deal_id must not contain '/'"));
        }

        let file = input
            .file
            .ok_or_else(|| DocumentError::validation("file is required"))?;

        if file.name.trim().is_empty() {
            return Err(DocumentError::validation("file name is required"));
        }

        if file.bytes.is_empty() {
            return Err(DocumentError::validation("file is empty"));
        }

        let size = file.bytes.len() as u64;
        if size > self.max_file_size {
            return Err(DocumentError::validation(format!(
                "file size {size} bytes exceeds maximum allowed {} bytes",
                self.max_file_size
            )));
        }

        Ok((owner_id, file))
    }

    /// Upload a file and record it against its owning deal.
    ///
    /// The blob is written first and the row second. When the row insert
    /// fails, the blob is deleted once; the outcome of that delete is carried
    /// in [`DocumentError::MetadataWrite`]. Nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Deal ID or file is missing or empty (`Validation`, no I/O performed)
    /// - The blob write fails (`StorageWrite`, nothing persisted)
    /// - The row insert fails (`MetadataWrite`)
    pub async fn upload(&self, input: UploadInput) -> Result<UploadedDocument, DocumentError> {
        let uploaded_by = input.uploaded_by;
        let (owner_id, file) = self.validate(input)?;

        let storage_key = derive_storage_key(&owner_id, &file.name, timestamp_token());
        let file_size = i64::try_from(file.bytes.len()).unwrap_or(i64::MAX);
        let mime_type = file
            .mime_type
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

        if let Err(source) = self.storage.write(&storage_key, file.bytes).await {
            error!(storage_key = %storage_key, error = %source, "Blob write failed");
            return Err(DocumentError::StorageWrite {
                storage_key,
                source,
            });
        }

        let public_url = self.storage.public_url(&storage_key);

        let create_input = CreateDocumentInput {
            owning_deal_id: owner_id,
            file_name: file.name,
            storage_key: storage_key.clone(),
            file_size,
            mime_type,
            uploaded_by,
        };

        match self.repo.create(create_input).await {
            Ok(document) => {
                info!(
                    document_id = %document.id,
                    storage_key = %document.storage_key,
                    file_size = document.file_size,
                    "Document uploaded"
                );
                Ok(UploadedDocument {
                    document,
                    public_url,
                })
            }
            Err(insert_err) => {
                let compensation = match self.storage.delete(&storage_key).await {
                    Ok(()) => {
                        warn!(
                            storage_key = %storage_key,
                            error = %insert_err,
                            "Document row insert failed, blob rolled back"
                        );
                        Compensation::RolledBack
                    }
                    Err(delete_err) => {
                        error!(
                            storage_key = %storage_key,
                            error = %insert_err,
                            cleanup_error = %delete_err,
                            "Document row insert failed and blob cleanup failed, manual cleanup required"
                        );
                        Compensation::Orphaned {
                            reason: delete_err.to_string(),
                        }
                    }
                };

                Err(DocumentError::MetadataWrite {
                    storage_key,
                    message: insert_err.to_string(),
                    compensation,
                })
            }
        }
    }

    /// Get a document with its public URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not found or the lookup fails.
    pub async fn get(&self, document_id: Uuid) -> Result<UploadedDocument, DocumentError> {
        let document = self
            .repo
            .find_by_id(document_id)
            .await?
            .ok_or(DocumentError::NotFound(document_id))?;

        Ok(self.with_public_url(document))
    }

    /// List a deal's documents with their public URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list_by_deal(&self, deal_id: &str) -> Result<Vec<UploadedDocument>, DocumentError> {
        let documents = self.repo.list_by_deal(deal_id).await?;
        Ok(documents
            .into_iter()
            .map(|d| self.with_public_url(d))
            .collect())
    }

    /// Delete a document.
    ///
    /// The blob is removed first. A failed blob delete is logged and the row
    /// is still deleted; the outcome says which happened. A failed row delete
    /// is returned as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Document not found (no storage mutation)
    /// - Database lookup or deletion fails
    pub async fn delete(&self, document_id: Uuid) -> Result<DeleteOutcome, DocumentError> {
        let document = self
            .repo
            .find_by_id(document_id)
            .await?
            .ok_or(DocumentError::NotFound(document_id))?;

        let outcome = match self.storage.delete(&document.storage_key).await {
            Ok(()) => DeleteOutcome::Removed,
            Err(e) => {
                warn!(
                    document_id = %document_id,
                    storage_key = %document.storage_key,
                    error = %e,
                    "Blob delete failed, removing document row anyway"
                );
                DeleteOutcome::BlobRetained {
                    storage_key: document.storage_key.clone(),
                }
            }
        };

        if !self.repo.delete(document_id).await? {
            return Err(DocumentError::NotFound(document_id));
        }

        info!(document_id = %document_id, outcome = ?outcome, "Document deleted");
        Ok(outcome)
    }

    fn with_public_url(&self, document: Document) -> UploadedDocument {
        let public_url = self.storage.public_url(&document.storage_key);
        UploadedDocument {
            document,
            public_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StorageError, StorageProvider, StorageService};
    use bytes::Bytes;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// In-memory object store that can be told to fail.
    #[derive(Default)]
    struct FakeStore {
        blobs: Mutex<HashMap<String, Bytes>>,
        writes: AtomicUsize,
        deletes: AtomicUsize,
        fail_write: AtomicBool,
        fail_delete: AtomicBool,
    }

    impl FakeStore {
        fn blob(&self, key: &str) -> Option<Bytes> {
            self.blobs.lock().unwrap().get(key).cloned()
        }

        fn blob_count(&self) -> usize {
            self.blobs.lock().unwrap().len()
        }

        fn calls(&self) -> usize {
            self.writes.load(Ordering::SeqCst) + self.deletes.load(Ordering::SeqCst)
        }
    }

    impl ObjectStore for FakeStore {
        async fn write(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail_write.load(Ordering::SeqCst) {
                return Err(StorageError::operation("bucket not found"));
            }
            self.blobs.lock().unwrap().insert(key.to_string(), data);
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), StorageError> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(StorageError::operation("permission denied"));
            }
            self.blobs.lock().unwrap().remove(key);
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            format!("https://cdn.example.com/documents/{key}")
        }
    }

    /// Mock repository for testing.
    #[derive(Default)]
    struct MockDocumentRepository {
        documents: Mutex<HashMap<Uuid, Document>>,
        fail_create: AtomicBool,
        fail_delete: AtomicBool,
    }

    impl MockDocumentRepository {
        fn insert(&self, document: Document) {
            self.documents.lock().unwrap().insert(document.id, document);
        }

        fn contains(&self, id: Uuid) -> bool {
            self.documents.lock().unwrap().contains_key(&id)
        }
    }

    impl DocumentRepository for MockDocumentRepository {
        async fn create(&self, input: CreateDocumentInput) -> Result<Document, DocumentError> {
            if self.fail_create.load(Ordering::SeqCst) {
                return Err(DocumentError::repository(
                    "insert or update on table \"documents\" violates foreign key constraint",
                ));
            }
            let document = Document {
                id: Uuid::new_v4(),
                owning_deal_id: input.owning_deal_id,
                file_name: input.file_name,
                storage_key: input.storage_key,
                file_size: input.file_size,
                mime_type: input.mime_type,
                uploaded_by: input.uploaded_by,
                created_at: chrono::Utc::now(),
            };
            self.insert(document.clone());
            Ok(document)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>, DocumentError> {
            Ok(self.documents.lock().unwrap().get(&id).cloned())
        }

        async fn list_by_deal(&self, deal_id: &str) -> Result<Vec<Document>, DocumentError> {
            Ok(self
                .documents
                .lock()
                .unwrap()
                .values()
                .filter(|d| d.owning_deal_id == deal_id)
                .cloned()
                .collect())
        }

        async fn delete(&self, id: Uuid) -> Result<bool, DocumentError> {
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(DocumentError::repository("connection reset"));
            }
            Ok(self.documents.lock().unwrap().remove(&id).is_some())
        }
    }

    fn setup() -> (
        Arc<FakeStore>,
        Arc<MockDocumentRepository>,
        DocumentService<FakeStore, MockDocumentRepository>,
    ) {
        let store = Arc::new(FakeStore::default());
        let repo = Arc::new(MockDocumentRepository::default());
        let service = DocumentService::new(store.clone(), repo.clone());
        (store, repo, service)
    }

    fn pdf_input(owner: &str, len: usize) -> UploadInput {
        UploadInput {
            owner_id: Some(owner.to_string()),
            file: Some(UploadFile {
                name: "contract.pdf".to_string(),
                bytes: Bytes::from(vec![7u8; len]),
                mime_type: Some("application/pdf".to_string()),
            }),
            uploaded_by: None,
        }
    }

    fn is_pdf_key_for(key: &str, owner: &str) -> bool {
        key.strip_prefix(&format!("{owner}/"))
            .and_then(|rest| rest.strip_suffix(".pdf"))
            .is_some_and(|ts| !ts.is_empty() && ts.chars().all(|c| c.is_ascii_digit()))
    }

    #[tokio::test]
    async fn test_upload_contract_scenario() {
        let (store, _repo, service) = setup();

        let uploaded = service
            .upload(pdf_input("deal-42", 1024))
            .await
            .expect("upload should succeed");

        let doc = &uploaded.document;
        assert_eq!(doc.file_name, "contract.pdf");
        assert_eq!(doc.file_size, 1024);
        assert_eq!(doc.mime_type, "application/pdf");
        assert_eq!(doc.owning_deal_id, "deal-42");
        assert!(is_pdf_key_for(&doc.storage_key, "deal-42"), "{}", doc.storage_key);
        assert!(!uploaded.public_url.is_empty());
        assert!(uploaded.public_url.ends_with(&doc.storage_key));

        let blob = store.blob(&doc.storage_key).expect("blob stored");
        assert_eq!(blob.len(), 1024);
    }

    #[tokio::test]
    async fn test_upload_defaults_mime_type() {
        let (_store, _repo, service) = setup();
        let mut input = pdf_input("deal-1", 10);
        if let Some(file) = input.file.as_mut() {
            file.mime_type = None;
        }

        let uploaded = service.upload(input).await.unwrap();
        assert_eq!(uploaded.document.mime_type, DEFAULT_MIME_TYPE);
    }

    #[tokio::test]
    async fn test_upload_without_extension_is_accepted() {
        let (store, _repo, service) = setup();
        let mut input = pdf_input("deal-1", 10);
        if let Some(file) = input.file.as_mut() {
            file.name = "README".to_string();
        }

        let uploaded = service.upload(input).await.unwrap();
        let key = &uploaded.document.storage_key;
        let ts = key.strip_prefix("deal-1/").expect("owner prefix");
        assert!(ts.chars().all(|c| c.is_ascii_digit()));
        assert!(store.blob(key).is_some());
    }

    #[tokio::test]
    async fn test_upload_missing_owner_is_validation_without_io() {
        let (store, _repo, service) = setup();

        for owner in [None, Some(String::new()), Some("   ".to_string())] {
            let mut input = pdf_input("x", 10);
            input.owner_id = owner;
            let result = service.upload(input).await;
            assert!(matches!(result, Err(DocumentError::Validation(_))));
        }

        assert_eq!(store.calls(), 0);
        assert_eq!(store.blob_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_missing_or_empty_file_is_validation_without_io() {
        let (store, _repo, service) = setup();

        let missing = UploadInput {
            owner_id: Some("deal-1".to_string()),
            file: None,
            uploaded_by: None,
        };
        assert!(matches!(
            service.upload(missing).await,
            Err(DocumentError::Validation(_))
        ));

        let empty = pdf_input("deal-1", 0);
        assert!(matches!(
            service.upload(empty).await,
            Err(DocumentError::Validation(_))
        ));

        let mut nameless = pdf_input("deal-1", 5);
        if let Some(file) = nameless.file.as_mut() {
            file.name = " ".to_string();
        }
        assert!(matches!(
            service.upload(nameless).await,
            Err(DocumentError::Validation(_))
        ));

        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_upload_owner_with_slash_rejected() {
        let (store, _repo, service) = setup();
        let result = service.upload(pdf_input("deal/../other", 10)).await;
        assert!(matches!(result, Err(DocumentError::Validation(_))));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_upload_too_large_rejected_before_io() {
        let store = Arc::new(FakeStore::default());
        let repo = Arc::new(MockDocumentRepository::default());
        let service = DocumentService::new(store.clone(), repo).with_max_file_size(512);

        let result = service.upload(pdf_input("deal-1", 513)).await;
        assert!(matches!(result, Err(DocumentError::Validation(ref m)) if m.contains("exceeds")));
        assert_eq!(store.calls(), 0);

        assert!(service.upload(pdf_input("deal-1", 512)).await.is_ok());
    }

    #[tokio::test]
    async fn test_storage_write_failure_creates_no_row() {
        let (store, repo, service) = setup();
        store.fail_write.store(true, Ordering::SeqCst);

        let result = service.upload(pdf_input("deal-1", 10)).await;

        assert!(matches!(result, Err(DocumentError::StorageWrite { .. })));
        assert!(repo.documents.lock().unwrap().is_empty());
        assert_eq!(store.deletes.load(Ordering::SeqCst), 0);
        assert_eq!(store.blob_count(), 0);
    }

    #[tokio::test]
    async fn test_metadata_failure_rolls_back_blob() {
        let (store, repo, service) = setup();
        repo.fail_create.store(true, Ordering::SeqCst);

        let result = service.upload(pdf_input("deal-1", 64)).await;

        match result {
            Err(DocumentError::MetadataWrite {
                storage_key,
                message,
                compensation,
            }) => {
                assert_eq!(compensation, Compensation::RolledBack);
                assert!(message.contains("foreign key"));
                assert!(store.blob(&storage_key).is_none());
            }
            other => panic!("expected MetadataWrite, got {other:?}"),
        }
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert_eq!(store.deletes.load(Ordering::SeqCst), 1);
        assert_eq!(store.blob_count(), 0);
    }

    #[tokio::test]
    async fn test_metadata_failure_with_failed_cleanup_reports_orphan() {
        let (store, repo, service) = setup();
        repo.fail_create.store(true, Ordering::SeqCst);
        store.fail_delete.store(true, Ordering::SeqCst);

        let result = service.upload(pdf_input("deal-1", 64)).await;

        match result {
            Err(DocumentError::MetadataWrite {
                storage_key,
                compensation: Compensation::Orphaned { reason },
                ..
            }) => {
                assert!(reason.contains("permission denied"));
                assert!(store.blob(&storage_key).is_some());
            }
            other => panic!("expected orphaned MetadataWrite, got {other:?}"),
        }
        assert_eq!(store.deletes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_delete_not_found_performs_no_storage_mutation() {
        let (store, _repo, service) = setup();

        let result = service.delete(Uuid::new_v4()).await;

        assert!(matches!(result, Err(DocumentError::NotFound(_))));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_delete_removes_blob_then_row() {
        let (store, repo, service) = setup();
        let uploaded = service.upload(pdf_input("deal-1", 32)).await.unwrap();
        let id = uploaded.document.id;

        let outcome = service.delete(id).await.unwrap();

        assert_eq!(outcome, DeleteOutcome::Removed);
        assert!(!repo.contains(id));
        assert!(store.blob(&uploaded.document.storage_key).is_none());
    }

    #[tokio::test]
    async fn test_delete_with_storage_failure_still_removes_row() {
        let (store, repo, service) = setup();
        let uploaded = service.upload(pdf_input("deal-1", 32)).await.unwrap();
        let id = uploaded.document.id;
        store.fail_delete.store(true, Ordering::SeqCst);

        let outcome = service.delete(id).await.unwrap();

        assert_eq!(
            outcome,
            DeleteOutcome::BlobRetained {
                storage_key: uploaded.document.storage_key.clone()
            }
        );
        assert!(!repo.contains(id));
    }

    #[tokio::test]
    async fn test_delete_row_failure_is_reported() {
        let (_store, repo, service) = setup();
        let uploaded = service.upload(pdf_input("deal-1", 32)).await.unwrap();
        repo.fail_delete.store(true, Ordering::SeqCst);

        let result = service.delete(uploaded.document.id).await;
        assert!(matches!(result, Err(DocumentError::Repository(_))));
    }

    #[tokio::test]
    async fn test_get_and_list_carry_public_url() {
        let (_store, _repo, service) = setup();
        let first = service.upload(pdf_input("deal-7", 8)).await.unwrap();
        service.upload(pdf_input("deal-8", 8)).await.unwrap();

        let fetched = service.get(first.document.id).await.unwrap();
        assert_eq!(fetched.document, first.document);
        assert_eq!(fetched.public_url, first.public_url);

        let listed = service.list_by_deal("deal-7").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].public_url.contains("deal-7/"));

        assert!(matches!(
            service.get(Uuid::new_v4()).await,
            Err(DocumentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_uploads_same_owner_get_distinct_keys() {
        let (store, _repo, service) = setup();
        let service = Arc::new(service);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.upload(pdf_input("deal-9", 4)).await.map(|u| u.document.storage_key)
            }));
        }

        let mut keys = Vec::new();
        for handle in handles {
            keys.push(handle.await.unwrap().unwrap());
        }
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 8);
        assert_eq!(store.blob_count(), 8);
    }

    #[tokio::test]
    async fn test_back_to_back_uploads_keep_their_own_blobs() {
        let (store, _repo, service) = setup();

        let mut ids = Vec::new();
        for _ in 0..200 {
            ids.push(service.upload(pdf_input("deal-1", 8)).await.unwrap().document.id);
        }
        assert_eq!(store.blob_count(), 200);

        // Removing one document leaves every other blob in place.
        service.delete(ids[0]).await.unwrap();
        assert_eq!(store.blob_count(), 199);
        for id in &ids[1..] {
            let doc = service.get(*id).await.unwrap();
            assert!(store.blob(&doc.document.storage_key).is_some());
        }
    }

    #[tokio::test]
    async fn test_upload_with_opendal_memory_store() {
        let storage = Arc::new(
            StorageService::from_config(crate::storage::StorageConfig::new(
                StorageProvider::Memory,
            ))
            .unwrap(),
        );
        let repo = Arc::new(MockDocumentRepository::default());
        let service = DocumentService::new(storage.clone(), repo.clone());

        let uploaded = service.upload(pdf_input("deal-42", 1024)).await.unwrap();
        let blob = storage.read(&uploaded.document.storage_key).await.unwrap();
        assert_eq!(blob.len(), 1024);

        repo.fail_create.store(true, Ordering::SeqCst);
        let Err(DocumentError::MetadataWrite { storage_key, .. }) =
            service.upload(pdf_input("deal-42", 16)).await
        else {
            panic!("expected metadata write failure");
        };
        assert!(!storage.exists(&storage_key).await);
    }
}
