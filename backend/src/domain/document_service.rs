//! Document pipeline service.
//!
//! Uploads write the object first and the metadata row second. There is no
//! transaction spanning the two stores: when the row insert fails the object
//! is deleted again, and when that compensating delete also fails the object
//! is logged and counted as orphaned.
//!
//! Batch downloads tolerate partial failure. Requested ids with no matching
//! row and objects that cannot be fetched are skipped and reported through
//! the `skipped` count.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::ports::{
    ArchiveBuilder, ArchiveError, BatchDownload, BatchDownloadRequest, CompensationOutcome,
    DocumentMetrics, DocumentPipeline, DocumentRepository, DocumentRepositoryError,
    ObjectStorage, ObjectStorageError,
};
use crate::domain::{
    ArchiveEntry, Document, DocumentUpload, EntryNamer, Error, Principal, PrincipalId,
    SIGNED_URL_TTL_SECS, SignedUrl, StorageKey, TraceId,
};

fn map_repository_error(error: DocumentRepositoryError) -> Error {
    match error {
        DocumentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("document repository unavailable: {message}"))
        }
        DocumentRepositoryError::Query { message } => {
            Error::internal(format!("document repository error: {message}"))
        }
    }
}

fn map_storage_error(error: ObjectStorageError) -> Error {
    match error {
        ObjectStorageError::NotFound { key } => {
            Error::not_found(format!("stored object {key} not found"))
        }
        other => Error::upstream(format!("object storage failed: {other}")),
    }
}

fn map_archive_error(error: ArchiveError) -> Error {
    Error::internal(error.to_string())
}

fn not_found(id: Uuid) -> Error {
    Error::not_found(format!("document {id} not found"))
}

/// Document pipeline over a metadata repository, an object store and an
/// archive builder.
#[derive(Clone)]
pub struct DocumentService<R, S, A> {
    repo: Arc<R>,
    storage: Arc<S>,
    archive: Arc<A>,
    metrics: Arc<dyn DocumentMetrics>,
    clock: Arc<dyn Clock>,
}

impl<R, S, A> DocumentService<R, S, A> {
    pub fn new(
        repo: Arc<R>,
        storage: Arc<S>,
        archive: Arc<A>,
        metrics: Arc<dyn DocumentMetrics>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            storage,
            archive,
            metrics,
            clock,
        }
    }
}

impl<R, S, A> DocumentService<R, S, A>
where
    R: DocumentRepository,
    S: ObjectStorage,
    A: ArchiveBuilder + 'static,
{
    async fn visible(&self, principal: &Principal, id: Uuid) -> Result<Document, Error> {
        self.repo
            .find(id)
            .await
            .map_err(map_repository_error)?
            .filter(|document| principal.can_access_owned_by(document.owner_id))
            .ok_or_else(|| not_found(id))
    }

    /// Remove an object that has no metadata row.
    async fn compensate(&self, key: &StorageKey) {
        match self.storage.delete(key).await {
            Ok(()) => {
                warn!(storage_path = %key, "removed object after metadata insert failed");
                self.metrics
                    .record_compensation(CompensationOutcome::Removed);
            }
            Err(err) => {
                error!(
                    storage_path = %key,
                    error = %err,
                    "compensating delete failed; object is orphaned"
                );
                self.metrics
                    .record_compensation(CompensationOutcome::Orphaned);
            }
        }
    }

    /// Delete the object then the row; object failures only warn.
    async fn remove(&self, document: &Document) -> Result<bool, Error> {
        if let Err(err) = self.storage.delete(&document.storage_path).await {
            warn!(
                document_id = %document.id,
                storage_path = %document.storage_path,
                error = %err,
                "object delete failed; removing metadata anyway"
            );
        }
        self.repo
            .delete(document.id)
            .await
            .map_err(map_repository_error)
    }

    async fn collect_entries(&self, documents: &[Document]) -> (Vec<ArchiveEntry>, usize) {
        let mut namer = EntryNamer::default();
        let mut entries = Vec::with_capacity(documents.len());
        let mut skipped = 0;
        for document in documents {
            match self.storage.get(&document.storage_path).await {
                Ok(bytes) => entries.push(ArchiveEntry {
                    name: namer.unique(&document.name),
                    bytes,
                }),
                Err(err) => {
                    skipped += 1;
                    warn!(
                        document_id = %document.id,
                        storage_path = %document.storage_path,
                        error = %err,
                        "skipping document in batch download"
                    );
                }
            }
        }
        (entries, skipped)
    }

    async fn bundle(&self, entries: Vec<ArchiveEntry>) -> Result<Vec<u8>, Error> {
        let archive = Arc::clone(&self.archive);
        let trace_id = TraceId::current();
        tokio::task::spawn_blocking(move || {
            TraceId::in_blocking_scope(trace_id, || archive.bundle(entries))
        })
        .await
        .map_err(|err| Error::internal(format!("archive task failed: {err}")))?
        .map_err(map_archive_error)
    }
}

#[async_trait]
impl<R, S, A> DocumentPipeline for DocumentService<R, S, A>
where
    R: DocumentRepository,
    S: ObjectStorage,
    A: ArchiveBuilder + 'static,
{
    async fn upload(&self, owner: &Principal, upload: DocumentUpload) -> Result<Document, Error> {
        let key = StorageKey::for_upload(owner.id(), upload.name());
        let document = Document {
            id: Uuid::new_v4(),
            owner_id: owner.id(),
            name: upload.name().to_owned(),
            content_type: upload.content_type().to_owned(),
            storage_path: key.clone(),
            size_bytes: upload.size_bytes(),
            uploaded_at: self.clock.utc(),
        };

        self.storage
            .put(&key, &document.content_type, upload.into_bytes())
            .await
            .map_err(map_storage_error)?;

        if let Err(err) = self.repo.insert(&document).await {
            self.compensate(&key).await;
            return Err(map_repository_error(err));
        }

        self.metrics.record_upload(document.size_bytes);
        info!(
            document_id = %document.id,
            owner_id = %document.owner_id,
            size_bytes = document.size_bytes,
            "document uploaded"
        );
        Ok(document)
    }

    async fn list_own(&self, principal: &Principal) -> Result<Vec<Document>, Error> {
        self.list_for_owner(principal.id()).await
    }

    async fn list_for_owner(&self, owner: PrincipalId) -> Result<Vec<Document>, Error> {
        self.repo
            .list_for_owner(owner)
            .await
            .map_err(map_repository_error)
    }

    async fn signed_url(&self, principal: &Principal, id: Uuid) -> Result<SignedUrl, Error> {
        let document = self.visible(principal, id).await?;
        self.storage
            .signed_url(&document.storage_path, SIGNED_URL_TTL_SECS)
            .await
            .map_err(map_storage_error)
    }

    async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), Error> {
        let document = self.visible(principal, id).await?;
        if self.remove(&document).await? {
            Ok(())
        } else {
            Err(not_found(id))
        }
    }

    async fn batch_download(&self, request: BatchDownloadRequest) -> Result<BatchDownload, Error> {
        if request.document_ids.is_empty() {
            return Err(Error::invalid_request("documentIds must not be empty"));
        }
        let requested: HashSet<Uuid> = request.document_ids.iter().copied().collect();
        let documents = self
            .repo
            .find_many(&request.document_ids, request.owner)
            .await
            .map_err(map_repository_error)?;

        match (requested.len(), documents.as_slice()) {
            (_, []) => Err(Error::not_found("no matching documents")),
            (1, [only]) => {
                let url = self
                    .storage
                    .signed_url(&only.storage_path, SIGNED_URL_TTL_SECS)
                    .await
                    .map_err(map_storage_error)?;
                Ok(BatchDownload::Single(url))
            }
            (_, found) => {
                let unmatched = requested.len().saturating_sub(found.len());
                let (entries, failed) = self.collect_entries(found).await;
                let skipped = failed + unmatched;
                if skipped > 0 {
                    self.metrics.record_skipped_entries(skipped);
                }
                if entries.is_empty() {
                    return Err(Error::upstream(
                        "none of the requested documents could be downloaded",
                    ));
                }
                let included = entries.len();
                let bytes = self.bundle(entries).await?;
                let file_name = format!(
                    "documents-{}.{}",
                    self.clock.utc().format("%Y%m%d-%H%M%S"),
                    self.archive.extension()
                );
                info!(included, skipped, "batch download assembled");
                Ok(BatchDownload::Archive {
                    file_name,
                    content_type: self.archive.content_type(),
                    bytes,
                    included,
                    skipped,
                })
            }
        }
    }

    async fn purge_owner(&self, owner: PrincipalId) -> Result<u64, Error> {
        let documents = self.list_for_owner(owner).await?;
        let mut removed = 0;
        for document in &documents {
            if self.remove(document).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
#[path = "document_service_tests.rs"]
mod tests;
