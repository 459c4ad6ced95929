//! Driving port for the document upload/download pipeline.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Document, DocumentUpload, Error, Principal, PrincipalId, SignedUrl};

/// Staff request to download several documents at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchDownloadRequest {
    pub document_ids: Vec<Uuid>,
    /// Restrict matches to this owner when present.
    pub owner: Option<PrincipalId>,
}

/// Result of a batch download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchDownload {
    /// Exactly one document matched.
    Single(SignedUrl),
    /// Several documents were packed into one archive.
    Archive {
        file_name: String,
        content_type: &'static str,
        bytes: Vec<u8>,
        included: usize,
        skipped: usize,
    },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentPipeline: Send + Sync {
    /// Store the bytes, then record the metadata row.
    async fn upload(&self, owner: &Principal, upload: DocumentUpload) -> Result<Document, Error>;

    async fn list_own(&self, principal: &Principal) -> Result<Vec<Document>, Error>;

    async fn list_for_owner(&self, owner: PrincipalId) -> Result<Vec<Document>, Error>;

    /// Short-lived read URL for one document.
    async fn signed_url(&self, principal: &Principal, id: Uuid) -> Result<SignedUrl, Error>;

    async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), Error>;

    async fn batch_download(&self, request: BatchDownloadRequest) -> Result<BatchDownload, Error>;

    /// Remove every document (objects and rows) owned by `owner`.
    async fn purge_owner(&self, owner: PrincipalId) -> Result<u64, Error>;
}
