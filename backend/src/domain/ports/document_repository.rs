//! Port for persisting document metadata rows.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Document, PrincipalId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by document repository adapters.
    pub enum DocumentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "document repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "document repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn insert(&self, document: &Document) -> Result<(), DocumentRepositoryError>;

    async fn find(&self, id: Uuid) -> Result<Option<Document>, DocumentRepositoryError>;

    /// Documents owned by `owner`, newest first.
    async fn list_for_owner(
        &self,
        owner: PrincipalId,
    ) -> Result<Vec<Document>, DocumentRepositoryError>;

    /// Documents whose id is in `ids`, optionally restricted to one owner,
    /// in upload order.
    async fn find_many(
        &self,
        ids: &[Uuid],
        owner: Option<PrincipalId>,
    ) -> Result<Vec<Document>, DocumentRepositoryError>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, DocumentRepositoryError>;
}
