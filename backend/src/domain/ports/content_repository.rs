//! Port for persisting content entries of every kind.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{ContentEntry, ContentKind, ProgramKey};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by content repository adapters.
    pub enum ContentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "content repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "content repository query failed: {message}",
        /// A uniqueness constraint rejected the write.
        Duplicate { message: String } => "content entry already exists: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// All entries of `kind`, newest first.
    async fn list(&self, kind: ContentKind) -> Result<Vec<ContentEntry>, ContentRepositoryError>;

    async fn find(
        &self,
        kind: ContentKind,
        id: Uuid,
    ) -> Result<Option<ContentEntry>, ContentRepositoryError>;

    /// Entries of `kind` whose id is in `ids`, in no particular order.
    async fn find_many(
        &self,
        kind: ContentKind,
        ids: &[Uuid],
    ) -> Result<Vec<ContentEntry>, ContentRepositoryError>;

    /// A program whose attributes contain `key`, if one exists.
    async fn find_program(
        &self,
        key: &ProgramKey,
    ) -> Result<Option<ContentEntry>, ContentRepositoryError>;

    async fn insert(&self, entry: &ContentEntry) -> Result<(), ContentRepositoryError>;

    /// Replace attributes and `updated_at`; returns `false` when the row is gone.
    async fn update(&self, entry: &ContentEntry) -> Result<bool, ContentRepositoryError>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, kind: ContentKind, id: Uuid) -> Result<bool, ContentRepositoryError>;
}
