//! Driving port for the informational content CRUD family.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{ContentDraft, ContentKind, ContentPatch, ContentView, Error};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentCatalogue: Send + Sync {
    async fn list(&self, kind: ContentKind) -> Result<Vec<ContentView>, Error>;

    async fn get(&self, kind: ContentKind, id: Uuid) -> Result<ContentView, Error>;

    /// Create an entry; programs fail with `Conflict` when their
    /// `(university_id, name, level)` already exists.
    async fn create(&self, draft: ContentDraft) -> Result<ContentView, Error>;

    async fn update(
        &self,
        kind: ContentKind,
        id: Uuid,
        patch: ContentPatch,
    ) -> Result<ContentView, Error>;

    async fn delete(&self, kind: ContentKind, id: Uuid) -> Result<(), Error>;
}
