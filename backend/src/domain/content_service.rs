//! Content catalogue service.
//!
//! Implements the CRUD driving port shared by every content kind. Programs
//! get two extras: reads embed the owning university and writes reject a
//! second program with the same `(university_id, name, level)`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ports::{ContentCatalogue, ContentRepository, ContentRepositoryError};
use crate::domain::{
    ContentDraft, ContentEntry, ContentKind, ContentPatch, ContentValidationError, ContentView,
    Error, ProgramKey,
};

fn map_repository_error(error: ContentRepositoryError) -> Error {
    match error {
        ContentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("content repository unavailable: {message}"))
        }
        ContentRepositoryError::Query { message } => {
            Error::internal(format!("content repository error: {message}"))
        }
        ContentRepositoryError::Duplicate { .. } => {
            Error::conflict("a program with this name and level already exists for the university")
        }
    }
}

/// Map a body validation failure into the API error shape.
pub fn content_validation_error(error: ContentValidationError) -> Error {
    let field = match &error {
        ContentValidationError::NotAnObject => None,
        ContentValidationError::MissingField { field }
        | ContentValidationError::InvalidField { field, .. } => Some(*field),
    };
    let base = Error::invalid_request(error.to_string());
    match field {
        Some(field) => base.with_details(serde_json::json!({ "field": field })),
        None => base,
    }
}

fn not_found(kind: ContentKind, id: Uuid) -> Error {
    Error::not_found(format!("{kind} entry {id} not found"))
}

fn duplicate_program(key: &ProgramKey) -> Error {
    Error::conflict("a program with this name and level already exists for the university")
        .with_details(serde_json::json!({
            "universityId": key.university_id,
            "name": key.name,
            "level": key.level,
        }))
}

/// Content service backed by a [`ContentRepository`].
#[derive(Clone)]
pub struct ContentCatalogueService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ContentCatalogueService<R> {
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

impl<R> ContentCatalogueService<R>
where
    R: ContentRepository,
{
    /// Wrap entries in views, embedding universities for programs.
    async fn into_views(&self, entries: Vec<ContentEntry>) -> Result<Vec<ContentView>, Error> {
        let mut university_ids: Vec<Uuid> = entries
            .iter()
            .filter_map(ContentEntry::university_id)
            .collect();
        university_ids.sort_unstable();
        university_ids.dedup();

        let universities: HashMap<Uuid, ContentEntry> = if university_ids.is_empty() {
            HashMap::new()
        } else {
            self.repo
                .find_many(ContentKind::Universities, &university_ids)
                .await
                .map_err(map_repository_error)?
                .into_iter()
                .map(|entry| (entry.id, entry))
                .collect()
        };

        Ok(entries
            .into_iter()
            .map(|entry| {
                let university = entry
                    .university_id()
                    .and_then(|id| universities.get(&id).cloned());
                ContentView { entry, university }
            })
            .collect())
    }

    async fn into_view(&self, entry: ContentEntry) -> Result<ContentView, Error> {
        let mut views = self.into_views(vec![entry.clone()]).await?;
        Ok(views.pop().unwrap_or(ContentView {
            entry,
            university: None,
        }))
    }

    /// Fail when another program already owns `key`.
    async fn ensure_program_is_unique(
        &self,
        key: &ProgramKey,
        except: Option<Uuid>,
    ) -> Result<(), Error> {
        let existing = self
            .repo
            .find_program(key)
            .await
            .map_err(map_repository_error)?;
        match existing {
            Some(entry) if Some(entry.id) != except => Err(duplicate_program(key)),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<R> ContentCatalogue for ContentCatalogueService<R>
where
    R: ContentRepository,
{
    async fn list(&self, kind: ContentKind) -> Result<Vec<ContentView>, Error> {
        let entries = self.repo.list(kind).await.map_err(map_repository_error)?;
        self.into_views(entries).await
    }

    async fn get(&self, kind: ContentKind, id: Uuid) -> Result<ContentView, Error> {
        let entry = self
            .repo
            .find(kind, id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| not_found(kind, id))?;
        self.into_view(entry).await
    }

    async fn create(&self, draft: ContentDraft) -> Result<ContentView, Error> {
        if let Some(key) = draft.program_key() {
            self.ensure_program_is_unique(&key, None).await?;
        }

        let now = self.clock.utc();
        let entry = ContentEntry {
            id: Uuid::new_v4(),
            kind: draft.kind(),
            attributes: draft.attributes().clone(),
            created_at: now,
            updated_at: now,
        };
        self.repo
            .insert(&entry)
            .await
            .map_err(map_repository_error)?;
        self.into_view(entry).await
    }

    async fn update(
        &self,
        kind: ContentKind,
        id: Uuid,
        patch: ContentPatch,
    ) -> Result<ContentView, Error> {
        let mut entry = self
            .repo
            .find(kind, id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| not_found(kind, id))?;

        let merged = patch.apply(&entry.attributes);
        let revalidated =
            ContentDraft::try_new(kind, Value::Object(merged)).map_err(content_validation_error)?;
        if let Some(key) = revalidated.program_key() {
            self.ensure_program_is_unique(&key, Some(id)).await?;
        }

        entry.attributes = revalidated.attributes().clone();
        entry.updated_at = self.clock.utc();
        let updated = self
            .repo
            .update(&entry)
            .await
            .map_err(map_repository_error)?;
        if !updated {
            return Err(not_found(kind, id));
        }
        self.into_view(entry).await
    }

    async fn delete(&self, kind: ContentKind, id: Uuid) -> Result<(), Error> {
        let deleted = self
            .repo
            .delete(kind, id)
            .await
            .map_err(map_repository_error)?;
        if deleted {
            Ok(())
        } else {
            Err(not_found(kind, id))
        }
    }
}

#[cfg(test)]
#[path = "content_service_tests.rs"]
mod tests;
