use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::locked;
use crate::domain::ports::{ContentRepository, ContentRepositoryError};
use crate::domain::{ContentEntry, ContentKind, ProgramKey};

#[derive(Default)]
pub struct InMemoryContentRepository {
    entries: Mutex<HashMap<Uuid, ContentEntry>>,
}

impl InMemoryContentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn program_key(entry: &ContentEntry) -> Option<ProgramKey> {
    (entry.kind == ContentKind::Programs)
        .then(|| ProgramKey::from_attributes(&entry.attributes).ok())
        .flatten()
}

/// Mirrors the partial unique index on program identity.
fn ensure_unique_program(
    entries: &HashMap<Uuid, ContentEntry>,
    candidate: &ContentEntry,
) -> Result<(), ContentRepositoryError> {
    let Some(key) = program_key(candidate) else {
        return Ok(());
    };
    let clash = entries
        .values()
        .filter(|existing| existing.id != candidate.id)
        .any(|existing| program_key(existing).as_ref() == Some(&key));
    if clash {
        return Err(ContentRepositoryError::duplicate(format!(
            "program {} ({}) already exists for university {}",
            key.name, key.level, key.university_id
        )));
    }
    Ok(())
}

#[async_trait]
impl ContentRepository for InMemoryContentRepository {
    async fn list(&self, kind: ContentKind) -> Result<Vec<ContentEntry>, ContentRepositoryError> {
        let mut entries: Vec<ContentEntry> = locked(&self.entries)
            .values()
            .filter(|entry| entry.kind == kind)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    async fn find(
        &self,
        kind: ContentKind,
        id: Uuid,
    ) -> Result<Option<ContentEntry>, ContentRepositoryError> {
        Ok(locked(&self.entries)
            .get(&id)
            .filter(|entry| entry.kind == kind)
            .cloned())
    }

    async fn find_many(
        &self,
        kind: ContentKind,
        ids: &[Uuid],
    ) -> Result<Vec<ContentEntry>, ContentRepositoryError> {
        let entries = locked(&self.entries);
        Ok(ids
            .iter()
            .filter_map(|id| entries.get(id))
            .filter(|entry| entry.kind == kind)
            .cloned()
            .collect())
    }

    async fn find_program(
        &self,
        key: &ProgramKey,
    ) -> Result<Option<ContentEntry>, ContentRepositoryError> {
        Ok(locked(&self.entries)
            .values()
            .find(|entry| program_key(entry).as_ref() == Some(key))
            .cloned())
    }

    async fn insert(&self, entry: &ContentEntry) -> Result<(), ContentRepositoryError> {
        let mut entries = locked(&self.entries);
        if entries.contains_key(&entry.id) {
            return Err(ContentRepositoryError::duplicate(format!(
                "content id {} already exists",
                entry.id
            )));
        }
        ensure_unique_program(&entries, entry)?;
        entries.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn update(&self, entry: &ContentEntry) -> Result<bool, ContentRepositoryError> {
        let mut entries = locked(&self.entries);
        if !entries
            .get(&entry.id)
            .is_some_and(|existing| existing.kind == entry.kind)
        {
            return Ok(false);
        }
        ensure_unique_program(&entries, entry)?;
        entries.insert(entry.id, entry.clone());
        Ok(true)
    }

    async fn delete(&self, kind: ContentKind, id: Uuid) -> Result<bool, ContentRepositoryError> {
        let mut entries = locked(&self.entries);
        if entries.get(&id).is_some_and(|entry| entry.kind == kind) {
            entries.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }
}
