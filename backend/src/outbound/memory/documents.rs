use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::locked;
use crate::domain::ports::{DocumentRepository, DocumentRepositoryError};
use crate::domain::{Document, PrincipalId};

#[derive(Default)]
pub struct InMemoryDocumentRepository {
    documents: Mutex<HashMap<Uuid, Document>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn insert(&self, document: &Document) -> Result<(), DocumentRepositoryError> {
        let mut documents = locked(&self.documents);
        if documents.contains_key(&document.id) {
            return Err(DocumentRepositoryError::query(format!(
                "document {} already exists",
                document.id
            )));
        }
        documents.insert(document.id, document.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Document>, DocumentRepositoryError> {
        Ok(locked(&self.documents).get(&id).cloned())
    }

    async fn list_for_owner(
        &self,
        owner: PrincipalId,
    ) -> Result<Vec<Document>, DocumentRepositoryError> {
        let mut owned: Vec<Document> = locked(&self.documents)
            .values()
            .filter(|document| document.owner_id == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));
        Ok(owned)
    }

    async fn find_many(
        &self,
        ids: &[Uuid],
        owner: Option<PrincipalId>,
    ) -> Result<Vec<Document>, DocumentRepositoryError> {
        let mut found: Vec<Document> = locked(&self.documents)
            .values()
            .filter(|document| ids.contains(&document.id))
            .filter(|document| owner.is_none_or(|wanted| document.owner_id == wanted))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.uploaded_at.cmp(&b.uploaded_at).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DocumentRepositoryError> {
        Ok(locked(&self.documents).remove(&id).is_some())
    }
}
