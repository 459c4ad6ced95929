use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::locked;
use crate::domain::ports::{ContactRepository, ContactRepositoryError};
use crate::domain::{ContactMessage, ContactStatus};

#[derive(Default)]
pub struct InMemoryContactRepository {
    messages: Mutex<HashMap<Uuid, ContactMessage>>,
}

impl InMemoryContactRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn insert(&self, message: &ContactMessage) -> Result<(), ContactRepositoryError> {
        locked(&self.messages).insert(message.id, message.clone());
        Ok(())
    }

    async fn list(
        &self,
        status: Option<ContactStatus>,
    ) -> Result<Vec<ContactMessage>, ContactRepositoryError> {
        let mut messages: Vec<ContactMessage> = locked(&self.messages)
            .values()
            .filter(|message| status.is_none_or(|wanted| message.status == wanted))
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(messages)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ContactStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<ContactMessage>, ContactRepositoryError> {
        Ok(locked(&self.messages).get_mut(&id).map(|message| {
            message.status = status;
            message.updated_at = updated_at;
            message.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ContactRepositoryError> {
        Ok(locked(&self.messages).remove(&id).is_some())
    }
}
