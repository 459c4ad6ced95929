//! Contact form intake and triage.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{ContactInbox, ContactRepository, ContactRepositoryError};
use crate::domain::{ContactDraft, ContactMessage, ContactStatus, Error};

fn map_repository_error(error: ContactRepositoryError) -> Error {
    match error {
        ContactRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("contact repository unavailable: {message}"))
        }
        ContactRepositoryError::Query { message } => {
            Error::internal(format!("contact repository error: {message}"))
        }
    }
}

fn not_found(id: Uuid) -> Error {
    Error::not_found(format!("contact message {id} not found"))
}

#[derive(Clone)]
pub struct ContactService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ContactService<R> {
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

#[async_trait]
impl<R> ContactInbox for ContactService<R>
where
    R: ContactRepository,
{
    async fn submit(&self, draft: ContactDraft) -> Result<ContactMessage, Error> {
        let message = ContactMessage::received(draft, self.clock.utc());
        self.repo
            .insert(&message)
            .await
            .map_err(map_repository_error)?;
        Ok(message)
    }

    async fn list(&self, status: Option<ContactStatus>) -> Result<Vec<ContactMessage>, Error> {
        self.repo.list(status).await.map_err(map_repository_error)
    }

    async fn set_status(&self, id: Uuid, status: ContactStatus) -> Result<ContactMessage, Error> {
        self.repo
            .update_status(id, status, self.clock.utc())
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| not_found(id))
    }

    async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(map_repository_error)?;
        if deleted { Ok(()) } else { Err(not_found(id)) }
    }
}
