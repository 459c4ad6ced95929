//! Driving port for contact form triage.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{ContactDraft, ContactMessage, ContactStatus, Error};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactInbox: Send + Sync {
    async fn submit(&self, draft: ContactDraft) -> Result<ContactMessage, Error>;

    async fn list(&self, status: Option<ContactStatus>) -> Result<Vec<ContactMessage>, Error>;

    async fn set_status(&self, id: Uuid, status: ContactStatus) -> Result<ContactMessage, Error>;

    async fn delete(&self, id: Uuid) -> Result<(), Error>;
}
