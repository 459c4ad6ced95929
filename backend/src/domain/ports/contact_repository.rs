//! Port for persisting contact form messages.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{ContactMessage, ContactStatus};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by contact repository adapters.
    pub enum ContactRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "contact repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "contact repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn insert(&self, message: &ContactMessage) -> Result<(), ContactRepositoryError>;

    /// Messages, optionally filtered by status, newest first.
    async fn list(
        &self,
        status: Option<ContactStatus>,
    ) -> Result<Vec<ContactMessage>, ContactRepositoryError>;

    /// Set the status; returns the updated row or `None` when it is gone.
    async fn update_status(
        &self,
        id: Uuid,
        status: ContactStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<ContactMessage>, ContactRepositoryError>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, ContactRepositoryError>;
}
