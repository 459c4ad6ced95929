//! Port for persisting student applications.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Application, ApplicationStatus, PrincipalId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by application repository adapters.
    pub enum ApplicationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "application repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "application repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Applications owned by `owner`, newest first.
    async fn list_for_owner(
        &self,
        owner: PrincipalId,
    ) -> Result<Vec<Application>, ApplicationRepositoryError>;

    /// Every application, optionally filtered by status, newest first.
    async fn list_all(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>, ApplicationRepositoryError>;

    async fn find(&self, id: Uuid) -> Result<Option<Application>, ApplicationRepositoryError>;

    async fn insert(&self, application: &Application) -> Result<(), ApplicationRepositoryError>;

    /// Returns `false` when the row is gone.
    async fn update(&self, application: &Application)
    -> Result<bool, ApplicationRepositoryError>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, ApplicationRepositoryError>;

    /// Remove every application owned by `owner`; returns the number removed.
    async fn delete_for_owner(&self, owner: PrincipalId)
    -> Result<u64, ApplicationRepositoryError>;
}
