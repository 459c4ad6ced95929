//! Driving port for student applications.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Application, ApplicationDraft, ApplicationPatch, ApplicationStatus, Error, Principal,
    PrincipalId,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationWorkflow: Send + Sync {
    /// Applications owned by `principal`.
    async fn list_own(&self, principal: &Principal) -> Result<Vec<Application>, Error>;

    /// Every application, for staff review.
    async fn list_all(&self, status: Option<ApplicationStatus>)
    -> Result<Vec<Application>, Error>;

    async fn create(
        &self,
        principal: &Principal,
        draft: ApplicationDraft,
    ) -> Result<Application, Error>;

    /// Fetch one application; non-owners without staff rights get `NotFound`.
    async fn get(&self, principal: &Principal, id: Uuid) -> Result<Application, Error>;

    /// Apply a patch; status changes require a staff role.
    async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: ApplicationPatch,
    ) -> Result<Application, Error>;

    async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), Error>;

    /// Remove every application owned by `owner`.
    async fn purge_owner(&self, owner: PrincipalId) -> Result<u64, Error>;
}
