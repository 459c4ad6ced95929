//! Student application service.
//!
//! Owners manage their own applications; staff may read and review every
//! application. A principal that may not see a row gets `NotFound` so the
//! existence of other students' applications is never revealed.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{ApplicationRepository, ApplicationRepositoryError, ApplicationWorkflow};
use crate::domain::{
    Application, ApplicationDraft, ApplicationPatch, ApplicationStatus, Error, Principal,
    PrincipalId,
};

fn map_repository_error(error: ApplicationRepositoryError) -> Error {
    match error {
        ApplicationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("application repository unavailable: {message}"))
        }
        ApplicationRepositoryError::Query { message } => {
            Error::internal(format!("application repository error: {message}"))
        }
    }
}

fn not_found(id: Uuid) -> Error {
    Error::not_found(format!("application {id} not found"))
}

/// Application service backed by an [`ApplicationRepository`].
#[derive(Clone)]
pub struct ApplicationService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ApplicationService<R> {
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

impl<R> ApplicationService<R>
where
    R: ApplicationRepository,
{
    async fn visible(&self, principal: &Principal, id: Uuid) -> Result<Application, Error> {
        self.repo
            .find(id)
            .await
            .map_err(map_repository_error)?
            .filter(|application| principal.can_access_owned_by(application.owner_id))
            .ok_or_else(|| not_found(id))
    }
}

#[async_trait]
impl<R> ApplicationWorkflow for ApplicationService<R>
where
    R: ApplicationRepository,
{
    async fn list_own(&self, principal: &Principal) -> Result<Vec<Application>, Error> {
        self.repo
            .list_for_owner(principal.id())
            .await
            .map_err(map_repository_error)
    }

    async fn list_all(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>, Error> {
        self.repo
            .list_all(status)
            .await
            .map_err(map_repository_error)
    }

    async fn create(
        &self,
        principal: &Principal,
        draft: ApplicationDraft,
    ) -> Result<Application, Error> {
        let application = Application::draft(principal.id(), draft, self.clock.utc());
        self.repo
            .insert(&application)
            .await
            .map_err(map_repository_error)?;
        Ok(application)
    }

    async fn get(&self, principal: &Principal, id: Uuid) -> Result<Application, Error> {
        self.visible(principal, id).await
    }

    async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: ApplicationPatch,
    ) -> Result<Application, Error> {
        let patch = patch
            .normalised()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let mut application = self.visible(principal, id).await?;
        if patch.changes_status() && !principal.role().is_admin() {
            return Err(Error::forbidden(
                "only staff may change an application's status",
            ));
        }

        let previous = application.status;
        application.apply(patch, self.clock.utc());
        let updated = self
            .repo
            .update(&application)
            .await
            .map_err(map_repository_error)?;
        if !updated {
            return Err(not_found(id));
        }
        if previous != application.status {
            info!(
                application_id = %id,
                reviewer = %principal.id(),
                from = previous.as_str(),
                to = application.status.as_str(),
                "application status changed"
            );
        }
        Ok(application)
    }

    async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), Error> {
        self.visible(principal, id).await?;
        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(map_repository_error)?;
        if deleted { Ok(()) } else { Err(not_found(id)) }
    }

    async fn purge_owner(&self, owner: PrincipalId) -> Result<u64, Error> {
        self.repo
            .delete_for_owner(owner)
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "application_service_tests.rs"]
mod tests;
