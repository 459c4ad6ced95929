use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::locked;
use crate::domain::ports::{ApplicationRepository, ApplicationRepositoryError};
use crate::domain::{Application, ApplicationStatus, PrincipalId};

#[derive(Default)]
pub struct InMemoryApplicationRepository {
    applications: Mutex<HashMap<Uuid, Application>>,
}

impl InMemoryApplicationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect(&self, keep: impl Fn(&Application) -> bool) -> Vec<Application> {
        let mut matches: Vec<Application> = locked(&self.applications)
            .values()
            .filter(|application| keep(application))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        matches
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn list_for_owner(
        &self,
        owner: PrincipalId,
    ) -> Result<Vec<Application>, ApplicationRepositoryError> {
        Ok(self.collect(|application| application.owner_id == owner))
    }

    async fn list_all(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>, ApplicationRepositoryError> {
        Ok(self.collect(|application| status.is_none_or(|wanted| application.status == wanted)))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Application>, ApplicationRepositoryError> {
        Ok(locked(&self.applications).get(&id).cloned())
    }

    async fn insert(&self, application: &Application) -> Result<(), ApplicationRepositoryError> {
        locked(&self.applications).insert(application.id, application.clone());
        Ok(())
    }

    async fn update(
        &self,
        application: &Application,
    ) -> Result<bool, ApplicationRepositoryError> {
        let mut applications = locked(&self.applications);
        match applications.get_mut(&application.id) {
            Some(existing) => {
                *existing = application.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApplicationRepositoryError> {
        Ok(locked(&self.applications).remove(&id).is_some())
    }

    async fn delete_for_owner(
        &self,
        owner: PrincipalId,
    ) -> Result<u64, ApplicationRepositoryError> {
        let mut applications = locked(&self.applications);
        let before = applications.len();
        applications.retain(|_, application| application.owner_id != owner);
        Ok(u64::try_from(before - applications.len()).unwrap_or(u64::MAX))
    }
}
