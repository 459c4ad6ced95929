//! Account service: sign-in, registration and user administration.
//!
//! Accounts live at the identity provider. Deleting one cascades to the
//! documents and applications the account owns before the provider record
//! is removed, so a failure part-way leaves the account in place and the
//! operation can be repeated.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    ApplicationWorkflow, DocumentPipeline, IdentityProvider, IdentityProviderError, LoginService,
    UserAdministration,
};
use crate::domain::{Error, LoginCredentials, Principal, PrincipalId, Registration, Role};

fn map_identity_error(error: IdentityProviderError) -> Error {
    match error {
        IdentityProviderError::InvalidCredentials => Error::unauthorized("invalid credentials"),
        IdentityProviderError::AlreadyRegistered { .. } => {
            Error::conflict("an account already exists for this email address")
        }
        IdentityProviderError::UnknownUser { id } => Error::not_found(format!("user {id} not found")),
        other @ (IdentityProviderError::Rejected { .. }
        | IdentityProviderError::Transport { .. }
        | IdentityProviderError::Decode { .. }) => {
            Error::upstream(format!("identity provider failed: {other}"))
        }
    }
}

/// Role the new account actually receives given who is asking.
fn effective_role(actor: Option<&Principal>, requested: Role) -> Result<Role, Error> {
    match actor.map(Principal::role) {
        None | Some(Role::User) => Ok(Role::User),
        Some(Role::Admin) if requested == Role::SuperAdmin => Err(Error::forbidden(
            "only super admins may create super admin accounts",
        )),
        Some(Role::Admin | Role::SuperAdmin) => Ok(requested),
    }
}

/// Account service over an [`IdentityProvider`].
#[derive(Clone)]
pub struct AccountService<P> {
    provider: Arc<P>,
    documents: Arc<dyn DocumentPipeline>,
    applications: Arc<dyn ApplicationWorkflow>,
}

impl<P> AccountService<P> {
    pub fn new(
        provider: Arc<P>,
        documents: Arc<dyn DocumentPipeline>,
        applications: Arc<dyn ApplicationWorkflow>,
    ) -> Self {
        Self {
            provider,
            documents,
            applications,
        }
    }
}

impl<P> AccountService<P>
where
    P: IdentityProvider,
{
    async fn existing(&self, id: PrincipalId) -> Result<Principal, Error> {
        self.provider
            .find_user(id)
            .await
            .map_err(map_identity_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }
}

#[async_trait]
impl<P> LoginService for AccountService<P>
where
    P: IdentityProvider,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Principal, Error> {
        let principal = self
            .provider
            .sign_in(credentials)
            .await
            .map_err(map_identity_error)?;
        info!(principal_id = %principal.id(), role = %principal.role(), "principal signed in");
        Ok(principal)
    }

    async fn register(
        &self,
        actor: Option<&Principal>,
        registration: Registration,
    ) -> Result<Principal, Error> {
        let role = effective_role(actor, registration.role())?;
        let registration = registration.with_role(role);
        let principal = self
            .provider
            .create_user(&registration)
            .await
            .map_err(map_identity_error)?;
        info!(
            principal_id = %principal.id(),
            role = %principal.role(),
            created_by = ?actor.map(Principal::id).map(|id| id.to_string()),
            "account registered"
        );
        Ok(principal)
    }
}

#[async_trait]
impl<P> UserAdministration for AccountService<P>
where
    P: IdentityProvider,
{
    async fn list_users(&self) -> Result<Vec<Principal>, Error> {
        self.provider.list_users().await.map_err(map_identity_error)
    }

    async fn change_role(
        &self,
        actor: &Principal,
        target: PrincipalId,
        role: Role,
    ) -> Result<Principal, Error> {
        if actor.id() == target {
            return Err(Error::forbidden("you cannot change your own role"));
        }
        let current = self.existing(target).await?;
        let touches_super_admin = current.role() == Role::SuperAdmin || role == Role::SuperAdmin;
        if touches_super_admin && actor.role() != Role::SuperAdmin {
            return Err(Error::forbidden(
                "only super admins may grant or revoke the super admin role",
            ));
        }
        let updated = self
            .provider
            .update_role(target, role)
            .await
            .map_err(map_identity_error)?;
        info!(
            principal_id = %target,
            actor_id = %actor.id(),
            from = %current.role(),
            to = %role,
            "role changed"
        );
        Ok(updated)
    }

    async fn delete_user(&self, actor: &Principal, target: PrincipalId) -> Result<(), Error> {
        if actor.id() == target {
            return Err(Error::forbidden("you cannot delete your own account"));
        }
        let current = self.existing(target).await?;
        if current.role() == Role::SuperAdmin && actor.role() != Role::SuperAdmin {
            return Err(Error::forbidden("only super admins may delete super admins"));
        }

        let documents = self.documents.purge_owner(target).await?;
        let applications = self.applications.purge_owner(target).await?;
        self.provider
            .delete_user(target)
            .await
            .map_err(map_identity_error)?;
        info!(
            principal_id = %target,
            actor_id = %actor.id(),
            documents,
            applications,
            "account deleted"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
