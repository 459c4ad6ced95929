//! Driving ports for authentication and account administration.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Principal, PrincipalId, Registration, Role};

/// Authenticate and register principals.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Verify credentials and return the principal to store in the session.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Principal, Error>;

    /// Create an account.
    ///
    /// `actor` is the signed-in principal, if any. It bounds the role the new
    /// account may receive: anonymous callers and students always create
    /// `user` accounts.
    async fn register(
        &self,
        actor: Option<&Principal>,
        registration: Registration,
    ) -> Result<Principal, Error>;
}

/// Back-office management of principals.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAdministration: Send + Sync {
    async fn list_users(&self) -> Result<Vec<Principal>, Error>;

    async fn change_role(
        &self,
        actor: &Principal,
        target: PrincipalId,
        role: Role,
    ) -> Result<Principal, Error>;

    /// Delete the account and everything it owns.
    async fn delete_user(&self, actor: &Principal, target: PrincipalId) -> Result<(), Error>;
}
