//! Port for the external identity provider that owns user accounts.
//!
//! Accounts (credentials, role metadata, full name) live in the provider's
//! own store; the relational tables only reference principal ids.

use async_trait::async_trait;

use crate::domain::{LoginCredentials, Principal, PrincipalId, Registration, Role};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// The email/password pair was rejected.
        InvalidCredentials => "invalid credentials",
        /// An account already exists for the email address.
        AlreadyRegistered { email: String } => "account already registered: {email}",
        /// No account exists for the identifier.
        UnknownUser { id: String } => "unknown user: {id}",
        /// The provider refused the request for another reason.
        Rejected { message: String } => "identity provider rejected request: {message}",
        /// The provider could not be reached or timed out.
        Transport { message: String } => "identity provider unreachable: {message}",
        /// The provider answered with a payload we could not read.
        Decode { message: String } => "identity provider response invalid: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify credentials and return the account they belong to.
    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Principal, IdentityProviderError>;

    /// Create an account with the registration's role and full name.
    async fn create_user(
        &self,
        registration: &Registration,
    ) -> Result<Principal, IdentityProviderError>;

    /// Fetch one account.
    async fn find_user(&self, id: PrincipalId)
    -> Result<Option<Principal>, IdentityProviderError>;

    /// List every account.
    async fn list_users(&self) -> Result<Vec<Principal>, IdentityProviderError>;

    /// Replace the role stored in the account metadata.
    async fn update_role(
        &self,
        id: PrincipalId,
        role: Role,
    ) -> Result<Principal, IdentityProviderError>;

    /// Remove the account.
    async fn delete_user(&self, id: PrincipalId) -> Result<(), IdentityProviderError>;
}
