//! Process-local identity provider for development and tests.
//!
//! Passwords are stored as Argon2 PHC strings; nothing survives a restart.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use password_hash::{PasswordHash, SaltString};

use crate::domain::ports::{IdentityProvider, IdentityProviderError};
use crate::domain::{LoginCredentials, Principal, PrincipalId, Registration, Role};

struct Account {
    principal: Principal,
    password_hash: String,
}

#[derive(Default)]
pub struct InMemoryIdentityProvider {
    accounts: Mutex<HashMap<PrincipalId, Account>>,
}

fn hash_password(password: &str) -> Result<String, IdentityProviderError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| IdentityProviderError::rejected(format!("password hashing failed: {err}")))
}

fn verify_password(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn accounts(&self) -> MutexGuard<'_, HashMap<PrincipalId, Account>> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert an account directly, bypassing role policy. Used to bootstrap
    /// the first super administrator.
    ///
    /// # Errors
    ///
    /// Fails when the email is already registered.
    pub fn seed(&self, registration: &Registration) -> Result<Principal, IdentityProviderError> {
        let password_hash = hash_password(registration.password())?;
        let mut accounts = self.accounts();
        let email = registration.email();
        if accounts
            .values()
            .any(|account| account.principal.email() == email)
        {
            return Err(IdentityProviderError::already_registered(email));
        }
        let principal = Principal::new(
            PrincipalId::random(),
            email,
            registration.full_name().map(str::to_owned),
            registration.role(),
        );
        accounts.insert(
            principal.id(),
            Account {
                principal: principal.clone(),
                password_hash,
            },
        );
        Ok(principal)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Principal, IdentityProviderError> {
        self.accounts()
            .values()
            .find(|account| account.principal.email() == credentials.email())
            .filter(|account| verify_password(&account.password_hash, credentials.password()))
            .map(|account| account.principal.clone())
            .ok_or_else(IdentityProviderError::invalid_credentials)
    }

    async fn create_user(
        &self,
        registration: &Registration,
    ) -> Result<Principal, IdentityProviderError> {
        self.seed(registration)
    }

    async fn find_user(
        &self,
        id: PrincipalId,
    ) -> Result<Option<Principal>, IdentityProviderError> {
        Ok(self
            .accounts()
            .get(&id)
            .map(|account| account.principal.clone()))
    }

    async fn list_users(&self) -> Result<Vec<Principal>, IdentityProviderError> {
        let mut users: Vec<Principal> = self
            .accounts()
            .values()
            .map(|account| account.principal.clone())
            .collect();
        users.sort_by(|a, b| a.email().cmp(b.email()));
        Ok(users)
    }

    async fn update_role(
        &self,
        id: PrincipalId,
        role: Role,
    ) -> Result<Principal, IdentityProviderError> {
        let mut accounts = self.accounts();
        let account = accounts
            .get_mut(&id)
            .ok_or_else(|| IdentityProviderError::unknown_user(id.to_string()))?;
        account.principal = account.principal.clone().with_role(role);
        Ok(account.principal.clone())
    }

    async fn delete_user(&self, id: PrincipalId) -> Result<(), IdentityProviderError> {
        self.accounts()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| IdentityProviderError::unknown_user(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn provider() -> InMemoryIdentityProvider {
        InMemoryIdentityProvider::new()
    }

    fn registration(email: &str, password: &str) -> Registration {
        Registration::try_new(email, password, None, Role::User).expect("valid registration")
    }

    #[rstest]
    #[tokio::test]
    async fn sign_in_accepts_registered_password(provider: InMemoryIdentityProvider) {
        let created = provider
            .create_user(&registration("a@x.com", "secret1"))
            .await
            .expect("create");
        let credentials = LoginCredentials::try_from_parts("A@X.com", "secret1").expect("creds");

        let principal = provider.sign_in(&credentials).await.expect("sign in");

        assert_eq!(principal.id(), created.id());
        assert_eq!(principal.role(), Role::User);
    }

    #[rstest]
    #[tokio::test]
    async fn sign_in_rejects_wrong_password(provider: InMemoryIdentityProvider) {
        provider
            .create_user(&registration("a@x.com", "secret1"))
            .await
            .expect("create");
        let credentials = LoginCredentials::try_from_parts("a@x.com", "secret2").expect("creds");

        let error = provider.sign_in(&credentials).await.expect_err("rejected");

        assert_eq!(error, IdentityProviderError::invalid_credentials());
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_email_is_refused(provider: InMemoryIdentityProvider) {
        provider
            .create_user(&registration("a@x.com", "secret1"))
            .await
            .expect("create");

        let error = provider
            .create_user(&registration("a@x.com", "another1"))
            .await
            .expect_err("duplicate");

        assert!(matches!(error, IdentityProviderError::AlreadyRegistered { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn role_updates_and_deletes_require_a_known_user(provider: InMemoryIdentityProvider) {
        let missing = PrincipalId::random();

        assert!(matches!(
            provider.update_role(missing, Role::Admin).await,
            Err(IdentityProviderError::UnknownUser { .. })
        ));
        assert!(matches!(
            provider.delete_user(missing).await,
            Err(IdentityProviderError::UnknownUser { .. })
        ));
    }
}
