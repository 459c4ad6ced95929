//! Credential and registration primitives.
//!
//! Handlers convert raw JSON into these types before talking to a port, so
//! the identity provider only ever sees validated input.

use std::fmt;

use zeroize::Zeroizing;

use super::Role;

/// Minimum accepted password length at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Validation failures for login and registration payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Email does not look like an address.
    MalformedEmail,
    /// Password was blank.
    EmptyPassword,
    /// Password is shorter than [`MIN_PASSWORD_LEN`].
    PasswordTooShort,
}

impl CredentialValidationError {
    /// Field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyEmail | Self::MalformedEmail => "email",
            Self::EmptyPassword | Self::PasswordTooShort => "password",
        }
    }

    /// Machine-readable detail code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyEmail => "empty_email",
            Self::MalformedEmail => "malformed_email",
            Self::EmptyPassword => "empty_password",
            Self::PasswordTooShort => "password_too_short",
        }
    }
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::MalformedEmail => write!(f, "email must be a valid address"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort => {
                write!(f, "password must be at least {MIN_PASSWORD_LEN} characters")
            }
        }
    }
}

impl std::error::Error for CredentialValidationError {}

fn normalise_email(raw: &str) -> Result<String, CredentialValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CredentialValidationError::EmptyEmail);
    }
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            Ok(trimmed.to_ascii_lowercase())
        }
        _ => Err(CredentialValidationError::MalformedEmail),
    }
}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is trimmed, lower-cased and contains a non-empty local part and
///   domain around `@`.
/// - `password` is non-empty; whitespace is preserved.
///
/// # Examples
/// ```
/// use abroad::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" A@X.com ", "secret1").expect("valid");
/// assert_eq!(creds.email(), "a@x.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialValidationError> {
        let email = normalise_email(email)?;
        if password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated request to create an account at the identity provider.
///
/// The requested role is not trusted here; `AccountService` decides the
/// effective role from the caller's own role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    credentials: LoginCredentials,
    full_name: Option<String>,
    role: Role,
}

impl Registration {
    /// Validate registration input.
    pub fn try_new(
        email: &str,
        password: &str,
        full_name: Option<&str>,
        role: Role,
    ) -> Result<Self, CredentialValidationError> {
        let credentials = LoginCredentials::try_from_parts(email, password)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(CredentialValidationError::PasswordTooShort);
        }
        Ok(Self {
            credentials,
            full_name: full_name
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned),
            role,
        })
    }

    pub fn email(&self) -> &str {
        self.credentials.email()
    }

    pub fn password(&self) -> &str {
        self.credentials.password()
    }

    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Replace the role after the caller's privileges have been checked.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}
