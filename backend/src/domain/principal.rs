//! Authenticated identities and their roles.
//!
//! A [`Principal`] is what the session cookie vouches for. Roles are read from
//! identity provider metadata and never derived from request input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access level attached to a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Student account with access to its own applications and documents.
    #[default]
    User,
    /// Consultancy staff.
    Admin,
    /// Staff allowed to manage other administrators.
    SuperAdmin,
}

/// Roles permitted on every back-office route.
pub const ADMIN_ROLES: &[Role] = &[Role::Admin, Role::SuperAdmin];

impl Role {
    /// Whether the role grants back-office access.
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }

    /// Stable wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Parse provider metadata, falling back to [`Role::User`] for absent or
    /// unrecognised values.
    ///
    /// # Examples
    /// ```
    /// use abroad::domain::Role;
    ///
    /// assert_eq!(Role::from_metadata(Some("admin")), Role::Admin);
    /// assert_eq!(Role::from_metadata(Some("owner")), Role::User);
    /// assert_eq!(Role::from_metadata(None), Role::User);
    /// ```
    pub fn from_metadata(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "super_admin" | "superadmin" => Ok(Self::SuperAdmin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// Stable principal identifier issued by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(Uuid);

impl PrincipalId {
    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PrincipalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

/// Authenticated identity with its role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    id: PrincipalId,
    email: String,
    display_name: Option<String>,
    role: Role,
}

impl Principal {
    /// Assemble a principal from provider data.
    pub fn new(
        id: PrincipalId,
        email: impl Into<String>,
        display_name: Option<String>,
        role: Role,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            display_name: display_name.filter(|name| !name.trim().is_empty()),
            role,
        }
    }

    pub fn id(&self) -> PrincipalId {
        self.id
    }

    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether this principal may act on rows owned by `owner`.
    pub fn can_access_owned_by(&self, owner: PrincipalId) -> bool {
        self.role.is_admin() || self.id == owner
    }

    /// Copy of the principal with a different role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}
