//! Role-based access decisions.
//!
//! Routes declare a [`RequiredAccess`]; the inbound gate evaluates it against
//! the session principal once per request. Ownership of individual rows is a
//! separate concern handled by the services.

use super::{Error, Principal, Role};

/// Access a route requires before its handler may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredAccess {
    /// Anyone, with or without a session.
    Public,
    /// Any authenticated principal.
    Authenticated,
    /// An authenticated principal holding one of the listed roles.
    Roles(&'static [Role]),
}

impl RequiredAccess {
    /// Evaluate the requirement.
    ///
    /// Returns `Unauthorized` when a principal is needed but missing, and
    /// `Forbidden` when the principal's role is not in the allowed set.
    ///
    /// # Examples
    /// ```
    /// use abroad::domain::{ADMIN_ROLES, ErrorCode, Principal, PrincipalId, RequiredAccess, Role};
    ///
    /// let student = Principal::new(PrincipalId::random(), "a@x.com", None, Role::User);
    /// let err = RequiredAccess::Roles(ADMIN_ROLES)
    ///     .authorize(Some(&student))
    ///     .expect_err("students are not staff");
    /// assert_eq!(err.code(), ErrorCode::Forbidden);
    /// ```
    pub fn authorize(self, principal: Option<&Principal>) -> Result<(), Error> {
        match (self, principal) {
            (Self::Public, _) => Ok(()),
            (_, None) => Err(Error::unauthorized("login required")),
            (Self::Authenticated, Some(_)) => Ok(()),
            (Self::Roles(allowed), Some(principal)) => {
                if allowed.contains(&principal.role()) {
                    Ok(())
                } else {
                    Err(Error::forbidden("insufficient role for this operation"))
                }
            }
        }
    }
}
