//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie carries the signed-in [`Principal`] plus the time it was issued.
//! Nothing is stored server side. Claims older than the session TTL are
//! dropped on read, so a copied cookie stops working once it expires and a
//! role change at the identity provider is picked up within the TTL.

use actix_session::{Session, SessionExt};
use actix_web::dev::{Payload, ServiceRequest};
use actix_web::{FromRequest, HttpRequest};
use chrono::{DateTime, Duration, Utc};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::session_config::SESSION_TTL_HOURS;
use crate::domain::{Error, Principal};

pub(crate) const PRINCIPAL_KEY: &str = "principal";

/// What the session cookie vouches for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    #[serde(flatten)]
    pub principal: Principal,
    pub issued_at: DateTime<Utc>,
}

impl SessionClaims {
    /// Whether the claim was issued within the session TTL of `now`.
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.issued_at) <= Duration::hours(SESSION_TTL_HOURS)
    }
}

fn read_principal(session: &Session) -> Result<Option<Principal>, Error> {
    match session.get::<SessionClaims>(PRINCIPAL_KEY) {
        Ok(Some(claims)) if !claims.is_current(Utc::now()) => {
            warn!(issued_at = %claims.issued_at, "discarding expired session claims");
            session.remove(PRINCIPAL_KEY);
            Ok(None)
        }
        Ok(claims) => Ok(claims.map(|claims| claims.principal)),
        Err(error) => {
            warn!(%error, "discarding unreadable session claims");
            session.remove(PRINCIPAL_KEY);
            Ok(None)
        }
    }
}

/// Principal carried by the request's session, if any. Used by the
/// authorization gate before a handler runs.
pub(crate) fn principal_from_request(req: &ServiceRequest) -> Result<Option<Principal>, Error> {
    read_principal(&req.get_session())
}

/// Newtype wrapper exposing domain-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Replace whatever the cookie held with a fresh claim for `principal`.
    pub fn persist_principal(&self, principal: &Principal) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(
                PRINCIPAL_KEY,
                SessionClaims {
                    principal: principal.clone(),
                    issued_at: Utc::now(),
                },
            )
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    pub fn principal(&self) -> Result<Option<Principal>, Error> {
        read_principal(&self.0)
    }

    /// The signed-in principal, or `401 Unauthorized`.
    pub fn require_principal(&self) -> Result<Principal, Error> {
        self.principal()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Drop the session; the response clears the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
