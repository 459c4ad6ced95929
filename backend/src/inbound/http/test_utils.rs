//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{HttpResponse, test, web};
use async_trait::async_trait;

use super::session::SessionContext;
use super::session_config::SESSION_COOKIE_NAME;
use super::state::{HttpState, HttpStatePorts};
use crate::domain::ports::{
    LoginService, MockApplicationWorkflow, MockContactInbox, MockContentCatalogue,
    MockDocumentPipeline, MockUserAdministration,
};
use crate::domain::{Error, LoginCredentials, Principal, Registration};

/// Cookie sessions with a fresh key and the `Secure` flag off for plain HTTP
/// test requests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_secure(false)
        .build()
}

struct UnusedLogin;

#[async_trait]
impl LoginService for UnusedLogin {
    async fn authenticate(&self, _credentials: &LoginCredentials) -> Result<Principal, Error> {
        Err(Error::internal("login is not wired in this test"))
    }

    async fn register(
        &self,
        _actor: Option<&Principal>,
        _registration: Registration,
    ) -> Result<Principal, Error> {
        Err(Error::internal("registration is not wired in this test"))
    }
}

/// State whose ports panic (mocks) or fail (login) when called; tests replace
/// the port under test.
pub fn stub_state() -> HttpState {
    HttpState::new(HttpStatePorts {
        login: Arc::new(UnusedLogin),
        users: Arc::new(MockUserAdministration::new()),
        content: Arc::new(MockContentCatalogue::new()),
        applications: Arc::new(MockApplicationWorkflow::new()),
        documents: Arc::new(MockDocumentPipeline::new()),
        contact: Arc::new(MockContactInbox::new()),
    })
}

/// Route that signs in whichever principal the test registered as app data.
pub async fn sign_in_fixture(
    session: SessionContext,
    principal: web::Data<Principal>,
) -> Result<HttpResponse, Error> {
    session.persist_principal(principal.get_ref())?;
    Ok(HttpResponse::Ok().finish())
}

/// Call `uri` and return the session cookie it sets.
pub async fn session_cookie<S>(app: &S, uri: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(app, test::TestRequest::get().uri(uri).to_request()).await;
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .expect("session cookie")
        .into_owned()
}
