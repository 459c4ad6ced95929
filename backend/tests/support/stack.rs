//! Full in-memory application stack for integration tests.
//!
//! Requests pass through the same middleware as production: tracing, the
//! private cookie session and the authorization gate. Every adapter is the
//! in-memory variant so tests can seed accounts and tamper with storage.

use std::collections::HashMap;
use std::sync::Arc;

use abroad::Trace;
use abroad::domain::ports::{DocumentMetrics, NoOpDocumentMetrics};
use abroad::domain::{
    AccountService, ApplicationService, ContactService, ContentCatalogueService, DocumentService,
    Principal, Registration, Role,
};
use abroad::inbound::http::authorization::{AccessPolicy, Authorize};
use abroad::inbound::http::configure_api;
use abroad::inbound::http::session_config::{SESSION_COOKIE_NAME, SessionSettings};
use abroad::inbound::http::state::{HttpState, HttpStatePorts};
use abroad::outbound::archive::ZipArchiveBuilder;
use abroad::outbound::identity::InMemoryIdentityProvider;
use abroad::outbound::memory::{
    InMemoryApplicationRepository, InMemoryContactRepository, InMemoryContentRepository,
    InMemoryDocumentRepository,
};
use abroad::outbound::storage::InMemoryObjectStorage;
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use mockable::DefaultClock;
use serde_json::Value;

pub const PASSWORD: &str = "secret1";
pub const MULTIPART_BOUNDARY: &str = "abroad-integration-boundary";

/// Adapters and session key shared by every request in one test.
pub struct Stack {
    pub identity: Arc<InMemoryIdentityProvider>,
    pub storage: Arc<InMemoryObjectStorage>,
    state: web::Data<HttpState>,
    session: SessionSettings,
}

/// Status, headers and body captured from one response.
pub struct Captured {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub session: Option<Cookie<'static>>,
}

impl Captured {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }
}

impl Stack {
    pub fn new() -> Self {
        let identity = Arc::new(InMemoryIdentityProvider::new());
        let storage = Arc::new(InMemoryObjectStorage::new());
        let clock = Arc::new(DefaultClock);
        let metrics: Arc<dyn DocumentMetrics> = Arc::new(NoOpDocumentMetrics);
        let documents = Arc::new(DocumentService::new(
            Arc::new(InMemoryDocumentRepository::new()),
            storage.clone(),
            Arc::new(ZipArchiveBuilder),
            metrics,
            clock.clone(),
        ));
        let applications = Arc::new(ApplicationService::new(
            Arc::new(InMemoryApplicationRepository::new()),
            clock.clone(),
        ));
        let accounts = Arc::new(AccountService::new(
            identity.clone(),
            documents.clone(),
            applications.clone(),
        ));
        let state = HttpState::new(HttpStatePorts {
            login: accounts.clone(),
            users: accounts,
            content: Arc::new(ContentCatalogueService::new(
                Arc::new(InMemoryContentRepository::new()),
                clock.clone(),
            )),
            applications,
            documents,
            contact: Arc::new(ContactService::new(
                Arc::new(InMemoryContactRepository::new()),
                clock,
            )),
        });
        Self {
            identity,
            storage,
            state: web::Data::new(state),
            session: SessionSettings {
                key: Key::generate(),
                cookie_secure: false,
                same_site: SameSite::Lax,
            },
        }
    }

    /// Create an account directly at the identity provider.
    pub fn seed(&self, email: &str, role: Role) -> Principal {
        let registration =
            Registration::try_new(email, PASSWORD, None, role).expect("valid registration");
        self.identity.seed(&registration).expect("seed account")
    }

    /// Run one request through a freshly initialised app.
    pub async fn send(&self, request: TestRequest) -> Captured {
        let app = test::init_service(
            App::new()
                .app_data(self.state.clone())
                .service(web::scope("/api").configure(configure_api))
                .wrap(Authorize::new(AccessPolicy::standard()))
                .wrap(self.session.middleware())
                .wrap(Trace),
        )
        .await;
        let response = test::call_service(&app, request.to_request()).await;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_owned(), v.to_owned()))
            })
            .collect();
        let session = response
            .response()
            .cookies()
            .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
            .map(Cookie::into_owned);
        let body = test::read_body(response).await.to_vec();
        Captured {
            status,
            headers,
            body,
            session,
        }
    }

    /// Sign in with the shared test password and return the session cookie.
    pub async fn sign_in(&self, email: &str) -> Cookie<'static> {
        let response = self
            .send(TestRequest::post().uri("/api/auth/login").set_json(
                serde_json::json!({ "email": email, "password": PASSWORD }),
            ))
            .await;
        assert_eq!(response.status, 200, "sign-in for {email} failed");
        response.session.expect("login sets the session cookie")
    }
}

/// Build a `multipart/form-data` request carrying one `file` part.
pub fn upload_request(file_name: &str, bytes: &[u8]) -> TestRequest {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    TestRequest::post()
        .uri("/api/documents/upload")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        ))
        .set_payload(body)
}
