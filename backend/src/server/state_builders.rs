//! Builders for the HTTP state ports.
//!
//! Relational repositories come from the database pool when one is
//! configured and from process memory otherwise. Identity and storage follow
//! the remote provider settings independently of the database choice.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};
use url::Url;

use abroad::domain::ports::{
    ApplicationRepository, ApplicationWorkflow, ContactRepository, ContentRepository,
    DocumentMetrics, DocumentPipeline, DocumentRepository, IdentityProvider, LoginService,
    NoOpDocumentMetrics, UserAdministration,
};
use abroad::domain::{
    AccountService, ApplicationService, ContactService, ContentCatalogueService, DocumentService,
    Registration, Role,
};
use abroad::inbound::http::state::{HttpState, HttpStatePorts};
use abroad::outbound::archive::ZipArchiveBuilder;
use abroad::outbound::identity::{
    HttpIdentityProvider, IdentityProviderConfig, InMemoryIdentityProvider,
};
use abroad::outbound::memory::{
    InMemoryApplicationRepository, InMemoryContactRepository, InMemoryContentRepository,
    InMemoryDocumentRepository,
};
#[cfg(feature = "metrics")]
use abroad::outbound::metrics::PrometheusDocumentMetrics;
use abroad::outbound::persistence::{
    DieselApplicationRepository, DieselContactRepository, DieselContentRepository,
    DieselDocumentRepository,
};
use abroad::outbound::storage::{HttpObjectStorage, InMemoryObjectStorage, ObjectStorageConfig};

use super::ServerConfig;

enum IdentityBackend {
    Remote(Arc<HttpIdentityProvider>),
    Memory(Arc<InMemoryIdentityProvider>),
}

enum StorageBackend {
    Remote(Arc<HttpObjectStorage>),
    Memory(Arc<InMemoryObjectStorage>),
}

struct Repositories<C, A, D, M> {
    content: Arc<C>,
    applications: Arc<A>,
    documents: Arc<D>,
    contact: Arc<M>,
}

struct Shared {
    identity: IdentityBackend,
    storage: StorageBackend,
    metrics: Arc<dyn DocumentMetrics>,
    clock: Arc<dyn Clock>,
}

fn parse_url(raw: &str, what: &str) -> std::io::Result<Url> {
    Url::parse(raw).map_err(|err| std::io::Error::other(format!("invalid {what} URL '{raw}': {err}")))
}

fn build_remote_backends(config: &ServerConfig) -> std::io::Result<Option<(IdentityBackend, StorageBackend)>> {
    let Some(remote) = config.remote_auth.as_ref() else {
        return Ok(None);
    };
    let identity = HttpIdentityProvider::new(IdentityProviderConfig {
        base_url: parse_url(&remote.identity_url, "identity provider")?,
        anon_key: remote.anon_key.clone(),
        service_role_key: remote.service_role_key.clone(),
        timeout: config.outbound_timeout,
    })
    .map_err(|err| std::io::Error::other(format!("identity client: {err}")))?;
    let storage = HttpObjectStorage::new(ObjectStorageConfig {
        base_url: parse_url(&remote.storage_url, "storage")?,
        bucket: config.storage_bucket.clone(),
        service_role_key: remote.service_role_key.clone(),
        timeout: config.outbound_timeout,
    })
    .map_err(|err| std::io::Error::other(format!("storage client: {err}")))?;
    info!(identity = %remote.identity_url, bucket = %config.storage_bucket, "using remote identity and storage");
    Ok(Some((
        IdentityBackend::Remote(Arc::new(identity)),
        StorageBackend::Remote(Arc::new(storage)),
    )))
}

fn build_memory_identity(config: &ServerConfig) -> std::io::Result<Arc<InMemoryIdentityProvider>> {
    let provider = InMemoryIdentityProvider::new();
    if let Some(admin) = config.bootstrap_admin.as_ref() {
        let registration = Registration::try_new(
            &admin.email,
            &admin.password,
            Some("Bootstrap administrator"),
            Role::SuperAdmin,
        )
        .map_err(|err| std::io::Error::other(format!("bootstrap admin: {err}")))?;
        let principal = provider
            .seed(&registration)
            .map_err(|err| std::io::Error::other(format!("bootstrap admin: {err}")))?;
        info!(id = %principal.id(), "seeded bootstrap super administrator");
    }
    Ok(Arc::new(provider))
}

#[cfg(feature = "metrics")]
fn build_document_metrics(config: &ServerConfig) -> std::io::Result<Arc<dyn DocumentMetrics>> {
    match &config.prometheus {
        Some(prom) => PrometheusDocumentMetrics::new(&prom.registry)
            .map(|metrics| Arc::new(metrics) as Arc<dyn DocumentMetrics>)
            .map_err(|e| {
                std::io::Error::other(format!("document metrics registration failed: {e}"))
            }),
        None => Ok(Arc::new(NoOpDocumentMetrics)),
    }
}

#[cfg(not(feature = "metrics"))]
fn build_document_metrics(_config: &ServerConfig) -> std::io::Result<Arc<dyn DocumentMetrics>> {
    Ok(Arc::new(NoOpDocumentMetrics))
}

fn build_accounts<P>(
    provider: Arc<P>,
    documents: Arc<dyn DocumentPipeline>,
    applications: Arc<dyn ApplicationWorkflow>,
) -> (Arc<dyn LoginService>, Arc<dyn UserAdministration>)
where
    P: IdentityProvider + 'static,
{
    let service = Arc::new(AccountService::new(provider, documents, applications));
    (
        service.clone() as Arc<dyn LoginService>,
        service as Arc<dyn UserAdministration>,
    )
}

/// Wire services over one set of repositories.
fn assemble_ports<C, A, D, M>(repos: Repositories<C, A, D, M>, shared: Shared) -> HttpStatePorts
where
    C: ContentRepository + 'static,
    A: ApplicationRepository + 'static,
    D: DocumentRepository + 'static,
    M: ContactRepository + 'static,
{
    let Shared {
        identity,
        storage,
        metrics,
        clock,
    } = shared;
    let archive = Arc::new(ZipArchiveBuilder);
    let documents: Arc<dyn DocumentPipeline> = match storage {
        StorageBackend::Remote(storage) => Arc::new(DocumentService::new(
            repos.documents,
            storage,
            archive,
            metrics,
            clock.clone(),
        )),
        StorageBackend::Memory(storage) => Arc::new(DocumentService::new(
            repos.documents,
            storage,
            archive,
            metrics,
            clock.clone(),
        )),
    };
    let applications: Arc<dyn ApplicationWorkflow> =
        Arc::new(ApplicationService::new(repos.applications, clock.clone()));
    let (login, users) = match identity {
        IdentityBackend::Remote(provider) => {
            build_accounts(provider, documents.clone(), applications.clone())
        }
        IdentityBackend::Memory(provider) => {
            build_accounts(provider, documents.clone(), applications.clone())
        }
    };
    HttpStatePorts {
        login,
        users,
        content: Arc::new(ContentCatalogueService::new(repos.content, clock.clone())),
        applications,
        documents,
        contact: Arc::new(ContactService::new(repos.contact, clock)),
    }
}

/// Build the shared HTTP state from configured adapters and in-memory
/// fallbacks.
///
/// # Errors
///
/// Fails when a remote URL is malformed, an HTTP client cannot be built, the
/// bootstrap account is invalid, or metric registration fails.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let (identity, storage) = match build_remote_backends(config)? {
        Some(backends) => backends,
        None => {
            warn!("identity provider not configured; accounts and documents live in memory");
            (
                IdentityBackend::Memory(build_memory_identity(config)?),
                StorageBackend::Memory(Arc::new(InMemoryObjectStorage::new())),
            )
        }
    };
    let shared = Shared {
        identity,
        storage,
        metrics: build_document_metrics(config)?,
        clock: Arc::new(DefaultClock),
    };

    let ports = match &config.db_pool {
        Some(pool) => assemble_ports(
            Repositories {
                content: Arc::new(DieselContentRepository::new(pool.clone())),
                applications: Arc::new(DieselApplicationRepository::new(pool.clone())),
                documents: Arc::new(DieselDocumentRepository::new(pool.clone())),
                contact: Arc::new(DieselContactRepository::new(pool.clone())),
            },
            shared,
        ),
        None => {
            warn!("database not configured; records live in memory");
            assemble_ports(
                Repositories {
                    content: Arc::new(InMemoryContentRepository::new()),
                    applications: Arc::new(InMemoryApplicationRepository::new()),
                    documents: Arc::new(InMemoryDocumentRepository::new()),
                    contact: Arc::new(InMemoryContactRepository::new()),
                },
                shared,
            )
        }
    };

    Ok(web::Data::new(HttpState::with_upload_limit(
        ports,
        config.max_upload_bytes,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use abroad::domain::LoginCredentials;
    use abroad::inbound::http::session_config::SessionSettings;
    use actix_web::cookie::{Key, SameSite};
    use rstest::{fixture, rstest};

    use crate::server::config::BootstrapAdmin;

    #[fixture]
    fn memory_config() -> ServerConfig {
        ServerConfig::new(
            SessionSettings {
                key: Key::generate(),
                cookie_secure: false,
                same_site: SameSite::Lax,
            },
            "127.0.0.1:0".parse().expect("socket address"),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn bootstrap_admin_can_sign_in(memory_config: ServerConfig) {
        let config = memory_config.with_bootstrap_admin(Some(BootstrapAdmin {
            email: "root@example.test".to_owned(),
            password: "correct horse".to_owned(),
        }));
        let state = build_http_state(&config).expect("memory state");

        let credentials = LoginCredentials::try_from_parts("root@example.test", "correct horse")
            .expect("credential shape");
        let principal = state
            .login
            .authenticate(&credentials)
            .await
            .expect("bootstrap sign-in");
        assert_eq!(principal.role(), Role::SuperAdmin);
    }

    #[rstest]
    #[tokio::test]
    async fn memory_state_starts_empty(memory_config: ServerConfig) {
        let config = memory_config.with_upload_limit(1024);
        let state = build_http_state(&config).expect("memory state");

        assert_eq!(state.max_upload_bytes, 1024);
        let contact = state.contact.list(None).await.expect("contact list");
        assert!(contact.is_empty());
    }

    #[rstest]
    fn malformed_remote_url_is_rejected(memory_config: ServerConfig) {
        let config = memory_config.with_remote_auth(abroad::config::RemoteAuthSettings {
            identity_url: "not a url".to_owned(),
            storage_url: "not a url".to_owned(),
            anon_key: zeroize::Zeroizing::new("anon".to_owned()),
            service_role_key: zeroize::Zeroizing::new("service".to_owned()),
        });

        assert!(build_http_state(&config).is_err());
    }
}
