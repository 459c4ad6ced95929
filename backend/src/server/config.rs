//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use abroad::config::RemoteAuthSettings;
use abroad::domain::DEFAULT_MAX_UPLOAD_BYTES;
use abroad::inbound::http::session_config::SessionSettings;
use abroad::outbound::persistence::DbPool;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

const DEFAULT_OUTBOUND_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_BUCKET: &str = "documents";

/// Bootstrap account for the in-memory identity provider.
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) remote_auth: Option<RemoteAuthSettings>,
    pub(crate) storage_bucket: String,
    pub(crate) outbound_timeout: Duration,
    pub(crate) max_upload_bytes: usize,
    pub(crate) bootstrap_admin: Option<BootstrapAdmin>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a configuration that runs every adapter in memory.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        Self {
            session,
            bind_addr,
            db_pool: None,
            remote_auth: None,
            storage_bucket: DEFAULT_BUCKET.to_owned(),
            outbound_timeout: DEFAULT_OUTBOUND_TIMEOUT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            bootstrap_admin: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Attach a database connection pool for the relational repositories.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Use the remote identity provider and object store.
    #[must_use]
    pub fn with_remote_auth(mut self, remote: RemoteAuthSettings) -> Self {
        self.remote_auth = Some(remote);
        self
    }

    #[must_use]
    pub fn with_storage_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.storage_bucket = bucket.into();
        self
    }

    #[must_use]
    pub fn with_outbound_timeout(mut self, timeout: Duration) -> Self {
        self.outbound_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_upload_limit(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    #[must_use]
    pub fn with_bootstrap_admin(mut self, admin: Option<BootstrapAdmin>) -> Self {
        self.bootstrap_admin = admin;
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
