//! Application settings loaded via OrthoConfig.
//!
//! Values layer CLI flags over `APP_*` environment variables over an optional
//! configuration file. Every adapter endpoint is optional: without a database
//! URL the relational repositories run in memory, and without an identity
//! provider URL (or storage URL) the identity and storage adapters do too.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::domain::DEFAULT_MAX_UPLOAD_BYTES;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_BUCKET: &str = "documents";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {message}")]
    BindAddr { value: String, message: String },
    #[error("{name} must be set when {requires} is set")]
    MissingCompanion {
        name: &'static str,
        requires: &'static str,
    },
}

/// Runtime settings for the HTTP server and its adapters.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "APP")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    #[ortho_config(default = 10)]
    pub db_pool_size: u32,
    /// Base URL of the GoTrue-compatible identity provider.
    pub identity_url: Option<String>,
    /// Public key used for password sign-in.
    pub anon_key: Option<String>,
    /// Privileged key for account administration and storage.
    pub service_role_key: Option<String>,
    /// Base URL of the object store. Defaults to the identity provider URL.
    pub storage_url: Option<String>,
    /// Bucket holding uploaded documents.
    pub storage_bucket: Option<String>,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: Option<usize>,
    /// Timeout applied to every outbound HTTP call, in seconds.
    #[ortho_config(default = 10)]
    pub outbound_timeout_secs: u64,
    /// Super administrator created at startup by the in-memory identity
    /// provider. Ignored when a remote provider is configured.
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
}

/// Identity provider endpoint and keys, present only when fully configured.
pub struct RemoteAuthSettings {
    pub identity_url: String,
    pub storage_url: String,
    pub anon_key: Zeroizing<String>,
    pub service_role_key: Zeroizing<String>,
}

impl AppSettings {
    /// Parse the listen address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] for an unparsable address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|err: std::net::AddrParseError| {
            SettingsError::BindAddr {
                value: value.to_owned(),
                message: err.to_string(),
            }
        })
    }

    pub fn storage_bucket(&self) -> &str {
        self.storage_bucket.as_deref().unwrap_or(DEFAULT_BUCKET)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn outbound_timeout(&self) -> Duration {
        Duration::from_secs(self.outbound_timeout_secs)
    }

    /// Email and password for the bootstrap super administrator, when both
    /// are set.
    pub fn bootstrap_admin(&self) -> Option<(&str, &str)> {
        self.bootstrap_admin_email
            .as_deref()
            .zip(self.bootstrap_admin_password.as_deref())
    }

    /// Remote identity and storage settings.
    ///
    /// `Ok(None)` means no identity provider URL was configured and the
    /// in-memory adapters should be used.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingCompanion`] when the URL is set but a
    /// key is not.
    pub fn remote_auth(&self) -> Result<Option<RemoteAuthSettings>, SettingsError> {
        let Some(identity_url) = self.identity_url.clone() else {
            return Ok(None);
        };
        let anon_key = self
            .anon_key
            .clone()
            .ok_or(SettingsError::MissingCompanion {
                name: "APP_ANON_KEY",
                requires: "APP_IDENTITY_URL",
            })?;
        let service_role_key =
            self.service_role_key
                .clone()
                .ok_or(SettingsError::MissingCompanion {
                    name: "APP_SERVICE_ROLE_KEY",
                    requires: "APP_IDENTITY_URL",
                })?;
        let storage_url = self
            .storage_url
            .clone()
            .unwrap_or_else(|| identity_url.clone());
        Ok(Some(RemoteAuthSettings {
            identity_url,
            storage_url,
            anon_key: Zeroizing::new(anon_key),
            service_role_key: Zeroizing::new(service_role_key),
        }))
    }
}
