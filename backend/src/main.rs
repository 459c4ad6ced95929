//! Backend entry-point: loads settings, prepares adapters and serves the API.

mod server;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use color_eyre::eyre::{WrapErr, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use abroad::config::AppSettings;
use abroad::inbound::http::health::HealthState;
use abroad::inbound::http::session_config::{BuildMode, session_settings_from_env};
use abroad::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{BootstrapAdmin, ServerConfig, create_server};

fn init_tracing() {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}

async fn attach_database(
    config: ServerConfig,
    settings: &AppSettings,
) -> color_eyre::Result<ServerConfig> {
    let Some(url) = settings.database_url.as_deref() else {
        return Ok(config);
    };
    run_pending_migrations(url)
        .await
        .wrap_err("database migrations failed")?;
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.db_pool_size))
        .await
        .wrap_err("database pool could not be built")?;
    info!(max_size = settings.db_pool_size, "database pool ready");
    Ok(config.with_db_pool(pool))
}

#[cfg(feature = "metrics")]
fn make_metrics() -> color_eyre::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new("abroad")
        .endpoint("/metrics")
        .build()
        .map_err(|err| eyre!("configure Prometheus metrics: {err}"))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_tracing();

    let settings =
        AppSettings::load().map_err(|err| eyre!("failed to load configuration: {err}"))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    info!(fingerprint = %session.fingerprint(), "session key loaded");

    let mut config = ServerConfig::new(session, settings.bind_addr()?)
        .with_storage_bucket(settings.storage_bucket())
        .with_outbound_timeout(settings.outbound_timeout())
        .with_upload_limit(settings.max_upload_bytes())
        .with_bootstrap_admin(settings.bootstrap_admin().map(|(email, password)| {
            BootstrapAdmin {
                email: email.to_owned(),
                password: password.to_owned(),
            }
        }));
    if let Some(remote) = settings.remote_auth()? {
        config = config.with_remote_auth(remote);
    }
    let config = attach_database(config, &settings).await?;
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(make_metrics()?));

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(addr = %settings.bind_addr()?, "listening");
    let result = server.await;
    health_state.mark_unhealthy();
    result.wrap_err("server terminated with an error")
}
