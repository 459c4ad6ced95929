//! Embedded PostgreSQL for repository integration tests.
//!
//! `pg-embed-setup-unpriv` installs into `/var/tmp` unless `PG_RUNTIME_DIR`
//! and `PG_DATA_DIR` are set. When either is missing, both are pointed at a
//! unique directory under the cargo target dir for the duration of the
//! bootstrap. Each suite then gets a freshly created database with the
//! embedded migrations applied through the production migration runner.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use abroad::outbound::persistence::run_pending_migrations;
use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use uuid::Uuid;

static BOOTSTRAP_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_MS: u64 = 500;

fn pg_embed_dir() -> PathBuf {
    let target = std::env::var_os("CARGO_TARGET_DIR").map_or_else(
        || PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("target"),
        PathBuf::from,
    );
    target
        .join("pg-embed")
        .join(format!("abroad-{}-{}", std::process::id(), Uuid::new_v4()))
}

/// Binary downloads fail intermittently when suites bootstrap in parallel.
fn is_transient(message: &str) -> bool {
    let message = message.to_lowercase();
    [
        "error decoding response body",
        "connection reset",
        "connection refused",
        "timed out",
        "timeout",
        "temporarily unavailable",
        "dns error",
    ]
    .iter()
    .any(|pattern| message.contains(pattern))
}

/// Start an embedded cluster, retrying transient bootstrap failures.
pub fn test_cluster() -> Result<TestCluster, String> {
    let _bootstrap = BOOTSTRAP_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let _env = if std::env::var_os("PG_RUNTIME_DIR").is_none()
        || std::env::var_os("PG_DATA_DIR").is_none()
    {
        let base = pg_embed_dir();
        let runtime_dir = base.join("install");
        let data_dir = base.join("data");
        std::fs::create_dir_all(&runtime_dir).map_err(|err| err.to_string())?;
        std::fs::create_dir_all(&data_dir).map_err(|err| err.to_string())?;
        Some(env_lock::lock_env([
            ("PG_RUNTIME_DIR", Some(runtime_dir.to_string_lossy().into_owned())),
            ("PG_DATA_DIR", Some(data_dir.to_string_lossy().into_owned())),
        ]))
    } else {
        None
    };

    let mut last_error = String::new();
    for attempt in 0..=MAX_RETRIES {
        match TestCluster::new() {
            Ok(cluster) => return Ok(cluster),
            Err(err) => {
                last_error = format!("{err:?}");
                if attempt == MAX_RETRIES || !is_transient(&last_error) {
                    break;
                }
                let delay = Duration::from_millis(RETRY_DELAY_MS << attempt);
                eprintln!("pg-embed: attempt {} failed, retrying in {delay:?}", attempt + 1);
                std::thread::sleep(delay);
            }
        }
    }
    Err(last_error)
}

/// Postgres errors often `Display` as a bare `db error`; surface the server
/// message and SQLSTATE instead.
pub fn describe_postgres_error(error: &postgres::Error) -> String {
    match error.as_db_error() {
        Some(db) => format!("postgres error {:?}: {}", db.code(), db.message()),
        None => error.to_string(),
    }
}

/// Drop and recreate `name`, then apply the embedded migrations to it.
///
/// `DROP DATABASE` cannot run inside a transaction, so each statement is sent
/// on its own.
pub async fn fresh_database(cluster: &TestCluster, name: &str) -> Result<String, String> {
    let admin_url = cluster.connection().database_url("postgres");
    let statements = [
        format!("DROP DATABASE IF EXISTS \"{name}\""),
        format!("CREATE DATABASE \"{name}\""),
    ];
    tokio::task::spawn_blocking(move || {
        let mut client =
            Client::connect(&admin_url, NoTls).map_err(|err| describe_postgres_error(&err))?;
        for statement in &statements {
            client
                .batch_execute(statement)
                .map_err(|err| describe_postgres_error(&err))?;
        }
        Ok::<(), String>(())
    })
    .await
    .map_err(|err| err.to_string())??;

    let url = cluster.connection().database_url(name);
    run_pending_migrations(&url)
        .await
        .map_err(|err| err.to_string())?;
    Ok(url)
}

fn skip_requested() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// `None` with a skip marker when `SKIP_TEST_CLUSTER` is truthy; otherwise
/// fail loudly so CI breakage is not hidden.
pub fn cluster_unavailable<T>(reason: impl std::fmt::Display) -> Option<T> {
    if skip_requested() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("embedded PostgreSQL unavailable: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}
