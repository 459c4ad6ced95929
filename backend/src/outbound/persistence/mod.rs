//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories translate between Diesel rows (`models.rs`) and domain
//! types, and map pool and driver failures onto their port error enums.
//! Connections come from a `bb8` pool of `diesel-async` connections;
//! migrations are embedded and applied once at startup.
//!
//! ```ignore
//! use abroad::outbound::persistence::{DbPool, DieselContentRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/abroad")).await?;
//! let content = DieselContentRepository::new(pool.clone());
//! ```

mod diesel_application_repository;
mod diesel_contact_repository;
mod diesel_content_repository;
mod diesel_document_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_application_repository::DieselApplicationRepository;
pub use diesel_contact_repository::DieselContactRepository;
pub use diesel_content_repository::DieselContentRepository;
pub use diesel_document_repository::DieselDocumentRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
