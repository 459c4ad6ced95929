//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **identity**: GoTrue-compatible identity provider over HTTP
//! - **storage**: bucketed object storage over HTTP
//! - **archive**: zip assembly for batch downloads
//! - **memory**: process-local stand-ins for development and tests
//! - **metrics**: Prometheus-backed metrics exporters (feature-gated)
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod archive;
mod http_support;
pub mod identity;
pub mod memory;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod persistence;
pub mod storage;
