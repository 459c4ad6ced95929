//! Backend library modules.
//!
//! The hexagon: [`domain`] owns entities, ports and services; [`inbound`]
//! adapts HTTP onto the driving ports; [`outbound`] implements the driven
//! ports against PostgreSQL, the identity provider and object storage.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
