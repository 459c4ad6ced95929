//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, identity provider, object storage, archive
//! builder, metrics) expose typed errors built with `define_port_error!`.
//! Driving ports return the API-facing [`crate::domain::Error`].

mod macros;
pub(crate) use macros::define_port_error;

mod application_repository;
mod application_workflow;
mod archive_builder;
mod contact_inbox;
mod contact_repository;
mod content_catalogue;
mod content_repository;
mod document_metrics;
mod document_pipeline;
mod document_repository;
mod identity_provider;
mod login_service;
mod object_storage;

#[cfg(test)]
pub use application_repository::MockApplicationRepository;
pub use application_repository::{ApplicationRepository, ApplicationRepositoryError};
#[cfg(test)]
pub use application_workflow::MockApplicationWorkflow;
pub use application_workflow::ApplicationWorkflow;
#[cfg(test)]
pub use archive_builder::MockArchiveBuilder;
pub use archive_builder::{ArchiveBuilder, ArchiveError};
#[cfg(test)]
pub use contact_inbox::MockContactInbox;
pub use contact_inbox::ContactInbox;
#[cfg(test)]
pub use contact_repository::MockContactRepository;
pub use contact_repository::{ContactRepository, ContactRepositoryError};
#[cfg(test)]
pub use content_catalogue::MockContentCatalogue;
pub use content_catalogue::ContentCatalogue;
#[cfg(test)]
pub use content_repository::MockContentRepository;
pub use content_repository::{ContentRepository, ContentRepositoryError};
#[cfg(test)]
pub use document_metrics::MockDocumentMetrics;
pub use document_metrics::{CompensationOutcome, DocumentMetrics, NoOpDocumentMetrics};
#[cfg(test)]
pub use document_pipeline::MockDocumentPipeline;
pub use document_pipeline::{BatchDownload, BatchDownloadRequest, DocumentPipeline};
#[cfg(test)]
pub use document_repository::MockDocumentRepository;
pub use document_repository::{DocumentRepository, DocumentRepositoryError};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{IdentityProvider, IdentityProviderError};
pub use login_service::{LoginService, UserAdministration};
#[cfg(test)]
pub use login_service::MockUserAdministration;
#[cfg(test)]
pub use object_storage::MockObjectStorage;
pub use object_storage::{ObjectStorage, ObjectStorageError};
