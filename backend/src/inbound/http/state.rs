//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::DEFAULT_MAX_UPLOAD_BYTES;
use crate::domain::ports::{
    ApplicationWorkflow, ContactInbox, ContentCatalogue, DocumentPipeline, LoginService,
    UserAdministration,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UserAdministration>,
    pub content: Arc<dyn ContentCatalogue>,
    pub applications: Arc<dyn ApplicationWorkflow>,
    pub documents: Arc<dyn DocumentPipeline>,
    pub contact: Arc<dyn ContactInbox>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UserAdministration>,
    pub content: Arc<dyn ContentCatalogue>,
    pub applications: Arc<dyn ApplicationWorkflow>,
    pub documents: Arc<dyn DocumentPipeline>,
    pub contact: Arc<dyn ContactInbox>,
    /// Largest accepted multipart file part, in bytes.
    pub max_upload_bytes: usize,
}

impl HttpState {
    /// Construct state with the default upload limit.
    pub fn new(ports: HttpStatePorts) -> Self {
        Self::with_upload_limit(ports, DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn with_upload_limit(ports: HttpStatePorts, max_upload_bytes: usize) -> Self {
        let HttpStatePorts {
            login,
            users,
            content,
            applications,
            documents,
            contact,
        } = ports;
        Self {
            login,
            users,
            content,
            applications,
            documents,
            contact,
            max_upload_bytes,
        }
    }
}
