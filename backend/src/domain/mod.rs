//! Domain primitives, aggregates, ports and services.
//!
//! Purpose: define strongly typed entities used by the API and persistence
//! layers, and the services that implement the driving ports. Nothing in
//! here knows about HTTP, SQL or the concrete identity/storage providers.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifier.
//! - Principal / Role: authenticated identity and access level.
//! - ContentKind / ContentEntry: the informational content family.
//! - Application, Document, ContactMessage: owned records.
//! - Services: one per driving port in [`ports`].

pub mod access;
pub mod account_service;
pub mod application;
pub mod application_service;
pub mod auth;
pub mod contact;
pub mod contact_service;
pub mod content;
pub mod content_service;
pub mod document;
pub mod document_service;
pub mod error;
pub mod ports;
pub mod principal;
pub mod trace_id;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use self::access::RequiredAccess;
pub use self::account_service::AccountService;
pub use self::application::{
    Application, ApplicationDraft, ApplicationPatch, ApplicationStatus,
    ApplicationValidationError, UnknownApplicationStatus,
};
pub use self::application_service::ApplicationService;
pub use self::auth::{
    CredentialValidationError, LoginCredentials, MIN_PASSWORD_LEN, Registration,
};
pub use self::contact::{
    ContactDraft, ContactMessage, ContactStatus, ContactValidationError, UnknownContactStatus,
};
pub use self::contact_service::ContactService;
pub use self::content::{
    ContentDraft, ContentEntry, ContentKind, ContentPatch, ContentValidationError, ContentView,
    ProgramKey, UnknownContentKind,
};
pub use self::content_service::{ContentCatalogueService, content_validation_error};
pub use self::document::{
    ArchiveEntry, DEFAULT_MAX_UPLOAD_BYTES, Document, DocumentUpload, EntryNamer,
    SIGNED_URL_TTL_SECS, SignedUrl, StorageKey, UploadValidationError, content_type_for,
    sanitise_file_name,
};
pub use self::document_service::DocumentService;
pub use self::error::{Error, ErrorCode};
pub use self::principal::{ADMIN_ROLES, Principal, PrincipalId, Role, UnknownRole};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use abroad::domain::{ApiResult, Error, ErrorCode};
///
/// fn lookup() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert_eq!(lookup().unwrap_err().code(), ErrorCode::Forbidden);
/// ```
pub type ApiResult<T> = Result<T, Error>;
