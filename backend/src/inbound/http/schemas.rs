//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the structure of their corresponding domain
//! types but live in the inbound adapter layer where framework concerns belong.

#![expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request collides with existing state.
    #[schema(rename = "conflict")]
    Conflict,
    /// The identity provider or object storage failed.
    #[schema(rename = "upstream_failure")]
    UpstreamFailure,
    /// The database is temporarily unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Something went wrong")]
    error: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Principal`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Principal)]
#[schema(rename_all = "camelCase")]
pub struct PrincipalSchema {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    #[schema(example = "ada@example.com")]
    email: String,
    #[schema(example = "Ada Lovelace")]
    display_name: Option<String>,
    /// One of `user`, `admin`, `super_admin`.
    #[schema(example = "user")]
    role: String,
}

/// OpenAPI schema for [`crate::domain::Application`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Application)]
pub struct ApplicationSchema {
    #[schema(value_type = String)]
    id: String,
    #[schema(value_type = String)]
    owner_id: String,
    university_name: String,
    program_name: String,
    program_level: Option<String>,
    intake: Option<String>,
    notes: Option<String>,
    /// One of `draft`, `submitted`, `under_review`, `accepted`, `rejected`.
    #[schema(example = "draft")]
    status: String,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    #[schema(value_type = String, format = DateTime)]
    updated_at: String,
    /// Set the first time the application becomes `submitted`.
    #[schema(value_type = Option<String>, format = DateTime)]
    submitted_at: Option<String>,
}

/// OpenAPI schema for [`crate::domain::Document`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Document)]
pub struct DocumentSchema {
    #[schema(value_type = String)]
    id: String,
    #[schema(value_type = String)]
    owner_id: String,
    #[schema(example = "passport.pdf")]
    name: String,
    #[schema(example = "application/pdf")]
    content_type: String,
    /// `{owner}/{uuid}-{sanitised name}` inside the documents bucket.
    storage_path: String,
    size_bytes: i64,
    #[schema(value_type = String, format = DateTime)]
    uploaded_at: String,
}

/// OpenAPI schema for [`crate::domain::ContactMessage`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ContactMessage)]
pub struct ContactMessageSchema {
    #[schema(value_type = String)]
    id: String,
    name: String,
    email: String,
    subject: Option<String>,
    message: String,
    /// One of `new`, `in_progress`, `resolved`.
    #[schema(example = "new")]
    status: String,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    #[schema(value_type = String, format = DateTime)]
    updated_at: String,
}
