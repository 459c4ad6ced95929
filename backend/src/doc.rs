//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every handler under `/api`, the health probes, and the
//! schema wrappers from [`crate::inbound::http::schemas`]. The document is
//! served by Swagger UI in debug builds and exported via
//! `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::admin_users::RoleChangeRequest;
use crate::inbound::http::applications::{CreateApplicationRequest, UpdateApplicationRequest};
use crate::inbound::http::auth::{LoginRequest, RegisterRequest};
use crate::inbound::http::contact::{ContactRequest, ContactStatusRequest};
use crate::inbound::http::documents::{BatchDownloadBody, SignedUrlResponse};
use crate::inbound::http::schemas::{
    ApplicationSchema, ContactMessageSchema, DocumentSchema, ErrorCodeSchema, ErrorSchema,
    PrincipalSchema,
};
use crate::inbound::http::session_config::SESSION_COOKIE_NAME;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the cookie security scheme referenced by protected operations.
pub const SECURITY_SCHEME: &str = "SessionCookie";

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            SECURITY_SCHEME,
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                SESSION_COOKIE_NAME,
                "Private session cookie issued by POST /api/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Abroad backend API",
        description = "Study-abroad consultancy backend: published content, \
                       student applications and documents, contact triage and \
                       back-office administration."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::current_session,
        crate::inbound::http::content::list_content,
        crate::inbound::http::content::get_content,
        crate::inbound::http::content::create_content,
        crate::inbound::http::content::update_content,
        crate::inbound::http::content::delete_content,
        crate::inbound::http::applications::list_own_applications,
        crate::inbound::http::applications::create_application,
        crate::inbound::http::applications::get_application,
        crate::inbound::http::applications::update_application,
        crate::inbound::http::applications::delete_application,
        crate::inbound::http::applications::list_all_applications,
        crate::inbound::http::documents::upload_document,
        crate::inbound::http::documents::list_own_documents,
        crate::inbound::http::documents::sign_document,
        crate::inbound::http::documents::delete_document,
        crate::inbound::http::documents::list_user_documents,
        crate::inbound::http::documents::download_documents,
        crate::inbound::http::contact::submit_contact,
        crate::inbound::http::contact::list_contact,
        crate::inbound::http::contact::update_contact_status,
        crate::inbound::http::contact::delete_contact,
        crate::inbound::http::admin_users::list_users,
        crate::inbound::http::admin_users::change_user_role,
        crate::inbound::http::admin_users::delete_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        PrincipalSchema,
        ApplicationSchema,
        DocumentSchema,
        ContactMessageSchema,
        LoginRequest,
        RegisterRequest,
        CreateApplicationRequest,
        UpdateApplicationRequest,
        SignedUrlResponse,
        BatchDownloadBody,
        ContactRequest,
        ContactStatusRequest,
        RoleChangeRequest,
    )),
    tags(
        (name = "auth", description = "Registration, sign-in and session lookup"),
        (name = "content", description = "Published informational content"),
        (name = "applications", description = "A student's own applications"),
        (name = "documents", description = "A student's own uploaded documents"),
        (name = "contact", description = "Public contact form"),
        (name = "admin", description = "Back-office operations for staff"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";
    const PRINCIPAL_SCHEMA_NAME: &str = "crate.domain.Principal";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_schema_has_wire_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "error");
    }

    #[test]
    fn principal_schema_has_role() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let principal = schemas.get(PRINCIPAL_SCHEMA_NAME).expect("Principal schema");

        assert_object_schema_has_field(principal, "role");
        assert_object_schema_has_field(principal, "displayName");
    }

    #[rstest]
    #[case("/api/auth/login")]
    #[case("/api/{kind}/{id}")]
    #[case("/api/documents/upload")]
    #[case("/api/admin/documents/download")]
    #[case("/api/admin/users/{id}/role")]
    #[case("/api/contact")]
    #[case("/health/ready")]
    fn document_lists_path(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[test]
    fn cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key(SECURITY_SCHEME));
    }
}
