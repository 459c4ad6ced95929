//! Contact form intake and back-office triage.
//!
//! ```text
//! POST   /api/contact {"name":"Ada","email":"ada@x.com","message":"Hello"}
//! GET    /api/admin/contact?status=new
//! PATCH  /api/admin/contact/{id} {"status":"resolved"}
//! DELETE /api/admin/contact/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{ContactDraft, ContactMessage, ContactStatus, ContactValidationError, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ContactMessageSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_value_error, parse_uuid};

const STATUS: FieldName = FieldName::new("status");
const STATUS_EXPECTED: &str = "new|in_progress|resolved";

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ContactStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ContactFilter {
    pub status: Option<String>,
}

fn parse_status(raw: &str) -> Result<ContactStatus, Error> {
    raw.parse()
        .map_err(|_| invalid_value_error(STATUS, raw, STATUS_EXPECTED))
}

fn validation_error(error: &ContactValidationError) -> Error {
    let field = match error {
        ContactValidationError::EmptyField { field } => *field,
        ContactValidationError::MalformedEmail => "email",
        ContactValidationError::MessageTooLong => "message",
    };
    Error::invalid_request(error.to_string()).with_details(json!({ "field": field }))
}

#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Message received", body = ContactMessageSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["contact"],
    operation_id = "submitContact",
    security([])
)]
#[post("/contact")]
pub async fn submit_contact(
    state: web::Data<HttpState>,
    payload: web::Json<ContactRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let draft = ContactDraft::try_new(
        &request.name,
        &request.email,
        request.subject.as_deref(),
        &request.message,
    )
    .map_err(|err| validation_error(&err))?;
    let message = state.contact.submit(draft).await?;
    Ok(HttpResponse::Created().json(message))
}

#[utoipa::path(
    get,
    path = "/api/admin/contact",
    params(ContactFilter),
    responses(
        (status = 200, description = "Messages, newest first", body = [ContactMessageSchema]),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listContact"
)]
#[get("/admin/contact")]
pub async fn list_contact(
    state: web::Data<HttpState>,
    query: web::Query<ContactFilter>,
) -> ApiResult<web::Json<Vec<ContactMessage>>> {
    let status = query.status.as_deref().map(parse_status).transpose()?;
    state.contact.list(status).await.map(web::Json)
}

#[utoipa::path(
    patch,
    path = "/api/admin/contact/{id}",
    params(("id" = String, Path, description = "Message id")),
    request_body = ContactStatusRequest,
    responses(
        (status = 200, description = "Updated message", body = ContactMessageSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "updateContactStatus"
)]
#[patch("/admin/contact/{id}")]
pub async fn update_contact_status(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<ContactStatusRequest>,
) -> ApiResult<web::Json<ContactMessage>> {
    let id = parse_uuid(&path, FieldName::new("id"))?;
    let status = parse_status(&payload.status)?;
    state.contact.set_status(id, status).await.map(web::Json)
}

#[utoipa::path(
    delete,
    path = "/api/admin/contact/{id}",
    params(("id" = String, Path, description = "Message id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "deleteContact"
)]
#[delete("/admin/contact/{id}")]
pub async fn delete_contact(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path, FieldName::new("id"))?;
    state.contact.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}
