//! Student application endpoints.
//!
//! ```text
//! GET    /api/applications
//! POST   /api/applications {"university_name":"Oxford","program_name":"MSc CS"}
//! GET    /api/applications/{id}
//! PATCH  /api/applications/{id} {"status":"submitted"}
//! DELETE /api/applications/{id}
//! GET    /api/admin/applications?status=submitted
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    Application, ApplicationDraft, ApplicationPatch, ApplicationStatus,
    ApplicationValidationError, Error,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ApplicationSchema, ErrorSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_value_error, parse_uuid};

const STATUS: FieldName = FieldName::new("status");
const STATUS_EXPECTED: &str = "draft|submitted|under_review|accepted|rejected";

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateApplicationRequest {
    pub university_name: String,
    pub program_name: String,
    #[serde(default)]
    pub program_level: Option<String>,
    #[serde(default)]
    pub intake: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update; `status` requires a staff session.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UpdateApplicationRequest {
    #[serde(default)]
    pub university_name: Option<String>,
    #[serde(default)]
    pub program_name: Option<String>,
    #[serde(default)]
    pub program_level: Option<String>,
    #[serde(default)]
    pub intake: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct StatusFilter {
    pub status: Option<String>,
}

fn parse_status(raw: &str) -> Result<ApplicationStatus, Error> {
    raw.parse()
        .map_err(|_| invalid_value_error(STATUS, raw, STATUS_EXPECTED))
}

fn validation_error(error: ApplicationValidationError) -> Error {
    let ApplicationValidationError::EmptyField { field } = &error;
    Error::invalid_request(error.to_string()).with_details(json!({ "field": field }))
}

impl TryFrom<UpdateApplicationRequest> for ApplicationPatch {
    type Error = Error;

    fn try_from(value: UpdateApplicationRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            university_name: value.university_name,
            program_name: value.program_name,
            program_level: value.program_level,
            intake: value.intake,
            notes: value.notes,
            status: value.status.as_deref().map(parse_status).transpose()?,
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/applications",
    responses(
        (status = 200, description = "Caller's applications, newest first", body = [ApplicationSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "listOwnApplications"
)]
#[get("/applications")]
pub async fn list_own_applications(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Application>>> {
    let principal = session.require_principal()?;
    state.applications.list_own(&principal).await.map(web::Json)
}

#[utoipa::path(
    post,
    path = "/api/applications",
    request_body = CreateApplicationRequest,
    responses(
        (status = 201, description = "Draft created", body = ApplicationSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "createApplication"
)]
#[post("/applications")]
pub async fn create_application(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateApplicationRequest>,
) -> ApiResult<HttpResponse> {
    let principal = session.require_principal()?;
    let request = payload.into_inner();
    let draft = ApplicationDraft::try_new(
        request.university_name,
        request.program_name,
        request.program_level,
        request.intake,
        request.notes,
    )
    .map_err(validation_error)?;
    let application = state.applications.create(&principal, draft).await?;
    Ok(HttpResponse::Created().json(application))
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}",
    params(("id" = String, Path, description = "Application id")),
    responses(
        (status = 200, description = "Application", body = ApplicationSchema),
        (status = 404, description = "Not found or not yours", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "getApplication"
)]
#[get("/applications/{id}")]
pub async fn get_application(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Application>> {
    let principal = session.require_principal()?;
    let id = parse_uuid(&path, FieldName::new("id"))?;
    state.applications.get(&principal, id).await.map(web::Json)
}

#[utoipa::path(
    patch,
    path = "/api/applications/{id}",
    params(("id" = String, Path, description = "Application id")),
    request_body = UpdateApplicationRequest,
    responses(
        (status = 200, description = "Updated application", body = ApplicationSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Status change by non-staff", body = ErrorSchema),
        (status = 404, description = "Not found or not yours", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "updateApplication"
)]
#[patch("/applications/{id}")]
pub async fn update_application(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateApplicationRequest>,
) -> ApiResult<web::Json<Application>> {
    let principal = session.require_principal()?;
    let id = parse_uuid(&path, FieldName::new("id"))?;
    let patch = ApplicationPatch::try_from(payload.into_inner())?;
    state
        .applications
        .update(&principal, id, patch)
        .await
        .map(web::Json)
}

#[utoipa::path(
    delete,
    path = "/api/applications/{id}",
    params(("id" = String, Path, description = "Application id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found or not yours", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "deleteApplication"
)]
#[delete("/applications/{id}")]
pub async fn delete_application(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let principal = session.require_principal()?;
    let id = parse_uuid(&path, FieldName::new("id"))?;
    state.applications.delete(&principal, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Every application, optionally filtered by status (staff only).
#[utoipa::path(
    get,
    path = "/api/admin/applications",
    params(StatusFilter),
    responses(
        (status = 200, description = "Applications, newest first", body = [ApplicationSchema]),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listAllApplications"
)]
#[get("/admin/applications")]
pub async fn list_all_applications(
    state: web::Data<HttpState>,
    query: web::Query<StatusFilter>,
) -> ApiResult<web::Json<Vec<Application>>> {
    let status = query.status.as_deref().map(parse_status).transpose()?;
    state.applications.list_all(status).await.map(web::Json)
}
