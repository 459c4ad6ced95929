//! Document pipeline endpoints.
//!
//! ```text
//! POST   /api/documents/upload            multipart: file, name?
//! GET    /api/documents
//! GET    /api/documents/{id}              {"signedUrl":"…","expiresIn":60}
//! DELETE /api/documents/{id}
//! GET    /api/admin/documents?userId=…
//! POST   /api/admin/documents/download    {"documentIds":[…],"userId":"…"}
//! ```
//!
//! Uploads are buffered in memory up to the configured limit; the limit is
//! enforced while reading so oversized bodies are never fully held.

use actix_multipart::{Field, Multipart};
use actix_web::http::header::ContentDisposition;
use actix_web::{HttpResponse, delete, get, post, web};
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::ports::{BatchDownload, BatchDownloadRequest};
use crate::domain::{Document, DocumentUpload, Error, PrincipalId, SignedUrl, UploadValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{DocumentSchema, ErrorSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_uuid_error, missing_field_error, parse_uuid, parse_uuid_list,
};

/// Response header reporting archive entries that could not be fetched.
pub const SKIPPED_ENTRIES_HEADER: &str = "x-skipped-entries";

const FILE_FIELD: &str = "file";
const NAME_FIELD: &str = "name";
const MAX_NAME_FIELD_BYTES: usize = 1024;
const USER_ID: FieldName = FieldName::new("userId");

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlResponse {
    pub signed_url: String,
    pub expires_in: u32,
}

impl From<SignedUrl> for SignedUrlResponse {
    fn from(value: SignedUrl) -> Self {
        Self {
            signed_url: value.url,
            expires_in: value.expires_in,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchDownloadBody {
    pub document_ids: Vec<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct OwnerQuery {
    pub user_id: Option<String>,
}

/// Upload form fields once the multipart stream has been read.
#[derive(Debug, Default)]
struct UploadForm {
    file_name: Option<String>,
    declared_type: Option<String>,
    bytes: Option<Vec<u8>>,
    name: Option<String>,
}

fn upload_error(error: &UploadValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({ "field": FILE_FIELD }))
}

fn multipart_error(error: impl std::fmt::Display) -> Error {
    Error::invalid_request(format!("malformed multipart body: {error}"))
}

async fn read_field(field: &mut Field, limit: usize) -> Result<Option<Vec<u8>>, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
        if bytes.len() + chunk.len() > limit {
            return Ok(None);
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(Some(bytes))
}

async fn read_form(mut payload: Multipart, limit: usize) -> Result<UploadForm, Error> {
    let mut form = UploadForm::default();
    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let part = field.name().map(str::to_owned);
        match part.as_deref() {
            Some(FILE_FIELD) => {
                form.file_name = field
                    .content_disposition()
                    .and_then(|disposition| disposition.get_filename())
                    .map(str::to_owned);
                form.declared_type = field.content_type().map(ToString::to_string);
                let bytes = read_field(&mut field, limit)
                    .await?
                    .ok_or_else(|| upload_error(&UploadValidationError::TooLarge { limit }))?;
                form.bytes = Some(bytes);
            }
            Some(NAME_FIELD) => {
                let bytes = read_field(&mut field, MAX_NAME_FIELD_BYTES)
                    .await?
                    .ok_or_else(|| Error::invalid_request("name field is too long"))?;
                form.name = Some(String::from_utf8_lossy(&bytes).into_owned());
            }
            _ => {
                while field.try_next().await.map_err(multipart_error)?.is_some() {}
            }
        }
    }
    Ok(form)
}

impl UploadForm {
    /// An explicit non-blank `name` wins over the part's file name.
    fn into_upload(self, limit: usize) -> Result<DocumentUpload, Error> {
        let bytes = self
            .bytes
            .ok_or_else(|| missing_field_error(FieldName::new(FILE_FIELD)))?;
        let name = self
            .name
            .filter(|name| !name.trim().is_empty())
            .or(self.file_name)
            .unwrap_or_default();
        DocumentUpload::try_new(&name, self.declared_type.as_deref(), bytes, limit)
            .map_err(|err| upload_error(&err))
    }
}

fn parse_owner(raw: &str) -> Result<PrincipalId, Error> {
    raw.trim()
        .parse()
        .map_err(|_| invalid_uuid_error(USER_ID, raw))
}

#[utoipa::path(
    post,
    path = "/api/documents/upload",
    request_body(content_type = "multipart/form-data", description = "`file` part plus optional `name`"),
    responses(
        (status = 201, description = "Stored document", body = DocumentSchema),
        (status = 400, description = "Missing, empty or oversized file", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 502, description = "Object storage failed", body = ErrorSchema)
    ),
    tags = ["documents"],
    operation_id = "uploadDocument"
)]
#[post("/documents/upload")]
pub async fn upload_document(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let principal = session.require_principal()?;
    let limit = state.max_upload_bytes;
    let upload = read_form(payload, limit).await?.into_upload(limit)?;
    let document = state.documents.upload(&principal, upload).await?;
    Ok(HttpResponse::Created().json(document))
}

#[utoipa::path(
    get,
    path = "/api/documents",
    responses(
        (status = 200, description = "Caller's documents, newest first", body = [DocumentSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["documents"],
    operation_id = "listOwnDocuments"
)]
#[get("/documents")]
pub async fn list_own_documents(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Document>>> {
    let principal = session.require_principal()?;
    state.documents.list_own(&principal).await.map(web::Json)
}

/// Short-lived read URL for one document.
#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    params(("id" = String, Path, description = "Document id")),
    responses(
        (status = 200, description = "Signed URL valid for 60 seconds", body = SignedUrlResponse),
        (status = 404, description = "Not found or not yours", body = ErrorSchema),
        (status = 502, description = "Object storage failed", body = ErrorSchema)
    ),
    tags = ["documents"],
    operation_id = "signDocument"
)]
#[get("/documents/{id}")]
pub async fn sign_document(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<SignedUrlResponse>> {
    let principal = session.require_principal()?;
    let id = parse_uuid(&path, FieldName::new("id"))?;
    let signed = state.documents.signed_url(&principal, id).await?;
    Ok(web::Json(signed.into()))
}

#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    params(("id" = String, Path, description = "Document id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found or not yours", body = ErrorSchema)
    ),
    tags = ["documents"],
    operation_id = "deleteDocument"
)]
#[delete("/documents/{id}")]
pub async fn delete_document(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let principal = session.require_principal()?;
    let id = parse_uuid(&path, FieldName::new("id"))?;
    state.documents.delete(&principal, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/admin/documents",
    params(OwnerQuery),
    responses(
        (status = 200, description = "The user's documents", body = [DocumentSchema]),
        (status = 400, description = "Missing or malformed userId", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listUserDocuments"
)]
#[get("/admin/documents")]
pub async fn list_user_documents(
    state: web::Data<HttpState>,
    query: web::Query<OwnerQuery>,
) -> ApiResult<web::Json<Vec<Document>>> {
    let raw = query
        .user_id
        .as_deref()
        .ok_or_else(|| missing_field_error(USER_ID))?;
    let owner = parse_owner(raw)?;
    state.documents.list_for_owner(owner).await.map(web::Json)
}

/// One match yields `{signedUrl}`; several yield a zip attachment whose
/// unreadable entries are counted in `X-Skipped-Entries`.
#[utoipa::path(
    post,
    path = "/api/admin/documents/download",
    request_body = BatchDownloadBody,
    responses(
        (status = 200, description = "Zip archive or signed URL", body = SignedUrlResponse,
            headers(("X-Skipped-Entries" = u32, description = "Entries left out of the archive"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "No matching documents", body = ErrorSchema),
        (status = 502, description = "No document could be fetched", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "downloadDocuments"
)]
#[post("/admin/documents/download")]
pub async fn download_documents(
    state: web::Data<HttpState>,
    payload: web::Json<BatchDownloadBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let request = BatchDownloadRequest {
        document_ids: parse_uuid_list(&body.document_ids, FieldName::new("documentIds"))?,
        owner: body.user_id.as_deref().map(parse_owner).transpose()?,
    };
    match state.documents.batch_download(request).await? {
        BatchDownload::Single(signed) => {
            Ok(HttpResponse::Ok().json(SignedUrlResponse::from(signed)))
        }
        BatchDownload::Archive {
            file_name,
            content_type,
            bytes,
            skipped,
            ..
        } => Ok(HttpResponse::Ok()
            .content_type(content_type)
            .insert_header(ContentDisposition::attachment(file_name))
            .insert_header((SKIPPED_ENTRIES_HEADER, skipped.to_string()))
            .body(bytes)),
    }
}
