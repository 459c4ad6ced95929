//! Informational content endpoints.
//!
//! One set of handlers serves all eleven content kinds; the first path
//! segment selects the kind.
//!
//! ```text
//! GET    /api/universities
//! POST   /api/programs {"university_id":"…","name":"MSc CS","level":"masters"}
//! GET    /api/programs/{id}
//! PUT    /api/faqs/{id} {"answer":"Updated"}
//! DELETE /api/visa-guides/{id}
//! ```
//!
//! Reads are public; writes are staff-only at the authorization gate.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::domain::{
    ContentDraft, ContentEntry, ContentKind, ContentPatch, ContentView, Error,
    content_validation_error,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

const ID: FieldName = FieldName::new("id");

fn parse_kind(raw: &str) -> Result<ContentKind, Error> {
    raw.parse()
        .map_err(|_| Error::not_found(format!("unknown content type: {raw}")))
}

fn entry_json(entry: ContentEntry) -> Map<String, Value> {
    let mut object = entry.attributes;
    object.insert("id".to_owned(), json!(entry.id));
    object.insert("created_at".to_owned(), json!(entry.created_at));
    object.insert("updated_at".to_owned(), json!(entry.updated_at));
    object
}

/// Wire shape: attributes flattened beside `id` and timestamps, plus the
/// owning `university` for programs.
fn view_json(view: ContentView) -> Value {
    let mut object = entry_json(view.entry);
    if let Some(university) = view.university {
        object.insert("university".to_owned(), Value::Object(entry_json(university)));
    }
    Value::Object(object)
}

#[utoipa::path(
    get,
    path = "/api/{kind}",
    params(("kind" = String, Path, description = "Content kind, e.g. universities")),
    responses(
        (status = 200, description = "Entries, newest first", body = [Object]),
        (status = 404, description = "Unknown content kind", body = ErrorSchema)
    ),
    tags = ["content"],
    operation_id = "listContent",
    security([])
)]
#[get("/{kind}")]
pub async fn list_content(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Value>>> {
    let kind = parse_kind(&path)?;
    let views = state.content.list(kind).await?;
    Ok(web::Json(views.into_iter().map(view_json).collect()))
}

#[utoipa::path(
    get,
    path = "/api/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "Content kind"),
        ("id" = String, Path, description = "Entry id")
    ),
    responses(
        (status = 200, description = "Entry", body = Object),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["content"],
    operation_id = "getContent",
    security([])
)]
#[get("/{kind}/{id}")]
pub async fn get_content(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Value>> {
    let (kind, id) = path.into_inner();
    let kind = parse_kind(&kind)?;
    let id = parse_uuid(&id, ID)?;
    let view = state.content.get(kind, id).await?;
    Ok(web::Json(view_json(view)))
}

/// Create an entry. Programs with an existing `(university_id, name, level)`
/// are rejected with `409`.
#[utoipa::path(
    post,
    path = "/api/{kind}",
    params(("kind" = String, Path, description = "Content kind")),
    request_body = Object,
    responses(
        (status = 201, description = "Created", body = Object),
        (status = 400, description = "Invalid body", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "Duplicate program", body = ErrorSchema)
    ),
    tags = ["content"],
    operation_id = "createContent"
)]
#[post("/{kind}")]
pub async fn create_content(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let kind = parse_kind(&path)?;
    let draft = ContentDraft::try_new(kind, payload.into_inner()).map_err(content_validation_error)?;
    let view = state.content.create(draft).await?;
    Ok(HttpResponse::Created().json(view_json(view)))
}

/// Shallow-merge the body over the stored attributes.
#[utoipa::path(
    put,
    path = "/api/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "Content kind"),
        ("id" = String, Path, description = "Entry id")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Updated", body = Object),
        (status = 400, description = "Invalid body", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Duplicate program", body = ErrorSchema)
    ),
    tags = ["content"],
    operation_id = "updateContent"
)]
#[put("/{kind}/{id}")]
pub async fn update_content(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
    payload: web::Json<Value>,
) -> ApiResult<web::Json<Value>> {
    let (kind, id) = path.into_inner();
    let kind = parse_kind(&kind)?;
    let id = parse_uuid(&id, ID)?;
    let patch = ContentPatch::try_new(payload.into_inner()).map_err(content_validation_error)?;
    let view = state.content.update(kind, id, patch).await?;
    Ok(web::Json(view_json(view)))
}

#[utoipa::path(
    delete,
    path = "/api/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "Content kind"),
        ("id" = String, Path, description = "Entry id")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["content"],
    operation_id = "deleteContent"
)]
#[delete("/{kind}/{id}")]
pub async fn delete_content(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (kind, id) = path.into_inner();
    let kind = parse_kind(&kind)?;
    let id: Uuid = parse_uuid(&id, ID)?;
    state.content.delete(kind, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use chrono::Utc;
    use mockall::predicate::eq;
    use serde_json::Value;

    use super::*;
    use crate::domain::ports::MockContentCatalogue;
    use crate::inbound::http::test_utils::stub_state;

    fn entry(kind: ContentKind, attributes: Value) -> ContentEntry {
        let Value::Object(attributes) = attributes else {
            panic!("fixture attributes must be an object");
        };
        ContentEntry {
            id: Uuid::new_v4(),
            kind,
            attributes,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_app(
        catalogue: MockContentCatalogue,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let mut state = stub_state();
        state.content = Arc::new(catalogue);
        App::new().app_data(web::Data::new(state)).service(
            web::scope("/api")
                .service(list_content)
                .service(get_content)
                .service(create_content)
                .service(update_content)
                .service(delete_content),
        )
    }

    #[actix_web::test]
    async fn programs_embed_their_university() {
        let university = entry(ContentKind::Universities, json!({ "name": "Oxford", "country": "UK" }));
        let program = entry(
            ContentKind::Programs,
            json!({ "university_id": university.id, "name": "MSc CS", "level": "masters" }),
        );
        let mut catalogue = MockContentCatalogue::new();
        catalogue
            .expect_list()
            .with(eq(ContentKind::Programs))
            .times(1)
            .return_once(move |_| {
                Ok(vec![ContentView {
                    entry: program,
                    university: Some(university),
                }])
            });
        let app = actix_test::init_service(test_app(catalogue)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/programs").to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body[0]["name"], "MSc CS");
        assert_eq!(body[0]["university"]["name"], "Oxford");
        assert!(body[0]["id"].is_string());
    }

    #[actix_web::test]
    async fn unknown_kind_is_not_found() {
        let app = actix_test::init_service(test_app(MockContentCatalogue::new())).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/spaceships").to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn missing_required_attribute_is_a_bad_request() {
        let app = actix_test::init_service(test_app(MockContentCatalogue::new())).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/universities")
                .set_json(json!({ "country": "UK" }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "name");
    }

    #[actix_web::test]
    async fn duplicate_program_maps_to_conflict() {
        let mut catalogue = MockContentCatalogue::new();
        catalogue
            .expect_create()
            .times(1)
            .return_once(|_| Err(Error::conflict("duplicate program")));
        let app = actix_test::init_service(test_app(catalogue)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/programs")
                .set_json(json!({
                    "university_id": Uuid::new_v4(),
                    "name": "MSc CS",
                    "level": "masters",
                }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn malformed_id_is_rejected_before_lookup() {
        let app = actix_test::init_service(test_app(MockContentCatalogue::new())).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete().uri("/api/faqs/42").to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn delete_returns_no_content() {
        let id = Uuid::new_v4();
        let mut catalogue = MockContentCatalogue::new();
        catalogue
            .expect_delete()
            .with(eq(ContentKind::Faqs), eq(id))
            .times(1)
            .return_once(|_, _| Ok(()));
        let app = actix_test::init_service(test_app(catalogue)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/faqs/{id}"))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }
}
