//! Session issuer endpoints.
//!
//! ```text
//! POST /api/auth/register {"email":"a@x.com","password":"secret1"}
//! POST /api/auth/login {"email":"a@x.com","password":"secret1"}
//! POST /api/auth/logout
//! GET  /api/auth/session
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, LoginCredentials, Principal, Registration, Role};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, PrincipalSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, credential_error, invalid_value_error};

/// Login request body for `POST /api/auth/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request body for `POST /api/auth/register`.
///
/// `role` is only honoured when an admin-level session makes the request.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

fn requested_role(raw: Option<&str>) -> Result<Role, Error> {
    raw.map(|value| {
        value
            .parse::<Role>()
            .map_err(|_| invalid_value_error(FieldName::new("role"), value, "user|admin|super_admin"))
    })
    .transpose()
    .map(Option::unwrap_or_default)
}

/// Create an account. Does not sign the caller in.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = PrincipalSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Role not grantable by caller", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 502, description = "Identity provider failed", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let role = requested_role(request.role.as_deref())?;
    let registration = Registration::try_new(
        &request.email,
        &request.password,
        request.full_name.as_deref(),
        role,
    )
    .map_err(|err| credential_error(&err))?;
    let actor = session.principal()?;
    let principal = state.login.register(actor.as_ref(), registration).await?;
    Ok(HttpResponse::Created().json(principal))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = PrincipalSchema,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 502, description = "Identity provider failed", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<Principal>> {
    let request = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&request.email, &request.password)
        .map_err(|err| credential_error(&err))?;
    let principal = state.login.authenticate(&credentials).await?;
    session.persist_principal(&principal)?;
    Ok(web::Json(principal))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// Principal carried by the current session.
#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Signed-in principal", body = PrincipalSchema),
        (status = 401, description = "No session", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentSession"
)]
#[get("/auth/session")]
pub async fn current_session(session: SessionContext) -> ApiResult<web::Json<Principal>> {
    session.require_principal().map(web::Json)
}
