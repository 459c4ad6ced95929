//! Back-office user management.
//!
//! ```text
//! GET    /api/admin/users
//! PATCH  /api/admin/users/{id}/role {"role":"admin"}
//! DELETE /api/admin/users/{id}
//! ```
//!
//! Deleting a user removes their documents and applications first.

use actix_web::{HttpResponse, delete, get, patch, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, Principal, PrincipalId, Role};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, PrincipalSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_uuid_error, invalid_value_error};

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct RoleChangeRequest {
    pub role: String,
}

fn parse_target(raw: &str) -> Result<PrincipalId, Error> {
    raw.parse()
        .map_err(|_| invalid_uuid_error(FieldName::new("id"), raw))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "Every principal", body = [PrincipalSchema]),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 502, description = "Identity provider failed", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listUsers"
)]
#[get("/admin/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Principal>>> {
    state.users.list_users().await.map(web::Json)
}

/// Granting or revoking `super_admin` needs a super admin session.
#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}/role",
    params(("id" = String, Path, description = "Principal id")),
    request_body = RoleChangeRequest,
    responses(
        (status = 200, description = "Updated principal", body = PrincipalSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "changeUserRole"
)]
#[patch("/admin/users/{id}/role")]
pub async fn change_user_role(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<RoleChangeRequest>,
) -> ApiResult<web::Json<Principal>> {
    let actor = session.require_principal()?;
    let target = parse_target(&path)?;
    let role = payload.role.parse::<Role>().map_err(|_| {
        invalid_value_error(FieldName::new("role"), &payload.role, "user|admin|super_admin")
    })?;
    state
        .users
        .change_role(&actor, target, role)
        .await
        .map(web::Json)
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = String, Path, description = "Principal id")),
    responses(
        (status = 204, description = "User and owned records deleted"),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 502, description = "Identity provider or storage failed", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "deleteUser"
)]
#[delete("/admin/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_principal()?;
    let target = parse_target(&path)?;
    state.users.delete_user(&actor, target).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use mockall::predicate::eq;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::ports::MockUserAdministration;
    use crate::domain::test_fixtures::{admin, student};
    use crate::inbound::http::test_utils::{
        session_cookie, sign_in_fixture, stub_state, test_session_middleware,
    };

    fn test_app(
        users: MockUserAdministration,
        actor: Principal,
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
        state.users = Arc::new(users);
        App::new()
            .app_data(web::Data::new(state))
            .app_data(web::Data::new(actor))
            .wrap(test_session_middleware())
            .route("/test/sign-in", web::get().to(sign_in_fixture))
            .service(
                web::scope("/api")
                    .service(list_users)
                    .service(change_user_role)
                    .service(delete_user),
            )
    }

    #[actix_web::test]
    async fn role_change_passes_actor_and_target() {
        let actor = admin();
        let target = student();
        let target_id = target.id();
        let actor_id = actor.id();
        let mut users = MockUserAdministration::new();
        users
            .expect_change_role()
            .withf(move |who, id, role| who.id() == actor_id && *id == target_id && *role == Role::Admin)
            .times(1)
            .return_once(move |_, _, role| Ok(target.with_role(role)));
        let app = actix_test::init_service(test_app(users, actor)).await;
        let cookie = session_cookie(&app, "/test/sign-in").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/admin/users/{target_id}/role"))
                .cookie(cookie)
                .set_json(json!({ "role": "admin" }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["role"], "admin");
    }

    #[actix_web::test]
    async fn self_deletion_surfaces_forbidden() {
        let actor = admin();
        let actor_id = actor.id();
        let mut users = MockUserAdministration::new();
        users
            .expect_delete_user()
            .with(mockall::predicate::always(), eq(actor_id))
            .times(1)
            .return_once(|_, _| Err(Error::forbidden("you cannot delete your own account")));
        let app = actix_test::init_service(test_app(users, actor)).await;
        let cookie = session_cookie(&app, "/test/sign-in").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/admin/users/{actor_id}"))
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn unknown_role_is_rejected() {
        let app = actix_test::init_service(test_app(MockUserAdministration::new(), admin())).await;
        let cookie = session_cookie(&app, "/test/sign-in").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/admin/users/{}/role", PrincipalId::random()))
                .cookie(cookie)
                .set_json(json!({ "role": "owner" }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
