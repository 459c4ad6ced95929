//! Authorization gate.
//!
//! One middleware decides, before any handler runs, whether the request's
//! session may reach the route. Decisions come from an ordered route table;
//! the first rule whose method and path pattern match wins.
//!
//! ```text
//! POST /api/auth/login          Public
//! *    /api/admin/*             admin | super_admin
//! GET  /api/universities/{}     Public
//! PUT  /api/universities/{}     admin | super_admin
//! *    /api/<anything else>     Authenticated
//! ```
//!
//! Row ownership (documents, applications) is not decided here; services
//! constrain those queries by owner.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::Method;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use super::session::principal_from_request;
use crate::domain::{ADMIN_ROLES, ContentKind, RequiredAccess};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `{}`: exactly one segment.
    Any,
    /// `*`: zero or more trailing segments.
    Rest,
}

fn parse_pattern(pattern: &str) -> Vec<Segment> {
    pattern
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment {
            "{}" => Segment::Any,
            "*" => Segment::Rest,
            literal => Segment::Literal(literal.to_owned()),
        })
        .collect()
}

fn pattern_matches(pattern: &[Segment], path: &str) -> bool {
    let mut parts = path.split('/').filter(|part| !part.is_empty());
    for segment in pattern {
        match segment {
            Segment::Rest => return true,
            Segment::Any => {
                if parts.next().is_none() {
                    return false;
                }
            }
            Segment::Literal(literal) => {
                if parts.next() != Some(literal.as_str()) {
                    return false;
                }
            }
        }
    }
    parts.next().is_none()
}

#[derive(Debug, Clone)]
struct AccessRule {
    method: Option<Method>,
    pattern: Vec<Segment>,
    access: RequiredAccess,
}

/// Ordered route table mapping method and path to the access it requires.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
}

impl AccessPolicy {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule. `method: None` matches every method.
    #[must_use]
    pub fn rule(mut self, method: Option<Method>, pattern: &str, access: RequiredAccess) -> Self {
        self.rules.push(AccessRule {
            method,
            pattern: parse_pattern(pattern),
            access,
        });
        self
    }

    /// Route table for the whole API.
    pub fn standard() -> Self {
        let staff = RequiredAccess::Roles(ADMIN_ROLES);
        let policy = Self::new()
            .rule(Some(Method::POST), "/api/auth/login", RequiredAccess::Public)
            .rule(Some(Method::POST), "/api/auth/register", RequiredAccess::Public)
            .rule(Some(Method::POST), "/api/auth/logout", RequiredAccess::Public)
            .rule(Some(Method::GET), "/api/auth/session", RequiredAccess::Authenticated)
            .rule(Some(Method::POST), "/api/contact", RequiredAccess::Public)
            .rule(None, "/api/admin/*", staff)
            .rule(None, "/api/applications/*", RequiredAccess::Authenticated)
            .rule(None, "/api/documents/*", RequiredAccess::Authenticated);
        ContentKind::ALL.iter().fold(policy, |policy, kind| {
            let collection = format!("/api/{}", kind.slug());
            policy
                .rule(Some(Method::GET), &collection, RequiredAccess::Public)
                .rule(Some(Method::GET), &format!("{collection}/{{}}"), RequiredAccess::Public)
                .rule(None, &format!("{collection}/*"), staff)
        })
    }

    /// Access required for a request. Unlisted `/api` routes need a session;
    /// everything outside `/api` (health checks and API docs) is public.
    pub fn required_for(&self, method: &Method, path: &str) -> RequiredAccess {
        self.rules
            .iter()
            .find(|rule| {
                rule.method.as_ref().is_none_or(|wanted| wanted == method)
                    && pattern_matches(&rule.pattern, path)
            })
            .map(|rule| rule.access)
            .unwrap_or_else(|| {
                if pattern_matches(&parse_pattern("/api/*"), path) {
                    RequiredAccess::Authenticated
                } else {
                    RequiredAccess::Public
                }
            })
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Middleware enforcing an [`AccessPolicy`]. Must be wrapped inside the
/// session middleware so the cookie is readable.
///
/// ```
/// use actix_web::App;
/// use abroad::inbound::http::authorization::{AccessPolicy, Authorize};
///
/// let app = App::new().wrap(Authorize::new(AccessPolicy::standard()));
/// ```
#[derive(Clone)]
pub struct Authorize {
    policy: Rc<AccessPolicy>,
}

impl Authorize {
    pub fn new(policy: AccessPolicy) -> Self {
        Self {
            policy: Rc::new(policy),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Authorize
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = AuthorizeMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthorizeMiddleware {
            service,
            policy: Rc::clone(&self.policy),
        }))
    }
}

pub struct AuthorizeMiddleware<S> {
    service: S,
    policy: Rc<AccessPolicy>,
}

impl<S, B> Service<ServiceRequest> for AuthorizeMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Match on the decoded path the router resolves, not the raw URI.
        let path = req.match_info().as_str().to_owned();
        let access = self.policy.required_for(req.method(), &path);
        let decision = match access {
            RequiredAccess::Public => Ok(()),
            _ => principal_from_request(&req)
                .and_then(|principal| access.authorize(principal.as_ref())),
        };
        if let Err(error) = decision {
            debug!(
                method = %req.method(),
                path = %path,
                code = ?error.code(),
                "request denied by authorization gate"
            );
            let denied = req.error_response(error).map_into_right_body();
            return Box::pin(ready(Ok(denied)));
        }
        let response = self.service.call(req);
        Box::pin(async move { response.await.map(ServiceResponse::map_into_left_body) })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test, web};
    use rstest::rstest;

    use super::*;
    use crate::domain::test_fixtures::principal_with_role;
    use crate::domain::{Error, Role};
    use crate::inbound::http::session::SessionContext;
    use crate::inbound::http::session_config::SESSION_COOKIE_NAME;
    use crate::inbound::http::test_utils::test_session_middleware;

    #[rstest]
    #[case(Method::POST, "/api/auth/login", RequiredAccess::Public)]
    #[case(Method::GET, "/api/auth/session", RequiredAccess::Authenticated)]
    #[case(Method::POST, "/api/contact", RequiredAccess::Public)]
    #[case(Method::GET, "/api/admin/users", RequiredAccess::Roles(ADMIN_ROLES))]
    #[case(Method::DELETE, "/api/admin/contact/5", RequiredAccess::Roles(ADMIN_ROLES))]
    #[case(Method::GET, "/api/applications", RequiredAccess::Authenticated)]
    #[case(Method::PATCH, "/api/applications/7", RequiredAccess::Authenticated)]
    #[case(Method::POST, "/api/documents/upload", RequiredAccess::Authenticated)]
    #[case(Method::GET, "/api/programs", RequiredAccess::Public)]
    #[case(Method::GET, "/api/programs/42/", RequiredAccess::Public)]
    #[case(Method::POST, "/api/programs", RequiredAccess::Roles(ADMIN_ROLES))]
    #[case(Method::PUT, "/api/faqs/9", RequiredAccess::Roles(ADMIN_ROLES))]
    #[case(Method::GET, "/api/unknown", RequiredAccess::Authenticated)]
    #[case(Method::GET, "/health/ready", RequiredAccess::Public)]
    fn standard_table_resolves(
        #[case] method: Method,
        #[case] path: &str,
        #[case] expected: RequiredAccess,
    ) {
        assert_eq!(AccessPolicy::standard().required_for(&method, path), expected);
    }

    #[rstest]
    #[case("/api/programs/{}", "/api/programs", false)]
    #[case("/api/programs/{}", "/api/programs/1/extra", false)]
    #[case("/api/admin/*", "/api/admin", true)]
    #[case("/api/admin/*", "/api/administrators", false)]
    fn patterns_match_whole_segments(
        #[case] pattern: &str,
        #[case] path: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(pattern_matches(&parse_pattern(pattern), path), expected);
    }

    async fn sign_in(session: SessionContext, role: web::Path<String>) -> Result<HttpResponse, Error> {
        let role = role
            .parse::<Role>()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        session.persist_principal(&principal_with_role(role))?;
        Ok(HttpResponse::Ok().finish())
    }

    async fn gated_status(role: Option<&str>, method: Method, path: &str) -> StatusCode {
        let app = actix_test::init_service(
            App::new()
                .wrap(Authorize::new(AccessPolicy::standard()))
                .wrap(test_session_middleware())
                .route("/test/sign-in/{role}", web::get().to(sign_in))
                .default_service(web::to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;
        let mut request = actix_test::TestRequest::default().method(method).uri(path);
        if let Some(role) = role {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::get()
                    .uri(&format!("/test/sign-in/{role}"))
                    .to_request(),
            )
            .await;
            let cookie = res
                .response()
                .cookies()
                .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
                .expect("session cookie")
                .into_owned();
            request = request.cookie(cookie);
        }
        actix_test::call_service(&app, request.to_request()).await.status()
    }

    #[rstest]
    #[case(None, Method::GET, "/api/admin/users", StatusCode::UNAUTHORIZED)]
    #[case(Some("user"), Method::GET, "/api/admin/users", StatusCode::FORBIDDEN)]
    #[case(Some("user"), Method::POST, "/api/universities", StatusCode::FORBIDDEN)]
    #[case(Some("admin"), Method::POST, "/api/universities", StatusCode::OK)]
    #[case(Some("super_admin"), Method::DELETE, "/api/admin/users/1", StatusCode::OK)]
    #[case(None, Method::GET, "/api/universities", StatusCode::OK)]
    #[case(None, Method::GET, "/api/documents", StatusCode::UNAUTHORIZED)]
    #[case(Some("user"), Method::GET, "/api/documents", StatusCode::OK)]
    #[case(Some("user"), Method::GET, "/api/%61dmin/users", StatusCode::FORBIDDEN)]
    #[case(Some("user"), Method::POST, "/api/%75niversities", StatusCode::FORBIDDEN)]
    #[case(None, Method::DELETE, "/api/%70rograms/3", StatusCode::UNAUTHORIZED)]
    #[actix_web::test]
    async fn gate_enforces_role_matrix(
        #[case] role: Option<&str>,
        #[case] method: Method,
        #[case] path: &str,
        #[case] expected: StatusCode,
    ) {
        assert_eq!(gated_status(role, method, path).await, expected);
    }
}
