//! HTTP inbound adapter exposing REST endpoints.
//!
//! Handlers translate requests into calls on the driving ports held in
//! [`state::HttpState`]. Role checks live in [`authorization`], not in the
//! handlers themselves.

pub mod admin_users;
pub mod applications;
pub mod auth;
pub mod authorization;
pub mod contact;
pub mod content;
pub mod documents;
pub mod error;
pub mod health;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api` handler on `cfg`.
///
/// Content routes are registered last: `/{kind}` and `/{kind}/{id}` would
/// otherwise shadow the fixed `/auth`, `/documents` and `/admin` paths.
///
/// ```
/// use actix_web::{App, web};
///
/// let app = App::new().service(web::scope("/api").configure(abroad::inbound::http::configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::register)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::current_session)
        .service(applications::list_own_applications)
        .service(applications::create_application)
        .service(applications::get_application)
        .service(applications::update_application)
        .service(applications::delete_application)
        .service(applications::list_all_applications)
        .service(documents::upload_document)
        .service(documents::list_own_documents)
        .service(documents::sign_document)
        .service(documents::delete_document)
        .service(documents::list_user_documents)
        .service(documents::download_documents)
        .service(contact::submit_contact)
        .service(contact::list_contact)
        .service(contact::update_contact_status)
        .service(contact::delete_contact)
        .service(admin_users::list_users)
        .service(admin_users::change_user_role)
        .service(admin_users::delete_user)
        .service(content::list_content)
        .service(content::get_content)
        .service(content::create_content)
        .service(content::update_content)
        .service(content::delete_content);
}
