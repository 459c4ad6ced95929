//! Domain errors as HTTP responses.
//!
//! Every failure leaves the API as the same envelope:
//!
//! ```text
//! 409 Conflict
//! trace-id: 3fa85f64-...
//! {"error":"program already exists","code":"conflict","traceId":"3fa85f64-...","details":{...}}
//! ```
//!
//! Internal errors keep only their trace id; message and details stay in the
//! server log.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

pub use crate::domain::ApiResult;

const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::UpstreamFailure => StatusCode::BAD_GATEWAY,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The body clients see for `error`.
fn public_view(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    let redacted = Error::internal("Internal server error");
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, id));
        }
        response.json(public_view(self))
    }
}

/// Framework errors reaching a handler are reported as internal.
impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "framework error surfaced as internal error");
        Self::internal("Internal server error")
    }
}

#[cfg(test)]
mod tests;
