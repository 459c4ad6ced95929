//! Envelope and status mapping for API errors.

use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;

const TRACE: &str = "9f1c2a4e-0000-4000-8000-000000000001";

async fn render(error: &Error) -> (StatusCode, Option<String>, Value) {
    let response = error.error_response();
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body()).await.expect("error body");
    let body = serde_json::from_slice(&bytes).expect("error body is JSON");
    (status, header, body)
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("who"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("no"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("gone"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("taken"), StatusCode::CONFLICT)]
#[case(Error::upstream("storage down"), StatusCode::BAD_GATEWAY)]
#[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn every_code_has_a_status(#[case] error: Error, #[case] expected: StatusCode) {
    assert_eq!(error.status_code(), expected);
}

#[actix_web::test]
async fn conflict_envelope_carries_trace_and_details() {
    let error = Error::conflict("program already exists")
        .with_trace_id(TRACE)
        .with_details(json!({ "field": "name" }));

    let (status, header, body) = render(&error).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(header.as_deref(), Some(TRACE));
    assert_eq!(
        body,
        json!({
            "error": "program already exists",
            "code": "conflict",
            "traceId": TRACE,
            "details": { "field": "name" },
        })
    );
}

#[actix_web::test]
async fn internal_errors_keep_only_the_trace_id() {
    let error = Error::internal("pool exhausted while reading documents")
        .with_trace_id(TRACE)
        .with_details(json!({ "query": "select" }));

    let (status, header, body) = render(&error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(TRACE));
    assert_eq!(body["error"], "Internal server error");
    assert_eq!(body["traceId"], TRACE);
    assert!(body.get("details").is_none());
}

#[actix_web::test]
async fn untraced_errors_omit_header_and_field() {
    let (_, header, body) = render(&Error::not_found("document not found")).await;

    assert!(header.is_none());
    assert!(body.get("traceId").is_none());
    assert_eq!(body["code"], "not_found");
}

#[test]
fn framework_errors_become_internal() {
    let err: Error = actix_web::error::ErrorPayloadTooLarge("too big").into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
}
