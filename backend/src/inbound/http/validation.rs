//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper produces an `invalid_request` error whose `details` name the
//! offending field and a stable code.

use serde_json::json;
use uuid::Uuid;

use crate::domain::{CredentialValidationError, Error};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }

    fn with_index(self, code: ErrorCode, index: usize, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "index": index,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_value_error(field: FieldName, value: &str, expected: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be one of {expected}"))
        .with_value(ErrorCode::InvalidValue, value)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

fn invalid_uuid_index_error(field: FieldName, index: usize, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must contain valid UUIDs")).with_index(
        ErrorCode::InvalidUuid,
        index,
        value,
    )
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value.trim()).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_uuid_list(values: &[String], field: FieldName) -> Result<Vec<Uuid>, Error> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            Uuid::parse_str(value.trim())
                .map_err(|_| invalid_uuid_index_error(field, index, value))
        })
        .collect()
}

/// Map login or registration validation failures.
pub(crate) fn credential_error(error: &CredentialValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field(),
        "code": error.code(),
    }))
}
