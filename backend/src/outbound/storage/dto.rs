//! Wire shapes for the storage REST API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SignRequestDto {
    pub(super) expires_in: u32,
}

#[derive(Debug, Deserialize)]
pub(super) struct SignResponseDto {
    #[serde(rename = "signedURL", alias = "signedUrl")]
    pub(super) signed_url: String,
}

#[derive(Debug, Serialize)]
pub(super) struct RemoveRequestDto<'a> {
    pub(super) prefixes: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBodyDto {
    #[serde(default)]
    pub(super) error: Option<String>,
    #[serde(default, rename = "statusCode")]
    pub(super) status_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_request_uses_camel_case() {
        let body = serde_json::to_string(&SignRequestDto { expires_in: 60 }).expect("encode");
        assert_eq!(body, r#"{"expiresIn":60}"#);
    }

    #[test]
    fn sign_response_accepts_either_spelling() {
        let upper: SignResponseDto =
            serde_json::from_str(r#"{"signedURL":"/object/sign/documents/a?token=t"}"#)
                .expect("decode");
        let lower: SignResponseDto =
            serde_json::from_str(r#"{"signedUrl":"/object/sign/documents/a?token=t"}"#)
                .expect("decode");
        assert_eq!(upper.signed_url, lower.signed_url);
    }
}
