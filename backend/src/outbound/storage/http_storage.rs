//! Reqwest-backed object storage speaking the Supabase storage REST API.
//!
//! Every call authenticates with the service-role key and targets a single
//! bucket. Signed URLs come back relative to `/storage/v1` and are resolved
//! against the configured base before they leave the adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url, header};
use zeroize::Zeroizing;

use super::dto::{ErrorBodyDto, RemoveRequestDto, SignRequestDto, SignResponseDto};
use crate::domain::ports::{ObjectStorage, ObjectStorageError};
use crate::domain::{SignedUrl, StorageKey};
use crate::outbound::http_support::{
    build_client, describe_transport_error, join_segments, status_message,
};

/// Endpoint, bucket and credentials for the object store.
pub struct ObjectStorageConfig {
    pub base_url: Url,
    pub bucket: String,
    pub service_role_key: Zeroizing<String>,
    pub timeout: Duration,
}

pub struct HttpObjectStorage {
    client: reqwest::Client,
    base_url: Url,
    bucket: String,
    service_role_key: Zeroizing<String>,
}

impl HttpObjectStorage {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: ObjectStorageConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(config.timeout)?,
            base_url: config.base_url,
            bucket: config.bucket,
            service_role_key: config.service_role_key,
        })
    }

    fn object_url(&self, action: &[&str], key: Option<&StorageKey>) -> Result<Url, ObjectStorageError> {
        let key_segments = key.map(|key| key.as_str().split('/')).into_iter().flatten();
        join_segments(
            &self.base_url,
            ["storage", "v1", "object"]
                .into_iter()
                .chain(action.iter().copied())
                .chain(std::iter::once(self.bucket.as_str()))
                .chain(key_segments),
        )
        .ok_or_else(|| ObjectStorageError::rejected("storage URL cannot be a base"))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", self.service_role_key.as_str())
            .bearer_auth(self.service_role_key.as_str())
    }

    /// Resolve the relative path returned by the sign endpoint.
    fn absolute_signed_url(&self, relative: &str) -> Result<Url, ObjectStorageError> {
        let mut base = self.base_url.clone();
        let prefix = base.path().trim_end_matches('/').to_owned();
        base.set_path(&format!("{prefix}/storage/v1"));
        let relative = relative.trim_start_matches('/');
        Url::parse(&format!("{base}/{relative}"))
            .map_err(|err| ObjectStorageError::decode(format!("signed URL is not a URL: {err}")))
    }
}

fn map_transport_error(error: reqwest::Error) -> ObjectStorageError {
    ObjectStorageError::transport(describe_transport_error(&error))
}

async fn read_body(response: Response) -> Result<(StatusCode, Vec<u8>), ObjectStorageError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    Ok((status, body.to_vec()))
}

/// The storage API reports missing objects as 400 with a `not_found` body as
/// well as plain 404.
fn is_not_found(status: StatusCode, body: &[u8]) -> bool {
    if status == StatusCode::NOT_FOUND {
        return true;
    }
    if status != StatusCode::BAD_REQUEST {
        return false;
    }
    serde_json::from_slice::<ErrorBodyDto>(body).is_ok_and(|dto| {
        dto.status_code.as_deref() == Some("404")
            || dto
                .error
                .as_deref()
                .is_some_and(|error| error.eq_ignore_ascii_case("not_found"))
    })
}

fn map_status_error(status: StatusCode, body: &[u8], key: &StorageKey) -> ObjectStorageError {
    if is_not_found(status, body) {
        return ObjectStorageError::not_found(key.as_str());
    }
    let message = status_message(status, body);
    if status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
    {
        ObjectStorageError::transport(message)
    } else {
        ObjectStorageError::rejected(message)
    }
}

async fn expect_success(
    response: Response,
    key: &StorageKey,
) -> Result<Vec<u8>, ObjectStorageError> {
    let (status, body) = read_body(response).await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(map_status_error(status, &body, key))
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn put(
        &self,
        key: &StorageKey,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ObjectStorageError> {
        let url = self.object_url(&[], Some(key))?;
        let response = self
            .request(Method::POST, url)
            .header(header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .map_err(map_transport_error)?;
        expect_success(response, key).await.map(|_| ())
    }

    async fn get(&self, key: &StorageKey) -> Result<Vec<u8>, ObjectStorageError> {
        let url = self.object_url(&[], Some(key))?;
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(map_transport_error)?;
        expect_success(response, key).await
    }

    async fn signed_url(
        &self,
        key: &StorageKey,
        expires_in: u32,
    ) -> Result<SignedUrl, ObjectStorageError> {
        let url = self.object_url(&["sign"], Some(key))?;
        let response = self
            .request(Method::POST, url)
            .json(&SignRequestDto { expires_in })
            .send()
            .await
            .map_err(map_transport_error)?;
        let body = expect_success(response, key).await?;
        let dto: SignResponseDto = serde_json::from_slice(&body).map_err(|err| {
            ObjectStorageError::decode(format!("invalid sign response: {err}"))
        })?;
        Ok(SignedUrl {
            url: self.absolute_signed_url(&dto.signed_url)?.to_string(),
            expires_in,
        })
    }

    async fn delete(&self, key: &StorageKey) -> Result<(), ObjectStorageError> {
        let url = self.object_url(&[], None)?;
        let response = self
            .request(Method::DELETE, url)
            .json(&RemoveRequestDto {
                prefixes: [key.as_str()],
            })
            .send()
            .await
            .map_err(map_transport_error)?;
        expect_success(response, key).await.map(|_| ())
    }
}
