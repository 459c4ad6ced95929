//! Reqwest-backed identity provider speaking the GoTrue REST API.
//!
//! Sign-in uses the password grant with the public anon key. Account
//! administration uses the admin endpoints with the service-role key, which
//! must never reach a browser.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use zeroize::Zeroizing;

use super::dto::{
    CreateUserDto, PasswordGrantDto, RoleOnlyDto, RoleUpdateDto, TokenResponseDto, UserDto,
    UserListDto, UserMetadataDto,
};
use crate::domain::ports::{IdentityProvider, IdentityProviderError};
use crate::domain::{LoginCredentials, Principal, PrincipalId, Registration, Role};
use crate::outbound::http_support::{
    build_client, describe_transport_error, join_segments, status_message,
};

const USERS_PER_PAGE: usize = 200;

/// Keys and endpoint for the identity provider.
pub struct IdentityProviderConfig {
    pub base_url: Url,
    pub anon_key: Zeroizing<String>,
    pub service_role_key: Zeroizing<String>,
    pub timeout: Duration,
}

pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: Url,
    anon_key: Zeroizing<String>,
    service_role_key: Zeroizing<String>,
}

impl HttpIdentityProvider {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: IdentityProviderConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(config.timeout)?,
            base_url: config.base_url,
            anon_key: config.anon_key,
            service_role_key: config.service_role_key,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, IdentityProviderError> {
        join_segments(
            &self.base_url,
            ["auth", "v1"].into_iter().chain(segments.iter().copied()),
        )
        .ok_or_else(|| IdentityProviderError::rejected("identity provider URL cannot be a base"))
    }

    fn admin(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, IdentityProviderError> {
        let url = self.endpoint(&[&["admin", "users"], segments].concat())?;
        Ok(self
            .client
            .request(method, url)
            .header("apikey", self.service_role_key.as_str())
            .bearer_auth(self.service_role_key.as_str()))
    }
}

fn map_transport_error(error: reqwest::Error) -> IdentityProviderError {
    IdentityProviderError::transport(describe_transport_error(&error))
}

async fn read_body(response: Response) -> Result<(StatusCode, Vec<u8>), IdentityProviderError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    Ok((status, body.to_vec()))
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, IdentityProviderError> {
    serde_json::from_slice(body).map_err(|err| {
        IdentityProviderError::decode(format!("invalid identity provider payload: {err}"))
    })
}

/// Map an unsuccessful status that no caller handled specifically.
fn map_status_error(status: StatusCode, body: &[u8]) -> IdentityProviderError {
    let message = status_message(status, body);
    if status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
    {
        IdentityProviderError::transport(message)
    } else {
        IdentityProviderError::rejected(message)
    }
}

fn map_sign_in_status(status: StatusCode, body: &[u8]) -> IdentityProviderError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
            IdentityProviderError::invalid_credentials()
        }
        _ => map_status_error(status, body),
    }
}

fn map_create_status(status: StatusCode, body: &[u8], email: &str) -> IdentityProviderError {
    match status {
        StatusCode::UNPROCESSABLE_ENTITY | StatusCode::CONFLICT => {
            IdentityProviderError::already_registered(email)
        }
        _ => map_status_error(status, body),
    }
}

fn map_user_status(status: StatusCode, body: &[u8], id: PrincipalId) -> IdentityProviderError {
    match status {
        StatusCode::NOT_FOUND => IdentityProviderError::unknown_user(id.to_string()),
        _ => map_status_error(status, body),
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Principal, IdentityProviderError> {
        let mut url = self.endpoint(&["token"])?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let response = self
            .client
            .post(url)
            .header("apikey", self.anon_key.as_str())
            .json(&PasswordGrantDto {
                email: credentials.email(),
                password: credentials.password(),
            })
            .send()
            .await
            .map_err(map_transport_error)?;
        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            return Err(map_sign_in_status(status, &body));
        }
        Ok(decode::<TokenResponseDto>(&body)?.user.into_principal())
    }

    async fn create_user(
        &self,
        registration: &Registration,
    ) -> Result<Principal, IdentityProviderError> {
        let response = self
            .admin(Method::POST, &[])?
            .json(&CreateUserDto {
                email: registration.email(),
                password: registration.password(),
                email_confirm: true,
                user_metadata: UserMetadataDto {
                    role: registration.role().as_str(),
                    full_name: registration.full_name(),
                },
            })
            .send()
            .await
            .map_err(map_transport_error)?;
        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            return Err(map_create_status(status, &body, registration.email()));
        }
        Ok(decode::<UserDto>(&body)?.into_principal())
    }

    async fn find_user(
        &self,
        id: PrincipalId,
    ) -> Result<Option<Principal>, IdentityProviderError> {
        let segment = id.to_string();
        let response = self
            .admin(Method::GET, &[segment.as_str()])?
            .send()
            .await
            .map_err(map_transport_error)?;
        let (status, body) = read_body(response).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        Ok(Some(decode::<UserDto>(&body)?.into_principal()))
    }

    async fn list_users(&self) -> Result<Vec<Principal>, IdentityProviderError> {
        let mut principals = Vec::new();
        for page in 1.. {
            let response = self
                .admin(Method::GET, &[])?
                .query(&[("page", page), ("per_page", USERS_PER_PAGE)])
                .send()
                .await
                .map_err(map_transport_error)?;
            let (status, body) = read_body(response).await?;
            if !status.is_success() {
                return Err(map_status_error(status, &body));
            }
            let users = decode::<UserListDto>(&body)?.users;
            let fetched = users.len();
            principals.extend(users.into_iter().map(UserDto::into_principal));
            if fetched < USERS_PER_PAGE {
                break;
            }
        }
        Ok(principals)
    }

    async fn update_role(
        &self,
        id: PrincipalId,
        role: Role,
    ) -> Result<Principal, IdentityProviderError> {
        let segment = id.to_string();
        let response = self
            .admin(Method::PUT, &[segment.as_str()])?
            .json(&RoleUpdateDto {
                user_metadata: RoleOnlyDto {
                    role: role.as_str(),
                },
            })
            .send()
            .await
            .map_err(map_transport_error)?;
        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            return Err(map_user_status(status, &body, id));
        }
        Ok(decode::<UserDto>(&body)?.into_principal())
    }

    async fn delete_user(&self, id: PrincipalId) -> Result<(), IdentityProviderError> {
        let segment = id.to_string();
        let response = self
            .admin(Method::DELETE, &[segment.as_str()])?
            .send()
            .await
            .map_err(map_transport_error)?;
        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            return Err(map_user_status(status, &body, id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for the non-network mapping helpers.

    use super::*;
    use rstest::rstest;

    fn provider(base: &str) -> HttpIdentityProvider {
        HttpIdentityProvider::new(IdentityProviderConfig {
            base_url: Url::parse(base).expect("valid url"),
            anon_key: Zeroizing::new("anon".to_owned()),
            service_role_key: Zeroizing::new("service".to_owned()),
            timeout: Duration::from_secs(5),
        })
        .expect("client builds")
    }

    #[rstest]
    #[case(StatusCode::BAD_REQUEST)]
    #[case(StatusCode::UNAUTHORIZED)]
    fn rejected_password_grant_is_invalid_credentials(#[case] status: StatusCode) {
        let error = map_sign_in_status(
            status,
            br#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(error, IdentityProviderError::invalid_credentials());
    }

    #[rstest]
    #[case(StatusCode::SERVICE_UNAVAILABLE, true)]
    #[case(StatusCode::TOO_MANY_REQUESTS, true)]
    #[case(StatusCode::FORBIDDEN, false)]
    fn unhandled_statuses_split_transport_and_rejection(
        #[case] status: StatusCode,
        #[case] transport: bool,
    ) {
        let error = map_status_error(status, b"");
        assert_eq!(
            matches!(error, IdentityProviderError::Transport { .. }),
            transport
        );
    }

    #[test]
    fn duplicate_email_maps_to_already_registered() {
        let error = map_create_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            br#"{"code":422,"error_code":"email_exists"}"#,
            "a@x.com",
        );
        assert_eq!(error, IdentityProviderError::already_registered("a@x.com"));
    }

    #[test]
    fn admin_endpoints_nest_under_auth_v1() {
        let provider = provider("https://project.supabase.co");
        let url = provider
            .endpoint(&["admin", "users", "abc"])
            .expect("endpoint");
        assert_eq!(url.as_str(), "https://project.supabase.co/auth/v1/admin/users/abc");
    }
}
