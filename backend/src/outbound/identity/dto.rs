//! Wire shapes for the GoTrue-compatible auth API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::{Principal, PrincipalId, Role};

#[derive(Debug, Serialize)]
pub(super) struct PasswordGrantDto<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponseDto {
    pub(super) user: UserDto,
}

#[derive(Debug, Serialize)]
pub(super) struct UserMetadataDto<'a> {
    pub(super) role: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) full_name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateUserDto<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
    pub(super) email_confirm: bool,
    pub(super) user_metadata: UserMetadataDto<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct RoleUpdateDto<'a> {
    pub(super) user_metadata: RoleOnlyDto<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct RoleOnlyDto<'a> {
    pub(super) role: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserListDto {
    #[serde(default)]
    pub(super) users: Vec<UserDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserDto {
    pub(super) id: Uuid,
    #[serde(default)]
    pub(super) email: Option<String>,
    #[serde(default)]
    pub(super) user_metadata: Map<String, Value>,
    #[serde(default)]
    pub(super) app_metadata: Map<String, Value>,
}

impl UserDto {
    fn metadata_str(&self, key: &str) -> Option<&str> {
        self.user_metadata
            .get(key)
            .or_else(|| self.app_metadata.get(key))
            .and_then(Value::as_str)
    }

    /// Role defaults to `user` when the metadata is missing or unknown.
    pub(super) fn into_principal(self) -> Principal {
        let role = Role::from_metadata(self.metadata_str("role"));
        let display_name = self
            .metadata_str("full_name")
            .or_else(|| self.metadata_str("name"))
            .map(str::to_owned);
        Principal::new(
            PrincipalId::from_uuid(self.id),
            self.email.unwrap_or_default(),
            display_name,
            role,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(r#"{"role":"admin","full_name":"Grace"}"#, Role::Admin, Some("Grace"))]
    #[case(r#"{"role":"headmaster"}"#, Role::User, None)]
    #[case("{}", Role::User, None)]
    fn metadata_decodes_role_and_name(
        #[case] metadata: &str,
        #[case] role: Role,
        #[case] name: Option<&str>,
    ) {
        let body = format!(
            r#"{{"id":"6f1c1f9e-4f7a-4a43-9d65-2d5a0f3f9d10","email":"g@x.com","user_metadata":{metadata}}}"#
        );
        let user: UserDto = serde_json::from_str(&body).expect("user json");

        let principal = user.into_principal();

        assert_eq!(principal.role(), role);
        assert_eq!(principal.display_name(), name);
        assert_eq!(principal.email(), "g@x.com");
    }

    #[test]
    fn app_metadata_role_is_a_fallback() {
        let user: UserDto = serde_json::from_str(
            r#"{"id":"6f1c1f9e-4f7a-4a43-9d65-2d5a0f3f9d10","app_metadata":{"role":"super_admin"}}"#,
        )
        .expect("user json");

        assert_eq!(user.into_principal().role(), Role::SuperAdmin);
    }
}
