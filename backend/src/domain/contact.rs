//! Messages submitted through the public contact form.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Triage state of a contact message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    #[default]
    New,
    InProgress,
    Resolved,
}

impl ContactStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown contact status: {0}")]
pub struct UnknownContactStatus(pub String);

impl FromStr for ContactStatus {
    type Err = UnknownContactStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "in_progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            other => Err(UnknownContactStatus(other.to_owned())),
        }
    }
}

const MAX_MESSAGE_CHARS: usize = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("email must be a valid address")]
    MalformedEmail,
    #[error("message must be at most {MAX_MESSAGE_CHARS} characters")]
    MessageTooLong,
}

/// Validated contact form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

impl ContactDraft {
    pub fn try_new(
        name: &str,
        email: &str,
        subject: Option<&str>,
        message: &str,
    ) -> Result<Self, ContactValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ContactValidationError::EmptyField { field: "name" });
        }
        let email = email.trim();
        if email.is_empty() {
            return Err(ContactValidationError::EmptyField { field: "email" });
        }
        if !email.contains('@') {
            return Err(ContactValidationError::MalformedEmail);
        }
        let message = message.trim();
        if message.is_empty() {
            return Err(ContactValidationError::EmptyField { field: "message" });
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(ContactValidationError::MessageTooLong);
        }
        Ok(Self {
            name: name.to_owned(),
            email: email.to_owned(),
            subject: subject
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_owned),
            message: message.to_owned(),
        })
    }
}

/// A stored contact message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContactMessage {
    pub fn received(draft: ContactDraft, now: DateTime<Utc>) -> Self {
        let ContactDraft {
            name,
            email,
            subject,
            message,
        } = draft;
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            subject,
            message,
            status: ContactStatus::New,
            created_at: now,
            updated_at: now,
        }
    }
}
