//! Student applications and their review status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PrincipalId;

/// Review status of an application.
///
/// Staff may move an application between any two statuses; the only side
/// effect is stamping `submitted_at` the first time it becomes `Submitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Draft,
    Submitted,
    UnderReview,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::UnderReview => "under_review",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status: {0}")]
pub struct UnknownApplicationStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = UnknownApplicationStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "submitted" => Ok(Self::Submitted),
            "under_review" => Ok(Self::UnderReview),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownApplicationStatus(other.to_owned())),
        }
    }
}

/// Validation failures for application payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplicationValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
}

/// A stored application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Application {
    pub id: Uuid,
    pub owner_id: PrincipalId,
    pub university_name: String,
    pub program_name: String,
    pub program_level: Option<String>,
    pub intake: Option<String>,
    pub notes: Option<String>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Application {
    /// Start a new draft owned by `owner_id`.
    pub fn draft(owner_id: PrincipalId, draft: ApplicationDraft, now: DateTime<Utc>) -> Self {
        let ApplicationDraft {
            university_name,
            program_name,
            program_level,
            intake,
            notes,
        } = draft;
        Self {
            id: Uuid::new_v4(),
            owner_id,
            university_name,
            program_name,
            program_level,
            intake,
            notes,
            status: ApplicationStatus::Draft,
            created_at: now,
            updated_at: now,
            submitted_at: None,
        }
    }

    /// Apply a patch; callers must already have checked who may change status.
    pub fn apply(&mut self, patch: ApplicationPatch, now: DateTime<Utc>) {
        let ApplicationPatch {
            university_name,
            program_name,
            program_level,
            intake,
            notes,
            status,
        } = patch;
        if let Some(value) = university_name {
            self.university_name = value;
        }
        if let Some(value) = program_name {
            self.program_name = value;
        }
        if let Some(value) = program_level {
            self.program_level = Some(value);
        }
        if let Some(value) = intake {
            self.intake = Some(value);
        }
        if let Some(value) = notes {
            self.notes = Some(value);
        }
        if let Some(status) = status {
            self.status = status;
            if status == ApplicationStatus::Submitted && self.submitted_at.is_none() {
                self.submitted_at = Some(now);
            }
        }
        self.updated_at = now;
    }
}

fn required(value: String, field: &'static str) -> Result<String, ApplicationValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ApplicationValidationError::EmptyField { field })
    } else {
        Ok(trimmed.to_owned())
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

/// Validated input for a new application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationDraft {
    pub university_name: String,
    pub program_name: String,
    pub program_level: Option<String>,
    pub intake: Option<String>,
    pub notes: Option<String>,
}

impl ApplicationDraft {
    pub fn try_new(
        university_name: String,
        program_name: String,
        program_level: Option<String>,
        intake: Option<String>,
        notes: Option<String>,
    ) -> Result<Self, ApplicationValidationError> {
        Ok(Self {
            university_name: required(university_name, "university_name")?,
            program_name: required(program_name, "program_name")?,
            program_level: optional(program_level),
            intake: optional(intake),
            notes: optional(notes),
        })
    }
}

/// Partial update to an application.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApplicationPatch {
    pub university_name: Option<String>,
    pub program_name: Option<String>,
    pub program_level: Option<String>,
    pub intake: Option<String>,
    pub notes: Option<String>,
    pub status: Option<ApplicationStatus>,
}

impl ApplicationPatch {
    /// Normalise text fields, rejecting blank required names.
    pub fn normalised(self) -> Result<Self, ApplicationValidationError> {
        Ok(Self {
            university_name: self
                .university_name
                .map(|value| required(value, "university_name"))
                .transpose()?,
            program_name: self
                .program_name
                .map(|value| required(value, "program_name"))
                .transpose()?,
            program_level: optional(self.program_level),
            intake: optional(self.intake),
            notes: optional(self.notes),
            status: self.status,
        })
    }

    /// Whether the patch changes review status.
    pub fn changes_status(&self) -> bool {
        self.status.is_some()
    }
}
