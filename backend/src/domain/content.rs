//! Public informational content managed from the back office.
//!
//! Every content type shares one shape: a typed [`ContentKind`] plus a JSON
//! object of attributes. Each kind names the attributes it cannot live
//! without; everything else is free-form, including array-valued fields.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// The eleven content families exposed under `/api/<slug>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind {
    Universities,
    Programs,
    Scholarships,
    Rankings,
    Destinations,
    VisaGuides,
    Faqs,
    Resources,
    CountryRequirements,
    InterviewTips,
    PostArrivalGuides,
}

impl ContentKind {
    /// Every kind, in route registration order.
    pub const ALL: [Self; 11] = [
        Self::Universities,
        Self::Programs,
        Self::Scholarships,
        Self::Rankings,
        Self::Destinations,
        Self::VisaGuides,
        Self::Faqs,
        Self::Resources,
        Self::CountryRequirements,
        Self::InterviewTips,
        Self::PostArrivalGuides,
    ];

    /// URL segment and storage discriminator.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Universities => "universities",
            Self::Programs => "programs",
            Self::Scholarships => "scholarships",
            Self::Rankings => "rankings",
            Self::Destinations => "destinations",
            Self::VisaGuides => "visa-guides",
            Self::Faqs => "faqs",
            Self::Resources => "resources",
            Self::CountryRequirements => "country-requirements",
            Self::InterviewTips => "interview-tips",
            Self::PostArrivalGuides => "post-arrival-guides",
        }
    }

    /// Attributes that must be present and non-empty on create.
    pub fn required_attributes(self) -> &'static [&'static str] {
        match self {
            Self::Universities => &["name", "country"],
            Self::Programs => &["university_id", "name", "level"],
            Self::Scholarships => &["name"],
            Self::Rankings => &["university_name", "rank"],
            Self::Destinations => &["country"],
            Self::VisaGuides => &["country", "title"],
            Self::Faqs => &["question", "answer"],
            Self::CountryRequirements => &["country"],
            Self::Resources | Self::InterviewTips | Self::PostArrivalGuides => &["title"],
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Error returned for an unknown content slug.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown content kind: {0}")]
pub struct UnknownContentKind(pub String);

impl FromStr for ContentKind {
    type Err = UnknownContentKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| UnknownContentKind(s.to_owned()))
    }
}

/// Keys managed by the store and ignored in request bodies.
const RESERVED_KEYS: [&str; 3] = ["id", "created_at", "updated_at"];

/// Validation failures for content payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentValidationError {
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
    #[error("field {field} must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}

fn strip_reserved(mut attributes: Map<String, Value>) -> Map<String, Value> {
    for key in RESERVED_KEYS {
        attributes.remove(key);
    }
    attributes
}

fn into_object(body: Value) -> Result<Map<String, Value>, ContentValidationError> {
    match body {
        Value::Object(map) => Ok(strip_reserved(map)),
        _ => Err(ContentValidationError::NotAnObject),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

/// Identity of a program for duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramKey {
    pub university_id: Uuid,
    pub name: String,
    pub level: String,
}

impl ProgramKey {
    /// Extract the key from validated program attributes.
    pub fn from_attributes(attributes: &Map<String, Value>) -> Result<Self, ContentValidationError> {
        let university_id = attributes
            .get("university_id")
            .and_then(Value::as_str)
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
            .ok_or(ContentValidationError::InvalidField {
                field: "university_id",
                expected: "a UUID string",
            })?;
        let name = text_field(attributes, "name")?;
        let level = text_field(attributes, "level")?;
        Ok(Self {
            university_id,
            name,
            level,
        })
    }

    /// JSON object used for containment lookups.
    pub fn as_attributes(&self) -> Value {
        serde_json::json!({
            "university_id": self.university_id.to_string(),
            "name": self.name,
            "level": self.level,
        })
    }
}

fn text_field(
    attributes: &Map<String, Value>,
    field: &'static str,
) -> Result<String, ContentValidationError> {
    attributes
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(ContentValidationError::InvalidField {
            field,
            expected: "a string",
        })
}

/// Validated payload for creating a content entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentDraft {
    kind: ContentKind,
    attributes: Map<String, Value>,
}

impl ContentDraft {
    /// Validate a request body for `kind`.
    ///
    /// # Examples
    /// ```
    /// use abroad::domain::{ContentDraft, ContentKind};
    /// use serde_json::json;
    ///
    /// let draft = ContentDraft::try_new(
    ///     ContentKind::Faqs,
    ///     json!({ "id": "ignored", "question": "When?", "answer": "Now" }),
    /// )
    /// .expect("valid faq");
    /// assert!(draft.attributes().get("id").is_none());
    /// ```
    pub fn try_new(kind: ContentKind, body: Value) -> Result<Self, ContentValidationError> {
        let mut attributes = into_object(body)?;
        for &field in kind.required_attributes() {
            match attributes.get(field) {
                Some(value) if !is_blank(value) => {}
                _ => return Err(ContentValidationError::MissingField { field }),
            }
        }
        if kind == ContentKind::Programs {
            // Stored rows hold the canonical hyphenated lowercase id.
            let key = ProgramKey::from_attributes(&attributes)?;
            attributes.insert(
                "university_id".to_owned(),
                Value::String(key.university_id.to_string()),
            );
        }
        Ok(Self { kind, attributes })
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Program identity, present only for [`ContentKind::Programs`].
    pub fn program_key(&self) -> Option<ProgramKey> {
        if self.kind == ContentKind::Programs {
            ProgramKey::from_attributes(&self.attributes).ok()
        } else {
            None
        }
    }
}

/// Shallow patch applied to an existing entry's attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentPatch {
    attributes: Map<String, Value>,
}

impl ContentPatch {
    pub fn try_new(body: Value) -> Result<Self, ContentValidationError> {
        Ok(Self {
            attributes: into_object(body)?,
        })
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Merge the patch over `current`; top-level keys are replaced wholesale.
    pub fn apply(&self, current: &Map<String, Value>) -> Map<String, Value> {
        let mut merged = current.clone();
        for (key, value) in &self.attributes {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}

/// A stored content entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentEntry {
    pub id: Uuid,
    pub kind: ContentKind,
    pub attributes: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentEntry {
    /// Owning university id when this entry is a program.
    pub fn university_id(&self) -> Option<Uuid> {
        if self.kind != ContentKind::Programs {
            return None;
        }
        self.attributes
            .get("university_id")
            .and_then(Value::as_str)
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
    }
}

/// Read model returned to clients; programs carry their university.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentView {
    pub entry: ContentEntry,
    pub university: Option<ContentEntry>,
}
