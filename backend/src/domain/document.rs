//! Uploaded documents and their object-storage keys.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::PrincipalId;

/// Lifetime of signed download URLs, in seconds.
pub const SIGNED_URL_TTL_SECS: u32 = 60;

/// Default upper bound on a single upload.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const MAX_NAME_CHARS: usize = 120;
const FALLBACK_NAME: &str = "document";
const OCTET_STREAM: &str = "application/octet-stream";

/// Object-storage key of the form `{owner}/{uuid}-{sanitised name}`.
///
/// # Examples
/// ```
/// use abroad::domain::{PrincipalId, StorageKey};
///
/// let owner = PrincipalId::random();
/// let key = StorageKey::for_upload(owner, "../My CV (final).pdf");
/// assert!(key.as_str().starts_with(&format!("{owner}/")));
/// assert!(key.as_str().ends_with("-My_CV_final_.pdf"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StorageKey(String);

impl StorageKey {
    /// Build a fresh key for an upload by `owner`.
    pub fn for_upload(owner: PrincipalId, file_name: &str) -> Self {
        Self(format!(
            "{owner}/{}-{}",
            Uuid::new_v4(),
            sanitise_file_name(file_name)
        ))
    }

    /// Wrap a key read back from storage metadata.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reduce a client-supplied file name to `[A-Za-z0-9._-]`.
///
/// Path components are dropped, runs of other characters collapse to a single
/// underscore, and leading dots are removed so the result is never hidden or a
/// traversal segment.
pub fn sanitise_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let mut cleaned = String::with_capacity(base.len());
    let mut last_was_replacement = false;
    for ch in base.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_') {
            cleaned.push(ch);
            last_was_replacement = false;
        } else if !last_was_replacement {
            cleaned.push('_');
            last_was_replacement = true;
        }
    }
    let trimmed: String = cleaned
        .trim_start_matches('.')
        .chars()
        .take(MAX_NAME_CHARS)
        .collect();
    if trimmed.is_empty() || trimmed.chars().all(|ch| ch == '_') {
        FALLBACK_NAME.to_owned()
    } else {
        trimmed
    }
}

/// Content type implied by a file name's extension.
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "zip" => "application/zip",
        _ => OCTET_STREAM,
    }
}

/// Validation failures for uploads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadValidationError {
    #[error("uploaded file is empty")]
    Empty,
    #[error("uploaded file exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

/// A buffered upload ready for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl DocumentUpload {
    /// Validate an upload.
    ///
    /// A blank or generic declared type falls back to the extension mapping.
    pub fn try_new(
        name: &str,
        declared_type: Option<&str>,
        bytes: Vec<u8>,
        max_bytes: usize,
    ) -> Result<Self, UploadValidationError> {
        if bytes.is_empty() {
            return Err(UploadValidationError::Empty);
        }
        if bytes.len() > max_bytes {
            return Err(UploadValidationError::TooLarge { limit: max_bytes });
        }
        let trimmed = name.trim();
        let name = if trimmed.is_empty() {
            FALLBACK_NAME.to_owned()
        } else {
            trimmed.to_owned()
        };
        let content_type = declared_type
            .map(str::trim)
            .filter(|value| !value.is_empty() && *value != OCTET_STREAM)
            .map_or_else(|| content_type_for(&name).to_owned(), str::to_owned);
        Ok(Self {
            name,
            content_type,
            bytes,
        })
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn content_type(&self) -> &str {
        self.content_type.as_str()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size_bytes(&self) -> i64 {
        i64::try_from(self.bytes.len()).unwrap_or(i64::MAX)
    }

    /// Consume the upload, returning the buffered bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Metadata row for a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub id: Uuid,
    pub owner_id: PrincipalId,
    pub name: String,
    pub content_type: String,
    pub storage_path: StorageKey,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// Time-boxed link to one stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    pub url: String,
    pub expires_in: u32,
}

/// One file inside a batch download archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Last path component of `raw` without leading dots, so an archive entry
/// always extracts inside the target directory.
fn entry_base_name(raw: &str) -> &str {
    let base = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(raw)
        .trim_start_matches('.')
        .trim();
    if base.is_empty() { FALLBACK_NAME } else { base }
}

/// Assigns unique archive entry names, suffixing repeats as `name (2).ext`.
/// Directory components in the display name are dropped.
#[derive(Debug, Default)]
pub struct EntryNamer {
    seen: HashMap<String, usize>,
}

impl EntryNamer {
    pub fn unique(&mut self, name: &str) -> String {
        let name = entry_base_name(name);
        let count = self.seen.entry(name.to_owned()).or_insert(0);
        *count += 1;
        if *count == 1 {
            return name.to_owned();
        }
        let candidate = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({count}).{ext}"),
            _ => format!("{name} ({count})"),
        };
        // A suffixed name may itself collide with an original upload.
        self.unique(&candidate)
    }
}
