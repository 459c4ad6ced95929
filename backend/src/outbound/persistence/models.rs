//! Internal Diesel row structs.
//!
//! These never leave the persistence layer; repositories convert them to
//! domain types.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{applications, contact_messages, content_entries, documents};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = content_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ContentEntryRow {
    pub id: Uuid,
    pub kind: String,
    pub attributes: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = content_entries)]
pub(crate) struct NewContentEntryRow<'a> {
    pub id: Uuid,
    pub kind: &'a str,
    pub attributes: &'a serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = content_entries)]
pub(crate) struct ContentEntryUpdate<'a> {
    pub attributes: &'a serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ApplicationRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub university_name: String,
    pub program_name: String,
    pub program_level: Option<String>,
    pub intake: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Insert and full-row update share one shape.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = applications)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ApplicationRecord<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub university_name: &'a str,
    pub program_name: &'a str,
    pub program_level: Option<&'a str>,
    pub intake: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DocumentRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub content_type: String,
    pub storage_path: String,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = documents)]
pub(crate) struct NewDocumentRow<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: &'a str,
    pub content_type: &'a str,
    pub storage_path: &'a str,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = contact_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ContactMessageRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = contact_messages)]
pub(crate) struct NewContactMessageRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub subject: Option<&'a str>,
    pub message: &'a str,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
