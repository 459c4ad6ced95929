//! PostgreSQL-backed `ContentRepository`.
//!
//! Every content kind shares the `content_entries` table. Attributes are a
//! JSONB object; the program duplicate check uses JSONB containment so the
//! GIN index on `attributes` serves it.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ports::{ContentRepository, ContentRepositoryError};
use crate::domain::{ContentEntry, ContentKind, ProgramKey};

use super::error_mapping::{DieselFailure, classify, map_diesel_error, map_pool_error};
use super::models::{ContentEntryRow, ContentEntryUpdate, NewContentEntryRow};
use super::pool::{DbPool, PoolError};
use super::schema::content_entries;

#[derive(Clone)]
pub struct DieselContentRepository {
    pool: DbPool,
}

impl DieselContentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ContentRepositoryError {
    map_pool_error(error, ContentRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ContentRepositoryError {
    map_diesel_error(
        error,
        ContentRepositoryError::query,
        ContentRepositoryError::connection,
    )
}

fn write_error(error: diesel::result::Error) -> ContentRepositoryError {
    if classify(&error) == DieselFailure::UniqueViolation {
        ContentRepositoryError::duplicate("program identity already taken")
    } else {
        diesel_error(error)
    }
}

fn row_to_entry(row: ContentEntryRow) -> Result<ContentEntry, ContentRepositoryError> {
    let kind = row
        .kind
        .parse::<ContentKind>()
        .map_err(|err| ContentRepositoryError::query(err.to_string()))?;
    let Value::Object(attributes) = row.attributes else {
        return Err(ContentRepositoryError::query(format!(
            "content entry {} attributes are not an object",
            row.id
        )));
    };
    Ok(ContentEntry {
        id: row.id,
        kind,
        attributes,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn rows_to_entries(rows: Vec<ContentEntryRow>) -> Result<Vec<ContentEntry>, ContentRepositoryError> {
    rows.into_iter().map(row_to_entry).collect()
}

#[async_trait]
impl ContentRepository for DieselContentRepository {
    async fn list(&self, kind: ContentKind) -> Result<Vec<ContentEntry>, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = content_entries::table
            .filter(content_entries::kind.eq(kind.slug()))
            .order((content_entries::created_at.desc(), content_entries::id.desc()))
            .select(ContentEntryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows_to_entries(rows)
    }

    async fn find(
        &self,
        kind: ContentKind,
        id: Uuid,
    ) -> Result<Option<ContentEntry>, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = content_entries::table
            .filter(content_entries::kind.eq(kind.slug()))
            .filter(content_entries::id.eq(id))
            .select(ContentEntryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_entry).transpose()
    }

    async fn find_many(
        &self,
        kind: ContentKind,
        ids: &[Uuid],
    ) -> Result<Vec<ContentEntry>, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = content_entries::table
            .filter(content_entries::kind.eq(kind.slug()))
            .filter(content_entries::id.eq_any(ids))
            .select(ContentEntryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows_to_entries(rows)
    }

    async fn find_program(
        &self,
        key: &ProgramKey,
    ) -> Result<Option<ContentEntry>, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = content_entries::table
            .filter(content_entries::kind.eq(ContentKind::Programs.slug()))
            .filter(content_entries::attributes.contains(key.as_attributes()))
            .order(content_entries::created_at.asc())
            .select(ContentEntryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_entry).transpose()
    }

    async fn insert(&self, entry: &ContentEntry) -> Result<(), ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let attributes = Value::Object(entry.attributes.clone());
        diesel::insert_into(content_entries::table)
            .values(&NewContentEntryRow {
                id: entry.id,
                kind: entry.kind.slug(),
                attributes: &attributes,
                created_at: entry.created_at,
                updated_at: entry.updated_at,
            })
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(write_error)
    }

    async fn update(&self, entry: &ContentEntry) -> Result<bool, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let attributes = Value::Object(entry.attributes.clone());
        let affected = diesel::update(
            content_entries::table
                .filter(content_entries::kind.eq(entry.kind.slug()))
                .filter(content_entries::id.eq(entry.id)),
        )
        .set(&ContentEntryUpdate {
            attributes: &attributes,
            updated_at: entry.updated_at,
        })
        .execute(&mut conn)
        .await
        .map_err(write_error)?;
        Ok(affected > 0)
    }

    async fn delete(&self, kind: ContentKind, id: Uuid) -> Result<bool, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let affected = diesel::delete(
            content_entries::table
                .filter(content_entries::kind.eq(kind.slug()))
                .filter(content_entries::id.eq(id)),
        )
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn row(kind: &str, attributes: Value) -> ContentEntryRow {
        ContentEntryRow {
            id: Uuid::new_v4(),
            kind: kind.to_owned(),
            attributes,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    fn rows_convert_to_entries() {
        let entry = row_to_entry(row("visa-guides", json!({"country": "NZ", "title": "Visitor"})))
            .expect("valid row");
        assert_eq!(entry.kind, ContentKind::VisaGuides);
        assert_eq!(entry.attributes.get("country"), Some(&json!("NZ")));
    }

    #[rstest]
    #[case(row("blog-posts", json!({})))]
    #[case(row("faqs", json!(["not", "an", "object"])))]
    fn corrupt_rows_are_query_errors(#[case] bad: ContentEntryRow) {
        let error = row_to_entry(bad).expect_err("corrupt row");
        assert!(matches!(error, ContentRepositoryError::Query { .. }));
    }
}
