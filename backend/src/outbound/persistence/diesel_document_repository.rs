//! PostgreSQL-backed `DocumentRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{DocumentRepository, DocumentRepositoryError};
use crate::domain::{Document, PrincipalId, StorageKey};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{DocumentRow, NewDocumentRow};
use super::pool::{DbPool, PoolError};
use super::schema::documents;

#[derive(Clone)]
pub struct DieselDocumentRepository {
    pool: DbPool,
}

impl DieselDocumentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> DocumentRepositoryError {
    map_pool_error(error, DocumentRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> DocumentRepositoryError {
    map_diesel_error(
        error,
        DocumentRepositoryError::query,
        DocumentRepositoryError::connection,
    )
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: row.id,
            owner_id: PrincipalId::from_uuid(row.owner_id),
            name: row.name,
            content_type: row.content_type,
            storage_path: StorageKey::from_stored(row.storage_path),
            size_bytes: row.size_bytes,
            uploaded_at: row.uploaded_at,
        }
    }
}

#[async_trait]
impl DocumentRepository for DieselDocumentRepository {
    async fn insert(&self, document: &Document) -> Result<(), DocumentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(documents::table)
            .values(&NewDocumentRow {
                id: document.id,
                owner_id: *document.owner_id.as_uuid(),
                name: &document.name,
                content_type: &document.content_type,
                storage_path: document.storage_path.as_str(),
                size_bytes: document.size_bytes,
                uploaded_at: document.uploaded_at,
            })
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Document>, DocumentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        documents::table
            .filter(documents::id.eq(id))
            .select(DocumentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Document::from))
            .map_err(diesel_error)
    }

    async fn list_for_owner(
        &self,
        owner: PrincipalId,
    ) -> Result<Vec<Document>, DocumentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<DocumentRow> = documents::table
            .filter(documents::owner_id.eq(owner.as_uuid()))
            .order((documents::uploaded_at.desc(), documents::id.desc()))
            .select(DocumentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn find_many(
        &self,
        ids: &[Uuid],
        owner: Option<PrincipalId>,
    ) -> Result<Vec<Document>, DocumentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let mut query = documents::table
            .filter(documents::id.eq_any(ids))
            .order((documents::uploaded_at.asc(), documents::id.asc()))
            .select(DocumentRow::as_select())
            .into_boxed();
        if let Some(owner) = owner {
            query = query.filter(documents::owner_id.eq(*owner.as_uuid()));
        }
        let rows: Vec<DocumentRow> = query.load(&mut conn).await.map_err(diesel_error)?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DocumentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let affected = diesel::delete(documents::table.filter(documents::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(affected > 0)
    }
}
