//! PostgreSQL-backed `ContactRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ContactRepository, ContactRepositoryError};
use crate::domain::{ContactMessage, ContactStatus};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ContactMessageRow, NewContactMessageRow};
use super::pool::{DbPool, PoolError};
use super::schema::contact_messages;

#[derive(Clone)]
pub struct DieselContactRepository {
    pool: DbPool,
}

impl DieselContactRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ContactRepositoryError {
    map_pool_error(error, ContactRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ContactRepositoryError {
    map_diesel_error(
        error,
        ContactRepositoryError::query,
        ContactRepositoryError::connection,
    )
}

fn row_to_message(row: ContactMessageRow) -> Result<ContactMessage, ContactRepositoryError> {
    let status = row
        .status
        .parse::<ContactStatus>()
        .map_err(|err| ContactRepositoryError::query(err.to_string()))?;
    Ok(ContactMessage {
        id: row.id,
        name: row.name,
        email: row.email,
        subject: row.subject,
        message: row.message,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl ContactRepository for DieselContactRepository {
    async fn insert(&self, message: &ContactMessage) -> Result<(), ContactRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(contact_messages::table)
            .values(&NewContactMessageRow {
                id: message.id,
                name: &message.name,
                email: &message.email,
                subject: message.subject.as_deref(),
                message: &message.message,
                status: message.status.as_str(),
                created_at: message.created_at,
                updated_at: message.updated_at,
            })
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn list(
        &self,
        status: Option<ContactStatus>,
    ) -> Result<Vec<ContactMessage>, ContactRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let mut query = contact_messages::table
            .order((
                contact_messages::created_at.desc(),
                contact_messages::id.desc(),
            ))
            .select(ContactMessageRow::as_select())
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(contact_messages::status.eq(status.as_str()));
        }
        let rows = query.load(&mut conn).await.map_err(diesel_error)?;
        rows.into_iter().map(row_to_message).collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ContactStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<ContactMessage>, ContactRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = diesel::update(contact_messages::table.filter(contact_messages::id.eq(id)))
            .set((
                contact_messages::status.eq(status.as_str()),
                contact_messages::updated_at.eq(updated_at),
            ))
            .returning(ContactMessageRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_message).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ContactRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let affected = diesel::delete(contact_messages::table.filter(contact_messages::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(affected > 0)
    }
}
