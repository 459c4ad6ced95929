//! PostgreSQL-backed `ApplicationRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ApplicationRepository, ApplicationRepositoryError};
use crate::domain::{Application, ApplicationStatus, PrincipalId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ApplicationRecord, ApplicationRow};
use super::pool::{DbPool, PoolError};
use super::schema::applications;

#[derive(Clone)]
pub struct DieselApplicationRepository {
    pool: DbPool,
}

impl DieselApplicationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ApplicationRepositoryError {
    map_pool_error(error, ApplicationRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ApplicationRepositoryError {
    map_diesel_error(
        error,
        ApplicationRepositoryError::query,
        ApplicationRepositoryError::connection,
    )
}

fn record(application: &Application) -> ApplicationRecord<'_> {
    ApplicationRecord {
        id: application.id,
        owner_id: *application.owner_id.as_uuid(),
        university_name: &application.university_name,
        program_name: &application.program_name,
        program_level: application.program_level.as_deref(),
        intake: application.intake.as_deref(),
        notes: application.notes.as_deref(),
        status: application.status.as_str(),
        created_at: application.created_at,
        updated_at: application.updated_at,
        submitted_at: application.submitted_at,
    }
}

fn row_to_application(row: ApplicationRow) -> Result<Application, ApplicationRepositoryError> {
    let status = row
        .status
        .parse::<ApplicationStatus>()
        .map_err(|err| ApplicationRepositoryError::query(err.to_string()))?;
    Ok(Application {
        id: row.id,
        owner_id: PrincipalId::from_uuid(row.owner_id),
        university_name: row.university_name,
        program_name: row.program_name,
        program_level: row.program_level,
        intake: row.intake,
        notes: row.notes,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
        submitted_at: row.submitted_at,
    })
}

fn rows_to_applications(
    rows: Vec<ApplicationRow>,
) -> Result<Vec<Application>, ApplicationRepositoryError> {
    rows.into_iter().map(row_to_application).collect()
}

#[async_trait]
impl ApplicationRepository for DieselApplicationRepository {
    async fn list_for_owner(
        &self,
        owner: PrincipalId,
    ) -> Result<Vec<Application>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = applications::table
            .filter(applications::owner_id.eq(owner.as_uuid()))
            .order((applications::created_at.desc(), applications::id.desc()))
            .select(ApplicationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows_to_applications(rows)
    }

    async fn list_all(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let mut query = applications::table
            .order((applications::created_at.desc(), applications::id.desc()))
            .select(ApplicationRow::as_select())
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(applications::status.eq(status.as_str()));
        }
        let rows = query.load(&mut conn).await.map_err(diesel_error)?;
        rows_to_applications(rows)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Application>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = applications::table
            .filter(applications::id.eq(id))
            .select(ApplicationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_application).transpose()
    }

    async fn insert(&self, application: &Application) -> Result<(), ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(applications::table)
            .values(&record(application))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn update(
        &self,
        application: &Application,
    ) -> Result<bool, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let affected = diesel::update(applications::table.filter(applications::id.eq(application.id)))
            .set(&record(application))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(affected > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let affected = diesel::delete(applications::table.filter(applications::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(affected > 0)
    }

    async fn delete_for_owner(
        &self,
        owner: PrincipalId,
    ) -> Result<u64, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let affected =
            diesel::delete(applications::table.filter(applications::owner_id.eq(owner.as_uuid())))
                .execute(&mut conn)
                .await
                .map_err(diesel_error)?;
        Ok(u64::try_from(affected).unwrap_or(0))
    }
}
