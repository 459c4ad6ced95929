//! Diesel and pool error translation shared by every repository.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Coarse classification of a Diesel failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    Connection,
    UniqueViolation,
    Query,
}

pub(crate) fn classify(error: &DieselError) -> DieselFailure {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
            match kind {
                DatabaseErrorKind::ClosedConnection => DieselFailure::Connection,
                DatabaseErrorKind::UniqueViolation => DieselFailure::UniqueViolation,
                _ => DieselFailure::Query,
            }
        }
        other => {
            debug!(error = %other, "diesel operation failed");
            DieselFailure::Query
        }
    }
}

/// Map a Diesel error onto a port's `query`/`connection` constructors.
///
/// Unique violations are treated as query failures; repositories that care
/// call [`classify`] themselves first.
pub(crate) fn map_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
{
    match classify(&error) {
        DieselFailure::Connection => connection("database connection error"),
        DieselFailure::UniqueViolation => query("unique constraint violated"),
        DieselFailure::Query if matches!(error, DieselError::NotFound) => {
            query("record not found")
        }
        DieselFailure::Query => query("database error"),
    }
}

/// Map a pool error onto a port's `connection` constructor.
pub(crate) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    connection(error.message().to_owned())
}
