//! Mapping from `sqlx` failures to domain errors.

use vinco_core::error::CoreError;

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Translate a database error into a [`CoreError`].
///
/// Connectivity failures become [`CoreError::StoreUnavailable`] so callers
/// can surface them as retryable; unique violations become
/// [`CoreError::Conflict`]; everything else is internal.
pub fn store_error(err: sqlx::Error) -> CoreError {
    match &err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => CoreError::StoreUnavailable(err.to_string()),
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            CoreError::Conflict(db.message().to_string())
        }
        _ => CoreError::Internal(err.to_string()),
    }
}
