//! Error handling utilities for repositories

use chat_core::error::DomainError;
use chat_core::events::AggregateType;
use chat_core::value_objects::Snowflake;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
///
/// `on_unique` receives the violated constraint name when the driver
/// reports one.
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce(Option<&str>) -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique(db_err.constraint());
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// A save that lost the compare-and-swap
pub fn version_conflict(aggregate: AggregateType, id: Snowflake, incoming: i64) -> DomainError {
    DomainError::version_conflict(aggregate.as_str(), id, incoming - 1)
}
