//! Error types for the data layer.
//!
//! All errors are propagated via [`DbError`], which wraps the underlying
//! [`sqlx`] error. At the engine boundary every [`DbError`] becomes
//! [`SourceError::Unavailable`]; unknown users are reported separately as
//! [`SourceError::NotFound`] before any event query runs.

use allergen_core::SourceError;

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A stored row does not fit the domain type.
    #[error("Invalid {table} row: {reason}")]
    InvalidRow {
        /// Table the row was read from.
        table: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<DbError> for SourceError {
    fn from(err: DbError) -> Self {
        Self::Unavailable {
            message: err.to_string(),
        }
    }
}
