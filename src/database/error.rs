//! Store error types.
//!
//! Every backing-store adapter funnels its driver errors into [`StoreError`],
//! so feature repositories only ever see one distinguished failure type.
//! Absence of a record is never an error.

use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

/// Result alias used across the persistence layer.
pub type StoreResult<T> = Result<T, StoreError>;

/// MongoDB server code for a unique index violation.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Failure reported by a backing store or by a cache store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connectivity, driver or query failure.
    #[error("backing store failure: {0}")]
    Backend(String),

    /// A unique key already exists.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// A record or key could not be encoded or decoded.
    #[error("serialization failure: {0}")]
    Serialization(String),

    /// The store has not completed its startup load.
    #[error("store '{0}' is not loaded yet")]
    NotReady(String),
}

impl StoreError {
    /// Check if this is a unique-key violation.
    pub fn is_constraint(&self) -> bool {
        matches!(self, Self::Constraint(_))
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY_CODE => {
                Self::Constraint(write.message.clone())
            }
            _ => Self::Backend(err.to_string()),
        }
    }
}

impl From<mongodb::bson::ser::Error> for StoreError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Constraint(db.message().to_string())
            }
            _ => Self::Backend(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
