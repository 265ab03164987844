//! Error taxonomy for store access and workflow operations.

use thiserror::Error;

use crate::models::cascade::PartialFailure;

/// Errors surfaced by store implementations (Postgres or in-memory).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,

    /// A uniqueness or state constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome taxonomy for every workflow operation.
///
/// Validation and authorization failures are always detected before any
/// store mutation. `PartialFailure` is reserved for the team-deletion cascade.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Forbidden: {0}")]
    AuthorizationDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Partial failure: {}", .0.message)]
    PartialFailure(PartialFailure),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => DomainError::NotFound("Resource not found".into()),
            StoreError::Conflict(msg) => DomainError::Conflict(msg),
            other => DomainError::Store(other),
        }
    }
}

impl From<validator::ValidationError> for DomainError {
    fn from(err: validator::ValidationError) -> Self {
        let message = err
            .message
            .map(|m| m.to_string())
            .unwrap_or_else(|| err.code.to_string());
        DomainError::Validation(message)
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
