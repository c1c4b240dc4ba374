//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A record was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A write would break a uniqueness invariant.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
