//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the allocation model.
/// A failed edit never leaves a partially updated tree behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("cannot redistribute across children of {0}: children total is zero")]
    IndeterminateProportion(String),

    #[error("invalid magnitude: {0}")]
    InvalidMagnitude(String),

    #[error("duplicate node id: {0}")]
    DuplicateId(String),

    #[error("invalid value for node {id}: {value}")]
    InvalidValue { id: String, value: f64 },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
