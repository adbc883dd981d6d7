use thiserror::Error;
use uuid::Uuid;

/// Violations raised by the `Word` aggregate.
///
/// Lookups of a missing child return `None`/`false` instead; these errors
/// are reserved for calls that indicate a programming defect.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("sense not found: {0}")]
    SenseNotFound(Uuid),

    #[error("sense index {0} already used by another sense of this word")]
    DuplicateSenseIndex(i32),
}

/// Failures reported by storage ports.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage: {0}")]
    Storage(#[from] anyhow::Error),
}
