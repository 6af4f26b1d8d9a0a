//! Domain errors for the fixpoint repair pipeline.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur in the fixpoint system.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Job not found: {0}")]
    JobNotFound(Uuid),

    #[error("Workspace not found: {0}")]
    WorkspaceNotFound(String),

    #[error("Invalid state transition from {from} to {to}: {reason}")]
    InvalidStateTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Workspace error: {0}")]
    WorkspaceError(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Model request failed: {0}")]
    ModelFailed(String),

    #[error("Patch application failed: {0}")]
    PatchFailed(String),

    #[error("Test run failed: {0}")]
    TestRunFailed(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::StorageError(err.to_string())
    }
}
