use thiserror::Error;

use crate::kernel::{IdentityError, StoreError};

/// Failures surfaced by the submission service.
///
/// Validation and authorization failures are detected before any write;
/// store failures mid-operation leave whatever prefix of writes already
/// landed (no rollback — the pending-index invariant tolerates it).
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("identity provider call timed out")]
    Timeout,

    #[error("storage failure: {0}")]
    Store(#[from] StoreError),

    #[error("stored record is malformed: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("identity provider error: {0}")]
    Identity(String),
}

impl From<IdentityError> for SubmissionError {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::InvalidToken => {
                SubmissionError::Authentication("Unauthorized - Admin access required".to_string())
            }
            IdentityError::Timeout => SubmissionError::Timeout,
            IdentityError::Rejected(message) => SubmissionError::Authorization(message),
            IdentityError::Upstream(message) => SubmissionError::Identity(message),
        }
    }
}
