use crate::candidate::{CandidateStatus, ReviewAction};
use crate::edits::EditValidationError;
use crate::types::{DbId, Timestamp};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Edit parameters rejected by [`crate::edits::EditParameters::validate`].
    #[error(transparent)]
    InvalidEdit(#[from] EditValidationError),

    #[error("Cannot {action} a candidate in status {from}")]
    InvalidTransition {
        from: CandidateStatus,
        action: ReviewAction,
    },

    /// Another reviewer holds an active claim on the candidate.
    #[error("Candidate {candidate_id} is already claimed by reviewer {held_by}")]
    ClaimConflict {
        candidate_id: DbId,
        held_by: DbId,
        claimed_at: Timestamp,
        expires_at: Timestamp,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The persistence collaborator could not be reached. Safe to retry.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether a caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::StoreUnavailable(_))
    }
}
