//! Recognized-athlete candidates and their review state machine.
//!
//! A candidate is one detected (image, athlete) pairing. Its status moves
//! only along the table in [`transition`]; every accepted move is recorded as
//! a [`TransitionRecord`] so the candidate row itself holds just the current
//! status.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Maximum length of a reviewer note attached to a transition.
pub const MAX_NOTE_LENGTH: usize = 2_000;

/// Maximum length of a rejection reason.
pub const MAX_REASON_LENGTH: usize = 500;

/* --------------------------------------------------------------------------
Status and actions
-------------------------------------------------------------------------- */

/// Review status of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CandidateStatus {
    /// Effective score met the auto-approval threshold at ingestion.
    AutoApproved,
    PendingReview,
    Approved,
    Rejected,
}

impl CandidateStatus {
    pub const ALL: [CandidateStatus; 4] = [
        Self::AutoApproved,
        Self::PendingReview,
        Self::Approved,
        Self::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoApproved => "AUTO_APPROVED",
            Self::PendingReview => "PENDING_REVIEW",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reviewer's decision on a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    Reject,
    /// Downgrade an auto-approved candidate.
    #[serde(alias = "override-reject")]
    OverrideReject,
    /// Send a resolved candidate back for re-labeling.
    Reassign,
}

impl ReviewAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::OverrideReject => "override-reject",
            Self::Reassign => "reassign",
        }
    }
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Apply `action` to a candidate in status `from`.
///
/// Any pair not in the table fails with [`CoreError::InvalidTransition`].
pub fn transition(from: CandidateStatus, action: ReviewAction) -> Result<CandidateStatus, CoreError> {
    use CandidateStatus::*;
    use ReviewAction::*;

    match (from, action) {
        (PendingReview, Approve) => Ok(Approved),
        (PendingReview, Reject) => Ok(Rejected),
        (AutoApproved, OverrideReject) => Ok(Rejected),
        (Approved | Rejected, Reassign) => Ok(PendingReview),
        (from, action) => Err(CoreError::InvalidTransition { from, action }),
    }
}

/* --------------------------------------------------------------------------
Geometry
-------------------------------------------------------------------------- */

/// Detection bounding box in normalized image-fraction units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, value) in [
            ("left", self.left),
            ("top", self.top),
            ("width", self.width),
            ("height", self.height),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CoreError::Validation(format!(
                    "bounding_box.{name} must be between 0.0 and 1.0, got {value}"
                )));
            }
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(CoreError::Validation(
                "bounding_box width and height must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/* --------------------------------------------------------------------------
Candidate records
-------------------------------------------------------------------------- */

/// A detection pushed by the recognition producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub image_id: DbId,
    pub athlete_id: DbId,
    pub confidence: f64,
    #[serde(default)]
    pub temporal_boost: f64,
    pub bounding_box: BoundingBox,
    /// Capture (or upload) time of the image; drives queue ordering.
    pub captured_at: Timestamp,
}

impl Detection {
    /// `confidence + temporal_boost`. Used only for the auto-approval policy.
    pub fn effective_score(&self) -> f64 {
        self.confidence + self.temporal_boost
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.image_id <= 0 {
            return Err(CoreError::Validation(format!(
                "image_id must be positive, got {}",
                self.image_id
            )));
        }
        if self.athlete_id <= 0 {
            return Err(CoreError::Validation(format!(
                "athlete_id must be positive, got {}",
                self.athlete_id
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(CoreError::Validation(format!(
                "confidence must be between 0.0 and 1.0, got {}",
                self.confidence
            )));
        }
        if !self.temporal_boost.is_finite() {
            return Err(CoreError::Validation(
                "temporal_boost must be a finite number".to_string(),
            ));
        }
        self.bounding_box.validate()
    }
}

/// A stored candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionCandidate {
    pub id: DbId,
    pub image_id: DbId,
    pub athlete_id: DbId,
    pub confidence: f64,
    pub temporal_boost: f64,
    pub bounding_box: BoundingBox,
    pub status: CandidateStatus,
    pub captured_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RecognitionCandidate {
    pub fn effective_score(&self) -> f64 {
        self.confidence + self.temporal_boost
    }
}

/// One accepted status change, appended to the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub candidate_id: DbId,
    pub reviewer_id: DbId,
    pub action: ReviewAction,
    pub from_status: CandidateStatus,
    pub to_status: CandidateStatus,
    pub note: Option<String>,
    pub reason: Option<String>,
    pub created_at: Timestamp,
}

/// Validate optional reviewer note and rejection reason lengths.
pub fn validate_review_text(note: Option<&str>, reason: Option<&str>) -> Result<(), CoreError> {
    if let Some(n) = note {
        if n.chars().count() > MAX_NOTE_LENGTH {
            return Err(CoreError::Validation(format!(
                "Note exceeds maximum length of {MAX_NOTE_LENGTH} characters"
            )));
        }
    }
    if let Some(r) = reason {
        if r.chars().count() > MAX_REASON_LENGTH {
            return Err(CoreError::Validation(format!(
                "Reason exceeds maximum length of {MAX_REASON_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
