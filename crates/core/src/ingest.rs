//! Initial-status policy applied when the recognition producer pushes a detection.
//!
//! The policy is injected into the queue so thresholds can change without
//! touching the state machine.

use crate::candidate::{CandidateStatus, Detection};
use crate::error::CoreError;

/// Default effective score at or above which a detection is auto-approved.
pub const DEFAULT_AUTO_APPROVE_THRESHOLD: f64 = 0.85;

/// Default effective score below which a detection is discarded.
pub const DEFAULT_REVIEW_FLOOR: f64 = 0.5;

/// Tolerance for comparing a summed score against a threshold.
pub const SCORE_EPSILON: f64 = 1e-9;

/// What to do with an incoming detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestDecision {
    /// Store the candidate with this initial status.
    Store(CandidateStatus),
    /// Too weak to be worth a reviewer's time.
    Discard,
}

/// Decides the initial status of a detection.
pub trait AutoApprovalPolicy: Send + Sync {
    fn decide(&self, detection: &Detection) -> IngestDecision;
}

/// Compares the effective score against two fixed thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPolicy {
    pub auto_approve_threshold: f64,
    /// `None` queues every detection below the auto-approve threshold.
    pub review_floor: Option<f64>,
}

impl ThresholdPolicy {
    pub fn new(auto_approve_threshold: f64, review_floor: Option<f64>) -> Result<Self, CoreError> {
        if !auto_approve_threshold.is_finite() {
            return Err(CoreError::Validation(
                "auto_approve_threshold must be a finite number".to_string(),
            ));
        }
        if let Some(floor) = review_floor {
            if !floor.is_finite() || floor > auto_approve_threshold {
                return Err(CoreError::Validation(format!(
                    "review_floor ({floor}) must be finite and not exceed auto_approve_threshold ({auto_approve_threshold})"
                )));
            }
        }
        Ok(Self {
            auto_approve_threshold,
            review_floor,
        })
    }
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            auto_approve_threshold: DEFAULT_AUTO_APPROVE_THRESHOLD,
            review_floor: Some(DEFAULT_REVIEW_FLOOR),
        }
    }
}

impl AutoApprovalPolicy for ThresholdPolicy {
    fn decide(&self, detection: &Detection) -> IngestDecision {
        let score = detection.effective_score();
        if score + SCORE_EPSILON >= self.auto_approve_threshold {
            IngestDecision::Store(CandidateStatus::AutoApproved)
        } else if self.review_floor.is_some_and(|floor| score + SCORE_EPSILON < floor) {
            IngestDecision::Discard
        } else {
            IngestDecision::Store(CandidateStatus::PendingReview)
        }
    }
}
