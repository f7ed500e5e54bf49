//! Advisory review leases on candidates.
//!
//! A claim gives one reviewer exclusive resolution rights over a candidate
//! until it is released, the candidate is resolved, or it expires. Expired
//! claims are treated as absent everywhere and are eventually swept.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Default claim lifetime in minutes.
pub const DEFAULT_CLAIM_TTL_MINS: i64 = 15;

/// Minimum configurable claim lifetime in minutes.
pub const MIN_CLAIM_TTL_MINS: i64 = 1;

/// Maximum configurable claim lifetime in minutes (4 hours).
pub const MAX_CLAIM_TTL_MINS: i64 = 240;

/// How often the expired-claim sweeper runs (in seconds).
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// An active lease.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub candidate_id: DbId,
    pub reviewer_id: DbId,
    pub claimed_at: Timestamp,
    pub expires_at: Timestamp,
}

impl Claim {
    pub fn new(candidate_id: DbId, reviewer_id: DbId, now: Timestamp, ttl: Duration) -> Self {
        Self {
            candidate_id,
            reviewer_id,
            claimed_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }

    pub fn is_held_by(&self, reviewer_id: DbId) -> bool {
        self.reviewer_id == reviewer_id
    }

    /// The error a different reviewer receives while this claim is active.
    pub fn conflict(&self) -> CoreError {
        CoreError::ClaimConflict {
            candidate_id: self.candidate_id,
            held_by: self.reviewer_id,
            claimed_at: self.claimed_at,
            expires_at: self.expires_at,
        }
    }
}

/// Result of a compare-and-set claim attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimAttempt {
    /// The caller now holds the claim (new, or refreshed re-claim).
    Acquired(Claim),
    /// Another reviewer holds an active claim.
    Held(Claim),
}

/// Validate a claim lifetime in minutes.
pub fn validate_claim_ttl(minutes: i64) -> Result<(), String> {
    if minutes < MIN_CLAIM_TTL_MINS {
        return Err(format!(
            "Claim TTL must be at least {MIN_CLAIM_TTL_MINS} minute(s), got {minutes}"
        ));
    }
    if minutes > MAX_CLAIM_TTL_MINS {
        return Err(format!(
            "Claim TTL must be at most {MAX_CLAIM_TTL_MINS} minutes, got {minutes}"
        ));
    }
    Ok(())
}
