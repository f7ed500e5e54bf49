//! Persistence collaborator contracts.
//!
//! The core defines what it needs from storage; `vinco-db` provides the
//! PostgreSQL implementation and [`memory::MemoryStore`] serves tests and
//! database-less development.
//!
//! Claim acquisition is the single serialization point: implementations
//! must make [`QueueStore::try_claim`] a linearizable compare-and-set, and
//! [`QueueStore::apply_transition`] atomic across the status update, the
//! audit append and the claim release.

pub mod memory;

use async_trait::async_trait;

use crate::candidate::{CandidateStatus, Detection, RecognitionCandidate, TransitionRecord};
use crate::claims::{Claim, ClaimAttempt};
use crate::edits::EditParameters;
use crate::error::CoreError;
use crate::history::EditVersion;
use crate::types::{DbId, Timestamp, VersionNumber};

pub use memory::MemoryStore;

/// Candidate records, the claim table and the transition log.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Insert a new candidate. Fails with [`CoreError::Conflict`] if the
    /// `(image_id, athlete_id)` pair already exists.
    async fn insert_candidate(
        &self,
        detection: &Detection,
        status: CandidateStatus,
        now: Timestamp,
    ) -> Result<RecognitionCandidate, CoreError>;

    async fn get_candidate(&self, id: DbId) -> Result<Option<RecognitionCandidate>, CoreError>;

    /// All candidates, optionally restricted to one status. Order unspecified.
    async fn list_candidates(
        &self,
        status: Option<CandidateStatus>,
    ) -> Result<Vec<RecognitionCandidate>, CoreError>;

    /// Every unexpired claim.
    async fn active_claims(&self, now: Timestamp) -> Result<Vec<Claim>, CoreError>;

    /// The unexpired claim on a candidate, if any.
    async fn get_claim(&self, candidate_id: DbId, now: Timestamp)
        -> Result<Option<Claim>, CoreError>;

    /// Compare-and-set: acquire when unclaimed, expired, or already held by
    /// `reviewer_id` (which refreshes the expiry); otherwise report the holder.
    async fn try_claim(
        &self,
        candidate_id: DbId,
        reviewer_id: DbId,
        now: Timestamp,
        ttl: chrono::Duration,
    ) -> Result<ClaimAttempt, CoreError>;

    /// Release an unexpired claim held by `reviewer_id`. Returns `false` if
    /// the reviewer held no such claim.
    async fn release_claim(
        &self,
        candidate_id: DbId,
        reviewer_id: DbId,
        now: Timestamp,
    ) -> Result<bool, CoreError>;

    /// Push the expiry of a claim held by `reviewer_id` to `now + ttl`.
    async fn extend_claim(
        &self,
        candidate_id: DbId,
        reviewer_id: DbId,
        now: Timestamp,
        ttl: chrono::Duration,
    ) -> Result<Option<Claim>, CoreError>;

    /// Deactivate every expired claim. Returns the number released.
    async fn expire_claims(&self, now: Timestamp) -> Result<u64, CoreError>;

    /// Atomically move the candidate from `record.from_status` to
    /// `record.to_status`, append `record`, and release any claim on it.
    ///
    /// Returns `None` (and changes nothing) when the candidate's status is no
    /// longer `record.from_status`.
    async fn apply_transition(
        &self,
        record: &TransitionRecord,
    ) -> Result<Option<RecognitionCandidate>, CoreError>;

    /// Transition log for one candidate, oldest first.
    async fn transitions(&self, candidate_id: DbId) -> Result<Vec<TransitionRecord>, CoreError>;
}

/// The append-only edit snapshot log.
#[async_trait]
pub trait EditHistoryStore: Send + Sync {
    /// Append a snapshot, assigning the next version number for the image.
    /// Concurrent appends for one image must receive distinct numbers.
    async fn append_version(
        &self,
        image_id: DbId,
        parameters: &EditParameters,
        author_id: DbId,
        reverted_from: Option<VersionNumber>,
        now: Timestamp,
    ) -> Result<EditVersion, CoreError>;

    async fn latest_version(&self, image_id: DbId) -> Result<Option<EditVersion>, CoreError>;

    async fn find_version(
        &self,
        image_id: DbId,
        version: VersionNumber,
    ) -> Result<Option<EditVersion>, CoreError>;

    /// All versions for an image, newest first.
    async fn list_versions(&self, image_id: DbId) -> Result<Vec<EditVersion>, CoreError>;
}
