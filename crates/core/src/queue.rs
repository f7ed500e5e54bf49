//! The validation queue service.
//!
//! The queue is a projection over stored candidates plus the claim table.
//! Listings are re-evaluated on every call and ordered deterministically by
//! capture time, then image, then athlete. Reviewer position within a
//! listing is carried by the caller as a [`QueueCursor`]; the service itself
//! keeps no per-reviewer session state.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::candidate::{
    transition, validate_review_text, CandidateStatus, Detection, RecognitionCandidate,
    ReviewAction, TransitionRecord,
};
use crate::claims::{Claim, ClaimAttempt, DEFAULT_CLAIM_TTL_MINS};
use crate::error::CoreError;
use crate::ingest::{AutoApprovalPolicy, IngestDecision};
use crate::store::QueueStore;
use crate::types::{DbId, Timestamp};

/* --------------------------------------------------------------------------
Pagination
-------------------------------------------------------------------------- */

/// Default number of queue entries per page.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Maximum number of queue entries per page.
pub const MAX_PAGE_SIZE: usize = 200;

/// A 1-based page request. Limits are clamped to `[1, MAX_PAGE_SIZE]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(page: Option<usize>, limit: Option<usize>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/* --------------------------------------------------------------------------
Filters and entries
-------------------------------------------------------------------------- */

/// Which candidates a listing includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueFilter {
    /// Every candidate regardless of status.
    All,
    /// Candidates in `PENDING_REVIEW`.
    #[default]
    Pending,
    /// Candidates actively claimed by the requesting reviewer.
    Claimed,
}

impl QueueFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Claimed => "claimed",
        }
    }
}

impl std::str::FromStr for QueueFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "claimed" => Ok(Self::Claimed),
            other => Err(CoreError::Validation(format!(
                "Unknown queue filter '{other}', expected one of: all, pending, claimed"
            ))),
        }
    }
}

/// One row of a queue listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueEntry {
    #[serde(flatten)]
    pub candidate: RecognitionCandidate,
    pub effective_score: f64,
    /// The active claim, if any.
    pub claim: Option<Claim>,
}

fn queue_order(a: &QueueEntry, b: &QueueEntry) -> std::cmp::Ordering {
    let (a, b) = (&a.candidate, &b.candidate);
    a.captured_at
        .cmp(&b.captured_at)
        .then(a.image_id.cmp(&b.image_id))
        .then(a.athlete_id.cmp(&b.athlete_id))
        .then(a.id.cmp(&b.id))
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueuePage {
    pub items: Vec<QueueEntry>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
    pub has_more: bool,
}

impl QueuePage {
    pub fn from_listing(listing: &[QueueEntry], request: PageRequest) -> Self {
        let total = listing.len();
        let start = request.offset().min(total);
        let end = start.saturating_add(request.limit).min(total);
        Self {
            items: listing[start..end].to_vec(),
            total,
            page: request.page,
            limit: request.limit,
            total_pages: total.div_ceil(request.limit),
            has_more: end < total,
        }
    }
}

/* --------------------------------------------------------------------------
Cursor
-------------------------------------------------------------------------- */

/// Position of a reviewer within a materialized listing.
///
/// Clamped at zero on the low end. Unclamped on the high end: a position
/// past the last entry means there is nothing more to review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueCursor(pub usize);

impl QueueCursor {
    pub fn position(&self) -> usize {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    pub fn previous(self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    pub fn entry<'a>(&self, listing: &'a [QueueEntry]) -> Option<&'a QueueEntry> {
        listing.get(self.0)
    }

    pub fn is_exhausted(&self, listing: &[QueueEntry]) -> bool {
        self.0 >= listing.len()
    }
}

/// A reviewer's filter and cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSession {
    pub filter: QueueFilter,
    pub cursor: QueueCursor,
}

impl QueueSession {
    /// Switch filters. Any change resets the cursor to the first entry.
    pub fn with_filter(self, filter: QueueFilter) -> Self {
        if filter == self.filter {
            self
        } else {
            Self {
                filter,
                cursor: QueueCursor::default(),
            }
        }
    }
}

/* --------------------------------------------------------------------------
Service types
-------------------------------------------------------------------------- */

/// The identity and capability of a caller acting on the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reviewer {
    pub id: DbId,
    pub can_validate: bool,
}

impl Reviewer {
    fn authorize(&self) -> Result<(), CoreError> {
        if self.can_validate {
            Ok(())
        } else {
            Err(CoreError::Unauthorized(format!(
                "User {} lacks the validate_recognition capability",
                self.id
            )))
        }
    }
}

/// What happened to an ingested detection.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Stored(RecognitionCandidate),
    Discarded { effective_score: f64 },
}

/// A reviewer's decision with optional free text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Resolution {
    pub action: ReviewAction,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl Resolution {
    pub fn new(action: ReviewAction) -> Self {
        Self {
            action,
            note: None,
            reason: None,
        }
    }
}

/// The result of an accepted transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved {
    pub candidate: RecognitionCandidate,
    pub transition: TransitionRecord,
}

/* --------------------------------------------------------------------------
ValidationQueue
-------------------------------------------------------------------------- */

/// Candidate ingestion, listing, claims and resolution.
pub struct ValidationQueue {
    store: Arc<dyn QueueStore>,
    policy: Arc<dyn AutoApprovalPolicy>,
    claim_ttl: chrono::Duration,
}

impl ValidationQueue {
    pub fn new(store: Arc<dyn QueueStore>, policy: Arc<dyn AutoApprovalPolicy>) -> Self {
        Self {
            store,
            policy,
            claim_ttl: chrono::Duration::minutes(DEFAULT_CLAIM_TTL_MINS),
        }
    }

    pub fn with_claim_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.claim_ttl = ttl;
        self
    }

    pub fn claim_ttl(&self) -> chrono::Duration {
        self.claim_ttl
    }

    /// Validate a detection and store it with the policy's initial status.
    pub async fn ingest(
        &self,
        detection: &Detection,
        now: Timestamp,
    ) -> Result<IngestOutcome, CoreError> {
        detection.validate()?;
        match self.policy.decide(detection) {
            IngestDecision::Store(status) => {
                let candidate = self.store.insert_candidate(detection, status, now).await?;
                Ok(IngestOutcome::Stored(candidate))
            }
            IngestDecision::Discard => Ok(IngestOutcome::Discarded {
                effective_score: detection.effective_score(),
            }),
        }
    }

    /// Materialize the ordered listing for `filter` as seen by `reviewer_id`.
    pub async fn list(
        &self,
        filter: QueueFilter,
        reviewer_id: DbId,
        now: Timestamp,
    ) -> Result<Vec<QueueEntry>, CoreError> {
        let status = match filter {
            QueueFilter::Pending => Some(CandidateStatus::PendingReview),
            QueueFilter::All | QueueFilter::Claimed => None,
        };
        let candidates = self.store.list_candidates(status).await?;
        let claims: HashMap<DbId, Claim> = self
            .store
            .active_claims(now)
            .await?
            .into_iter()
            .map(|c| (c.candidate_id, c))
            .collect();

        let mut entries: Vec<QueueEntry> = candidates
            .into_iter()
            .map(|candidate| QueueEntry {
                effective_score: candidate.effective_score(),
                claim: claims.get(&candidate.id).cloned(),
                candidate,
            })
            .filter(|e| match filter {
                QueueFilter::Claimed => e.claim.as_ref().is_some_and(|c| c.is_held_by(reviewer_id)),
                QueueFilter::All | QueueFilter::Pending => true,
            })
            .collect();
        entries.sort_by(queue_order);
        Ok(entries)
    }

    /// A single candidate with its active claim.
    pub async fn get(&self, candidate_id: DbId, now: Timestamp) -> Result<QueueEntry, CoreError> {
        let candidate = self.require_candidate(candidate_id).await?;
        let claim = self.store.get_claim(candidate_id, now).await?;
        Ok(QueueEntry {
            effective_score: candidate.effective_score(),
            claim,
            candidate,
        })
    }

    /// Acquire (or refresh) a claim. Fails with [`CoreError::ClaimConflict`]
    /// while another reviewer holds an active claim.
    pub async fn claim(
        &self,
        candidate_id: DbId,
        reviewer: Reviewer,
        now: Timestamp,
    ) -> Result<Claim, CoreError> {
        reviewer.authorize()?;
        match self
            .store
            .try_claim(candidate_id, reviewer.id, now, self.claim_ttl)
            .await?
        {
            ClaimAttempt::Acquired(claim) => Ok(claim),
            ClaimAttempt::Held(existing) => Err(existing.conflict()),
        }
    }

    /// Release a claim held by `reviewer`.
    pub async fn release(
        &self,
        candidate_id: DbId,
        reviewer: Reviewer,
        now: Timestamp,
    ) -> Result<(), CoreError> {
        reviewer.authorize()?;
        self.require_candidate(candidate_id).await?;
        if self.store.release_claim(candidate_id, reviewer.id, now).await? {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "Reviewer {} does not hold a claim on candidate {candidate_id}",
                reviewer.id
            )))
        }
    }

    /// Push the expiry of a claim held by `reviewer` out by one TTL.
    pub async fn extend(
        &self,
        candidate_id: DbId,
        reviewer: Reviewer,
        now: Timestamp,
    ) -> Result<Claim, CoreError> {
        reviewer.authorize()?;
        self.require_candidate(candidate_id).await?;
        self.store
            .extend_claim(candidate_id, reviewer.id, now, self.claim_ttl)
            .await?
            .ok_or_else(|| {
                CoreError::Forbidden(format!(
                    "Reviewer {} does not hold a claim on candidate {candidate_id}",
                    reviewer.id
                ))
            })
    }

    /// Apply a review action.
    ///
    /// The transition is checked before anything is touched, so an invalid
    /// `(status, action)` pair leaves the candidate and its claim as they
    /// were. An unclaimed candidate is claimed implicitly; the claim is
    /// released together with the status change.
    pub async fn resolve(
        &self,
        candidate_id: DbId,
        reviewer: Reviewer,
        resolution: Resolution,
        now: Timestamp,
    ) -> Result<Resolved, CoreError> {
        reviewer.authorize()?;
        validate_review_text(resolution.note.as_deref(), resolution.reason.as_deref())?;

        let candidate = self.require_candidate(candidate_id).await?;
        let to_status = transition(candidate.status, resolution.action)?;

        let already_held = self
            .store
            .get_claim(candidate_id, now)
            .await?
            .is_some_and(|claim| claim.reviewer_id == reviewer.id);
        if let ClaimAttempt::Held(existing) = self
            .store
            .try_claim(candidate_id, reviewer.id, now, self.claim_ttl)
            .await?
        {
            return Err(existing.conflict());
        }

        let record = TransitionRecord {
            candidate_id,
            reviewer_id: reviewer.id,
            action: resolution.action,
            from_status: candidate.status,
            to_status,
            note: resolution.note,
            reason: resolution.reason,
            created_at: now,
        };
        let applied = match self.store.apply_transition(&record).await {
            Ok(applied) => applied,
            Err(err) => {
                // A claim taken only for this call must not outlive it.
                if !already_held {
                    self.store.release_claim(candidate_id, reviewer.id, now).await?;
                }
                return Err(err);
            }
        };
        match applied {
            Some(candidate) => Ok(Resolved {
                candidate,
                transition: record,
            }),
            None => {
                self.store.release_claim(candidate_id, reviewer.id, now).await?;
                Err(CoreError::Conflict(format!(
                    "Candidate {candidate_id} changed status while being resolved"
                )))
            }
        }
    }

    /// Transition log for a candidate, oldest first.
    pub async fn history(&self, candidate_id: DbId) -> Result<Vec<TransitionRecord>, CoreError> {
        self.require_candidate(candidate_id).await?;
        self.store.transitions(candidate_id).await
    }

    /// Deactivate every expired claim. Returns the number released.
    pub async fn expire_claims(&self, now: Timestamp) -> Result<u64, CoreError> {
        self.store.expire_claims(now).await
    }

    async fn require_candidate(&self, id: DbId) -> Result<RecognitionCandidate, CoreError> {
        self.store
            .get_candidate(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "RecognitionCandidate",
                id,
            })
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::candidate::BoundingBox;
    use crate::ingest::ThresholdPolicy;
    use crate::store::MemoryStore;

    const A: Reviewer = Reviewer {
        id: 1,
        can_validate: true,
    };
    const B: Reviewer = Reviewer {
        id: 2,
        can_validate: true,
    };

    fn queue() -> ValidationQueue {
        ValidationQueue::new(
            Arc::new(MemoryStore::new()),
            Arc::new(ThresholdPolicy::new(0.9, None).unwrap()),
        )
    }

    fn detection(image_id: DbId, athlete_id: DbId, confidence: f64, minute: u32) -> Detection {
        Detection {
            image_id,
            athlete_id,
            confidence,
            temporal_boost: 0.0,
            bounding_box: BoundingBox {
                left: 0.1,
                top: 0.1,
                width: 0.3,
                height: 0.3,
            },
            captured_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 0).unwrap(),
        }
    }

    async fn pending(q: &ValidationQueue, image_id: DbId) -> RecognitionCandidate {
        match q.ingest(&detection(image_id, 1, 0.6, 0), Utc::now()).await.unwrap() {
            IngestOutcome::Stored(c) => c,
            other => panic!("expected stored candidate, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn boosted_detection_auto_approves_and_override_is_audited() {
        let q = queue();
        let now = Utc::now();
        let mut d = detection(1, 1, 0.92, 0);
        d.temporal_boost = 0.05;
        let IngestOutcome::Stored(c) = q.ingest(&d, now).await.unwrap() else {
            panic!("expected stored candidate");
        };
        assert_eq!(c.status, CandidateStatus::AutoApproved);

        let resolved = q
            .resolve(c.id, A, Resolution::new(ReviewAction::OverrideReject), now)
            .await
            .unwrap();
        assert_eq!(resolved.candidate.status, CandidateStatus::Rejected);

        let log = q.history(c.id).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].from_status, CandidateStatus::AutoApproved);
        assert_eq!(log[0].to_status, CandidateStatus::Rejected);
        assert_eq!(log[0].reviewer_id, A.id);
    }

    #[tokio::test]
    async fn second_reviewer_conflicts_until_release() {
        let q = queue();
        let now = Utc::now();
        let c = pending(&q, 1).await;

        q.claim(c.id, A, now).await.unwrap();
        assert_matches!(
            q.claim(c.id, B, now).await,
            Err(CoreError::ClaimConflict { held_by, .. }) if held_by == A.id
        );
        // Original claim intact.
        assert_eq!(q.get(c.id, now).await.unwrap().claim.unwrap().reviewer_id, A.id);

        q.release(c.id, A, now).await.unwrap();
        let claim = q.claim(c.id, B, now).await.unwrap();
        assert_eq!(claim.reviewer_id, B.id);
    }

    #[tokio::test]
    async fn release_by_non_holder_is_forbidden() {
        let q = queue();
        let now = Utc::now();
        let c = pending(&q, 1).await;
        q.claim(c.id, A, now).await.unwrap();
        assert_matches!(q.release(c.id, B, now).await, Err(CoreError::Forbidden(_)));
    }

    #[tokio::test]
    async fn expired_claim_can_be_taken_over() {
        let q = queue().with_claim_ttl(Duration::minutes(5));
        let now = Utc::now();
        let c = pending(&q, 1).await;
        q.claim(c.id, A, now).await.unwrap();
        let later = now + Duration::minutes(6);
        assert_eq!(q.claim(c.id, B, later).await.unwrap().reviewer_id, B.id);
    }

    #[tokio::test]
    async fn extend_pushes_expiry_for_holder_only() {
        let q = queue();
        let now = Utc::now();
        let c = pending(&q, 1).await;
        q.claim(c.id, A, now).await.unwrap();
        let later = now + Duration::minutes(10);
        let extended = q.extend(c.id, A, later).await.unwrap();
        assert_eq!(extended.expires_at, later + q.claim_ttl());
        assert_matches!(q.extend(c.id, B, later).await, Err(CoreError::Forbidden(_)));
    }

    #[tokio::test]
    async fn resolve_requires_claim_or_none() {
        let q = queue();
        let now = Utc::now();
        let c = pending(&q, 1).await;
        q.claim(c.id, A, now).await.unwrap();

        assert_matches!(
            q.resolve(c.id, B, Resolution::new(ReviewAction::Approve), now).await,
            Err(CoreError::ClaimConflict { .. })
        );
        let resolved = q
            .resolve(c.id, A, Resolution::new(ReviewAction::Approve), now)
            .await
            .unwrap();
        assert_eq!(resolved.candidate.status, CandidateStatus::Approved);
        // Released atomically with the transition.
        assert!(q.get(c.id, now).await.unwrap().claim.is_none());
    }

    #[tokio::test]
    async fn unclaimed_candidate_is_resolved_with_implicit_claim() {
        let q = queue();
        let now = Utc::now();
        let c = pending(&q, 1).await;
        let resolution = Resolution {
            action: ReviewAction::Reject,
            note: Some("number not visible".into()),
            reason: Some("wrong athlete".into()),
        };
        let resolved = q.resolve(c.id, B, resolution, now).await.unwrap();
        assert_eq!(resolved.candidate.status, CandidateStatus::Rejected);
        assert_eq!(resolved.transition.reason.as_deref(), Some("wrong athlete"));
        assert!(q.get(c.id, now).await.unwrap().claim.is_none());
    }

    /// Delegates to a [`MemoryStore`] but fails every status update.
    struct FailingTransitions(MemoryStore);

    #[async_trait]
    impl QueueStore for FailingTransitions {
        async fn insert_candidate(
            &self,
            detection: &Detection,
            status: CandidateStatus,
            now: Timestamp,
        ) -> Result<RecognitionCandidate, CoreError> {
            self.0.insert_candidate(detection, status, now).await
        }

        async fn get_candidate(&self, id: DbId) -> Result<Option<RecognitionCandidate>, CoreError> {
            self.0.get_candidate(id).await
        }

        async fn list_candidates(
            &self,
            status: Option<CandidateStatus>,
        ) -> Result<Vec<RecognitionCandidate>, CoreError> {
            self.0.list_candidates(status).await
        }

        async fn active_claims(&self, now: Timestamp) -> Result<Vec<Claim>, CoreError> {
            self.0.active_claims(now).await
        }

        async fn get_claim(
            &self,
            candidate_id: DbId,
            now: Timestamp,
        ) -> Result<Option<Claim>, CoreError> {
            self.0.get_claim(candidate_id, now).await
        }

        async fn try_claim(
            &self,
            candidate_id: DbId,
            reviewer_id: DbId,
            now: Timestamp,
            ttl: chrono::Duration,
        ) -> Result<ClaimAttempt, CoreError> {
            self.0.try_claim(candidate_id, reviewer_id, now, ttl).await
        }

        async fn release_claim(
            &self,
            candidate_id: DbId,
            reviewer_id: DbId,
            now: Timestamp,
        ) -> Result<bool, CoreError> {
            self.0.release_claim(candidate_id, reviewer_id, now).await
        }

        async fn extend_claim(
            &self,
            candidate_id: DbId,
            reviewer_id: DbId,
            now: Timestamp,
            ttl: chrono::Duration,
        ) -> Result<Option<Claim>, CoreError> {
            self.0.extend_claim(candidate_id, reviewer_id, now, ttl).await
        }

        async fn expire_claims(&self, now: Timestamp) -> Result<u64, CoreError> {
            self.0.expire_claims(now).await
        }

        async fn apply_transition(
            &self,
            _record: &TransitionRecord,
        ) -> Result<Option<RecognitionCandidate>, CoreError> {
            Err(CoreError::StoreUnavailable("connection reset".into()))
        }

        async fn transitions(&self, candidate_id: DbId) -> Result<Vec<TransitionRecord>, CoreError> {
            self.0.transitions(candidate_id).await
        }
    }

    fn failing_queue() -> ValidationQueue {
        ValidationQueue::new(
            Arc::new(FailingTransitions(MemoryStore::new())),
            Arc::new(ThresholdPolicy::new(0.9, None).unwrap()),
        )
    }

    #[tokio::test]
    async fn failed_resolve_releases_implicit_claim() {
        let q = failing_queue();
        let now = Utc::now();
        let c = pending(&q, 1).await;

        assert_matches!(
            q.resolve(c.id, A, Resolution::new(ReviewAction::Approve), now).await,
            Err(CoreError::StoreUnavailable(_))
        );
        let entry = q.get(c.id, now).await.unwrap();
        assert!(entry.claim.is_none());
        assert_eq!(entry.candidate.status, CandidateStatus::PendingReview);

        // Another reviewer is not locked out by the failed attempt.
        q.claim(c.id, B, now).await.unwrap();
    }

    #[tokio::test]
    async fn failed_resolve_keeps_explicit_claim() {
        let q = failing_queue();
        let now = Utc::now();
        let c = pending(&q, 1).await;
        q.claim(c.id, A, now).await.unwrap();

        assert_matches!(
            q.resolve(c.id, A, Resolution::new(ReviewAction::Approve), now).await,
            Err(CoreError::StoreUnavailable(_))
        );
        let claim = q.get(c.id, now).await.unwrap().claim.unwrap();
        assert_eq!(claim.reviewer_id, A.id);
    }

    #[tokio::test]
    async fn invalid_transition_leaves_state_untouched() {
        let q = queue();
        let now = Utc::now();
        let c = pending(&q, 1).await;
        assert_matches!(
            q.resolve(c.id, A, Resolution::new(ReviewAction::Reassign), now).await,
            Err(CoreError::InvalidTransition {
                from: CandidateStatus::PendingReview,
                action: ReviewAction::Reassign
            })
        );
        let entry = q.get(c.id, now).await.unwrap();
        assert_eq!(entry.candidate.status, CandidateStatus::PendingReview);
        assert!(entry.claim.is_none());
        assert!(q.history(c.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reassign_returns_to_pending() {
        let q = queue();
        let now = Utc::now();
        let c = pending(&q, 1).await;
        q.resolve(c.id, A, Resolution::new(ReviewAction::Approve), now)
            .await
            .unwrap();
        let resolved = q
            .resolve(c.id, B, Resolution::new(ReviewAction::Reassign), now)
            .await
            .unwrap();
        assert_eq!(resolved.candidate.status, CandidateStatus::PendingReview);
        assert_eq!(q.history(c.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn reviewer_without_capability_is_unauthorized() {
        let q = queue();
        let now = Utc::now();
        let c = pending(&q, 1).await;
        let viewer = Reviewer {
            id: 9,
            can_validate: false,
        };
        assert_matches!(q.claim(c.id, viewer, now).await, Err(CoreError::Unauthorized(_)));
        assert_matches!(
            q.resolve(c.id, viewer, Resolution::new(ReviewAction::Approve), now).await,
            Err(CoreError::Unauthorized(_))
        );
    }

    #[tokio::test]
    async fn listing_is_ordered_and_filtered() {
        let q = queue();
        let now = Utc::now();
        // Ingest out of order; ties on capture time break by image then athlete.
        for (image, athlete, minute) in [(3, 1, 5), (2, 2, 0), (2, 1, 0), (1, 1, 10)] {
            q.ingest(&detection(image, athlete, 0.6, minute), now).await.unwrap();
        }
        q.ingest(&detection(9, 9, 0.95, 1), now).await.unwrap();

        let listing = q.list(QueueFilter::Pending, A.id, now).await.unwrap();
        let keys: Vec<(DbId, DbId)> = listing
            .iter()
            .map(|e| (e.candidate.image_id, e.candidate.athlete_id))
            .collect();
        assert_eq!(keys, vec![(2, 1), (2, 2), (3, 1), (1, 1)]);

        let all = q.list(QueueFilter::All, A.id, now).await.unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(all[2].candidate.status, CandidateStatus::AutoApproved);

        q.claim(listing[1].candidate.id, A, now).await.unwrap();
        let mine = q.list(QueueFilter::Claimed, A.id, now).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert!(q.list(QueueFilter::Claimed, B.id, now).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn weak_detection_is_discarded() {
        let q = ValidationQueue::new(
            Arc::new(MemoryStore::new()),
            Arc::new(ThresholdPolicy::default()),
        );
        assert_matches!(
            q.ingest(&detection(1, 1, 0.2, 0), Utc::now()).await.unwrap(),
            IngestOutcome::Discarded { .. }
        );
        assert!(q.list(QueueFilter::All, A.id, Utc::now()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn expire_claims_frees_candidates() {
        let q = queue().with_claim_ttl(Duration::minutes(1));
        let now = Utc::now();
        let c = pending(&q, 1).await;
        q.claim(c.id, A, now).await.unwrap();
        assert_eq!(q.expire_claims(now + Duration::minutes(2)).await.unwrap(), 1);
    }

    #[test]
    fn cursor_clamps_low_and_runs_past_end() {
        let cursor = QueueCursor::default().previous();
        assert_eq!(cursor.position(), 0);
        let cursor = cursor.next().next().next();
        assert_eq!(cursor.position(), 3);
        assert!(cursor.is_exhausted(&[]));
        assert!(cursor.entry(&[]).is_none());
    }

    #[test]
    fn filter_change_resets_cursor() {
        let session = QueueSession {
            filter: QueueFilter::Pending,
            cursor: QueueCursor(4),
        };
        assert_eq!(session.with_filter(QueueFilter::Pending).cursor.position(), 4);
        let switched = session.with_filter(QueueFilter::All);
        assert_eq!(switched.filter, QueueFilter::All);
        assert_eq!(switched.cursor.position(), 0);
    }

    #[test]
    fn page_request_clamps_limit() {
        assert_eq!(PageRequest::new(None, None).limit, DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::new(Some(0), Some(1_000)), PageRequest { page: 1, limit: MAX_PAGE_SIZE });
    }

    #[tokio::test]
    async fn pages_slice_the_listing() {
        let q = queue();
        let now = Utc::now();
        for image in 1..=5 {
            q.ingest(&detection(image, 1, 0.6, 0), now).await.unwrap();
        }
        let listing = q.list(QueueFilter::Pending, A.id, now).await.unwrap();

        let page = QueuePage::from_listing(&listing, PageRequest::new(Some(2), Some(2)));
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_more);
        assert_eq!(page.items[0].candidate.image_id, 3);

        let last = QueuePage::from_listing(&listing, PageRequest::new(Some(3), Some(2)));
        assert_eq!(last.items.len(), 1);
        assert!(!last.has_more);

        let beyond = QueuePage::from_listing(&listing, PageRequest::new(Some(9), Some(2)));
        assert!(beyond.items.is_empty());
    }

    #[test]
    fn filter_parses_known_values() {
        assert_eq!("claimed".parse::<QueueFilter>().unwrap(), QueueFilter::Claimed);
        assert!("done".parse::<QueueFilter>().is_err());
    }
}
