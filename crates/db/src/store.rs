//! [`PgStore`]: the PostgreSQL implementation of the core store traits.
//!
//! Multi-statement operations run in a single transaction. Claim
//! acquisition is serialized by the `uq_candidate_claims_active` partial
//! unique index; edit version numbering by a per-image advisory lock.

use async_trait::async_trait;
use vinco_core::candidate::{CandidateStatus, Detection, RecognitionCandidate, TransitionRecord};
use vinco_core::claims::{Claim, ClaimAttempt};
use vinco_core::edits::EditParameters;
use vinco_core::error::CoreError;
use vinco_core::history::EditVersion;
use vinco_core::store::{EditHistoryStore, QueueStore};
use vinco_core::types::{DbId, Timestamp, VersionNumber};

use crate::error::store_error;
use crate::models::status::status_id;
use crate::repositories::{CandidateRepo, ClaimRepo, EditVersionRepo, TransitionRepo};
use crate::DbPool;

/// Retries when a claim disappears between the failed insert and the read
/// of the current holder.
const CLAIM_RACE_RETRIES: usize = 3;

pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn require_candidate(&self, candidate_id: DbId) -> Result<(), CoreError> {
        if CandidateRepo::exists(&self.pool, candidate_id)
            .await
            .map_err(store_error)?
        {
            Ok(())
        } else {
            Err(CoreError::NotFound {
                entity: "RecognitionCandidate",
                id: candidate_id,
            })
        }
    }
}

#[async_trait]
impl QueueStore for PgStore {
    async fn insert_candidate(
        &self,
        detection: &Detection,
        status: CandidateStatus,
        now: Timestamp,
    ) -> Result<RecognitionCandidate, CoreError> {
        let row = CandidateRepo::create(&self.pool, detection, status_id(status), now)
            .await
            .map_err(|e| match store_error(e) {
                CoreError::Conflict(_) => CoreError::Conflict(format!(
                    "Athlete {} is already a candidate on image {}",
                    detection.athlete_id, detection.image_id
                )),
                other => other,
            })?;
        RecognitionCandidate::try_from(row).map_err(store_error)
    }

    async fn get_candidate(&self, id: DbId) -> Result<Option<RecognitionCandidate>, CoreError> {
        CandidateRepo::find_by_id(&self.pool, id)
            .await
            .and_then(|row| row.map(RecognitionCandidate::try_from).transpose())
            .map_err(store_error)
    }

    async fn list_candidates(
        &self,
        status: Option<CandidateStatus>,
    ) -> Result<Vec<RecognitionCandidate>, CoreError> {
        let rows = CandidateRepo::list(&self.pool, status.map(status_id))
            .await
            .map_err(store_error)?;
        rows.into_iter()
            .map(RecognitionCandidate::try_from)
            .collect::<Result<_, _>>()
            .map_err(store_error)
    }

    async fn active_claims(&self, now: Timestamp) -> Result<Vec<Claim>, CoreError> {
        let rows = ClaimRepo::list_active(&self.pool, now)
            .await
            .map_err(store_error)?;
        Ok(rows.into_iter().map(Claim::from).collect())
    }

    async fn get_claim(
        &self,
        candidate_id: DbId,
        now: Timestamp,
    ) -> Result<Option<Claim>, CoreError> {
        let row = ClaimRepo::get_active(&self.pool, candidate_id, now)
            .await
            .map_err(store_error)?;
        Ok(row.map(Claim::from))
    }

    async fn try_claim(
        &self,
        candidate_id: DbId,
        reviewer_id: DbId,
        now: Timestamp,
        ttl: chrono::Duration,
    ) -> Result<ClaimAttempt, CoreError> {
        self.require_candidate(candidate_id).await?;
        let expires_at = now + ttl;

        for _ in 0..CLAIM_RACE_RETRIES {
            let mut tx = self.pool.begin().await.map_err(store_error)?;

            // An expired claim still occupies the unique index until swept.
            ClaimRepo::expire(&mut *tx, Some(candidate_id), now)
                .await
                .map_err(store_error)?;

            // Re-claim by the holder refreshes the expiry and keeps claimed_at.
            if let Some(row) = ClaimRepo::extend(&mut *tx, candidate_id, reviewer_id, now, expires_at)
                .await
                .map_err(store_error)?
            {
                tx.commit().await.map_err(store_error)?;
                return Ok(ClaimAttempt::Acquired(row.into()));
            }

            if let Some(row) = ClaimRepo::try_insert(&mut *tx, candidate_id, reviewer_id, now, expires_at)
                .await
                .map_err(store_error)?
            {
                tx.commit().await.map_err(store_error)?;
                return Ok(ClaimAttempt::Acquired(row.into()));
            }

            let held = ClaimRepo::get_active(&mut *tx, candidate_id, now)
                .await
                .map_err(store_error)?;
            tx.commit().await.map_err(store_error)?;
            if let Some(row) = held {
                return Ok(ClaimAttempt::Held(row.into()));
            }
            tracing::debug!(candidate_id, reviewer_id, "Claim released mid-acquire, retrying");
        }

        Err(CoreError::StoreUnavailable(format!(
            "Could not settle claim on candidate {candidate_id} after {CLAIM_RACE_RETRIES} attempts"
        )))
    }

    async fn release_claim(
        &self,
        candidate_id: DbId,
        reviewer_id: DbId,
        now: Timestamp,
    ) -> Result<bool, CoreError> {
        ClaimRepo::release(&self.pool, candidate_id, reviewer_id, now)
            .await
            .map_err(store_error)
    }

    async fn extend_claim(
        &self,
        candidate_id: DbId,
        reviewer_id: DbId,
        now: Timestamp,
        ttl: chrono::Duration,
    ) -> Result<Option<Claim>, CoreError> {
        let row = ClaimRepo::extend(&self.pool, candidate_id, reviewer_id, now, now + ttl)
            .await
            .map_err(store_error)?;
        Ok(row.map(Claim::from))
    }

    async fn expire_claims(&self, now: Timestamp) -> Result<u64, CoreError> {
        ClaimRepo::expire(&self.pool, None, now)
            .await
            .map_err(store_error)
    }

    async fn apply_transition(
        &self,
        record: &TransitionRecord,
    ) -> Result<Option<RecognitionCandidate>, CoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let updated = CandidateRepo::update_status(
            &mut *tx,
            record.candidate_id,
            status_id(record.from_status),
            status_id(record.to_status),
            record.created_at,
        )
        .await
        .map_err(store_error)?;

        let Some(row) = updated else {
            let exists = CandidateRepo::exists(&mut *tx, record.candidate_id)
                .await
                .map_err(store_error)?;
            tx.rollback().await.map_err(store_error)?;
            return if exists {
                Ok(None)
            } else {
                Err(CoreError::NotFound {
                    entity: "RecognitionCandidate",
                    id: record.candidate_id,
                })
            };
        };

        TransitionRepo::create(&mut *tx, record)
            .await
            .map_err(store_error)?;
        ClaimRepo::release_any(&mut *tx, record.candidate_id, record.created_at)
            .await
            .map_err(store_error)?;
        tx.commit().await.map_err(store_error)?;

        RecognitionCandidate::try_from(row).map(Some).map_err(store_error)
    }

    async fn transitions(&self, candidate_id: DbId) -> Result<Vec<TransitionRecord>, CoreError> {
        let rows = TransitionRepo::list_by_candidate(&self.pool, candidate_id)
            .await
            .map_err(store_error)?;
        rows.into_iter()
            .map(TransitionRecord::try_from)
            .collect::<Result<_, _>>()
            .map_err(store_error)
    }
}

#[async_trait]
impl EditHistoryStore for PgStore {
    async fn append_version(
        &self,
        image_id: DbId,
        parameters: &EditParameters,
        author_id: DbId,
        reverted_from: Option<VersionNumber>,
        now: Timestamp,
    ) -> Result<EditVersion, CoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        EditVersionRepo::lock_image(&mut *tx, image_id)
            .await
            .map_err(store_error)?;
        let latest = EditVersionRepo::get_latest_version_number(&mut *tx, image_id)
            .await
            .map_err(store_error)?;
        let row = EditVersionRepo::create(
            &mut *tx,
            image_id,
            latest + 1,
            parameters,
            author_id,
            reverted_from,
            now,
        )
        .await
        .map_err(store_error)?;
        tx.commit().await.map_err(store_error)?;
        Ok(row.into())
    }

    async fn latest_version(&self, image_id: DbId) -> Result<Option<EditVersion>, CoreError> {
        let row = EditVersionRepo::find_latest(&self.pool, image_id)
            .await
            .map_err(store_error)?;
        Ok(row.map(EditVersion::from))
    }

    async fn find_version(
        &self,
        image_id: DbId,
        version: VersionNumber,
    ) -> Result<Option<EditVersion>, CoreError> {
        let row = EditVersionRepo::find_by_image_and_version(&self.pool, image_id, version)
            .await
            .map_err(store_error)?;
        Ok(row.map(EditVersion::from))
    }

    async fn list_versions(&self, image_id: DbId) -> Result<Vec<EditVersion>, CoreError> {
        let rows = EditVersionRepo::list_by_image(&self.pool, image_id)
            .await
            .map_err(store_error)?;
        Ok(rows.into_iter().map(EditVersion::from).collect())
    }
}
