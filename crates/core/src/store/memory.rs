//! In-process implementation of the store traits.
//!
//! All state sits behind one `tokio::sync::Mutex`, which makes every
//! operation (including claim compare-and-set) linearizable within a single
//! process. Used by tests and when the API runs without `DATABASE_URL`.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{EditHistoryStore, QueueStore};
use crate::candidate::{CandidateStatus, Detection, RecognitionCandidate, TransitionRecord};
use crate::claims::{Claim, ClaimAttempt};
use crate::edits::EditParameters;
use crate::error::CoreError;
use crate::history::EditVersion;
use crate::types::{DbId, Timestamp, VersionNumber};

#[derive(Default)]
struct MemoryState {
    next_candidate_id: DbId,
    candidates: BTreeMap<DbId, RecognitionCandidate>,
    claims: HashMap<DbId, Claim>,
    transitions: Vec<TransitionRecord>,
    next_version_id: DbId,
    versions: HashMap<DbId, Vec<EditVersion>>,
}

/// Mutex-guarded in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueueStore for MemoryStore {
    async fn insert_candidate(
        &self,
        detection: &Detection,
        status: CandidateStatus,
        now: Timestamp,
    ) -> Result<RecognitionCandidate, CoreError> {
        let mut state = self.state.lock().await;
        let duplicate = state.candidates.values().any(|c| {
            c.image_id == detection.image_id && c.athlete_id == detection.athlete_id
        });
        if duplicate {
            return Err(CoreError::Conflict(format!(
                "Athlete {} is already a candidate on image {}",
                detection.athlete_id, detection.image_id
            )));
        }

        state.next_candidate_id += 1;
        let candidate = RecognitionCandidate {
            id: state.next_candidate_id,
            image_id: detection.image_id,
            athlete_id: detection.athlete_id,
            confidence: detection.confidence,
            temporal_boost: detection.temporal_boost,
            bounding_box: detection.bounding_box,
            status,
            captured_at: detection.captured_at,
            created_at: now,
            updated_at: now,
        };
        state.candidates.insert(candidate.id, candidate.clone());
        Ok(candidate)
    }

    async fn get_candidate(&self, id: DbId) -> Result<Option<RecognitionCandidate>, CoreError> {
        Ok(self.state.lock().await.candidates.get(&id).cloned())
    }

    async fn list_candidates(
        &self,
        status: Option<CandidateStatus>,
    ) -> Result<Vec<RecognitionCandidate>, CoreError> {
        let state = self.state.lock().await;
        Ok(state
            .candidates
            .values()
            .filter(|c| status.map_or(true, |s| c.status == s))
            .cloned()
            .collect())
    }

    async fn active_claims(&self, now: Timestamp) -> Result<Vec<Claim>, CoreError> {
        let state = self.state.lock().await;
        Ok(state
            .claims
            .values()
            .filter(|c| !c.is_expired(now))
            .cloned()
            .collect())
    }

    async fn get_claim(
        &self,
        candidate_id: DbId,
        now: Timestamp,
    ) -> Result<Option<Claim>, CoreError> {
        let state = self.state.lock().await;
        Ok(state
            .claims
            .get(&candidate_id)
            .filter(|c| !c.is_expired(now))
            .cloned())
    }

    async fn try_claim(
        &self,
        candidate_id: DbId,
        reviewer_id: DbId,
        now: Timestamp,
        ttl: chrono::Duration,
    ) -> Result<ClaimAttempt, CoreError> {
        let mut state = self.state.lock().await;
        if !state.candidates.contains_key(&candidate_id) {
            return Err(CoreError::NotFound {
                entity: "RecognitionCandidate",
                id: candidate_id,
            });
        }

        let claim = match state.claims.get(&candidate_id) {
            Some(existing) if !existing.is_expired(now) => {
                if !existing.is_held_by(reviewer_id) {
                    return Ok(ClaimAttempt::Held(existing.clone()));
                }
                Claim {
                    expires_at: now + ttl,
                    ..existing.clone()
                }
            }
            _ => Claim::new(candidate_id, reviewer_id, now, ttl),
        };
        state.claims.insert(candidate_id, claim.clone());
        Ok(ClaimAttempt::Acquired(claim))
    }

    async fn release_claim(
        &self,
        candidate_id: DbId,
        reviewer_id: DbId,
        now: Timestamp,
    ) -> Result<bool, CoreError> {
        let mut state = self.state.lock().await;
        let held = state
            .claims
            .get(&candidate_id)
            .is_some_and(|c| c.is_held_by(reviewer_id) && !c.is_expired(now));
        if held {
            state.claims.remove(&candidate_id);
        }
        Ok(held)
    }

    async fn extend_claim(
        &self,
        candidate_id: DbId,
        reviewer_id: DbId,
        now: Timestamp,
        ttl: chrono::Duration,
    ) -> Result<Option<Claim>, CoreError> {
        let mut state = self.state.lock().await;
        match state.claims.get_mut(&candidate_id) {
            Some(claim) if claim.is_held_by(reviewer_id) && !claim.is_expired(now) => {
                claim.expires_at = now + ttl;
                Ok(Some(claim.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn expire_claims(&self, now: Timestamp) -> Result<u64, CoreError> {
        let mut state = self.state.lock().await;
        let before = state.claims.len();
        state.claims.retain(|_, c| !c.is_expired(now));
        Ok((before - state.claims.len()) as u64)
    }

    async fn apply_transition(
        &self,
        record: &TransitionRecord,
    ) -> Result<Option<RecognitionCandidate>, CoreError> {
        let mut state = self.state.lock().await;
        let candidate = match state.candidates.get_mut(&record.candidate_id) {
            Some(c) => c,
            None => {
                return Err(CoreError::NotFound {
                    entity: "RecognitionCandidate",
                    id: record.candidate_id,
                })
            }
        };
        if candidate.status != record.from_status {
            return Ok(None);
        }
        candidate.status = record.to_status;
        candidate.updated_at = record.created_at;
        let updated = candidate.clone();

        state.transitions.push(record.clone());
        state.claims.remove(&record.candidate_id);
        Ok(Some(updated))
    }

    async fn transitions(&self, candidate_id: DbId) -> Result<Vec<TransitionRecord>, CoreError> {
        let state = self.state.lock().await;
        Ok(state
            .transitions
            .iter()
            .filter(|t| t.candidate_id == candidate_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EditHistoryStore for MemoryStore {
    async fn append_version(
        &self,
        image_id: DbId,
        parameters: &EditParameters,
        author_id: DbId,
        reverted_from: Option<VersionNumber>,
        now: Timestamp,
    ) -> Result<EditVersion, CoreError> {
        let mut state = self.state.lock().await;
        state.next_version_id += 1;
        let id = state.next_version_id;
        let log = state.versions.entry(image_id).or_default();
        let version = EditVersion {
            id,
            image_id,
            version: log.last().map_or(1, |v| v.version + 1),
            parameters: parameters.clone(),
            author_id,
            reverted_from,
            created_at: now,
        };
        log.push(version.clone());
        Ok(version)
    }

    async fn latest_version(&self, image_id: DbId) -> Result<Option<EditVersion>, CoreError> {
        let state = self.state.lock().await;
        Ok(state
            .versions
            .get(&image_id)
            .and_then(|log| log.last())
            .cloned())
    }

    async fn find_version(
        &self,
        image_id: DbId,
        version: VersionNumber,
    ) -> Result<Option<EditVersion>, CoreError> {
        let state = self.state.lock().await;
        Ok(state
            .versions
            .get(&image_id)
            .and_then(|log| log.iter().find(|v| v.version == version))
            .cloned())
    }

    async fn list_versions(&self, image_id: DbId) -> Result<Vec<EditVersion>, CoreError> {
        let state = self.state.lock().await;
        Ok(state
            .versions
            .get(&image_id)
            .map(|log| log.iter().rev().cloned().collect())
            .unwrap_or_default())
    }
}
