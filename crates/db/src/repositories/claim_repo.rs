//! Repository for the `candidate_claims` table.
//!
//! Active claims are rows with `is_active = true`; the partial unique index
//! `uq_candidate_claims_active` guarantees at most one per candidate.
//! Released and expired claims are kept with `released_at` set.

use sqlx::PgExecutor;
use vinco_core::types::{DbId, Timestamp};

use crate::models::claim::ClaimRow;

/// Column list for candidate_claims queries.
const COLUMNS: &str = "id, candidate_id, reviewer_id, claimed_at, expires_at, released_at, is_active";

pub struct ClaimRepo;

impl ClaimRepo {
    /// Insert an active claim unless one already exists.
    ///
    /// `INSERT ... ON CONFLICT DO NOTHING` against the partial unique index:
    /// returns `None` when another active claim won.
    pub async fn try_insert(
        executor: impl PgExecutor<'_>,
        candidate_id: DbId,
        reviewer_id: DbId,
        now: Timestamp,
        expires_at: Timestamp,
    ) -> Result<Option<ClaimRow>, sqlx::Error> {
        let query = format!(
            "INSERT INTO candidate_claims \
                 (candidate_id, reviewer_id, claimed_at, expires_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $3, $3) \
             ON CONFLICT (candidate_id) WHERE is_active = true \
             DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClaimRow>(&query)
            .bind(candidate_id)
            .bind(reviewer_id)
            .bind(now)
            .bind(expires_at)
            .fetch_optional(executor)
            .await
    }

    /// Move the expiry of an unexpired claim held by `reviewer_id`.
    pub async fn extend(
        executor: impl PgExecutor<'_>,
        candidate_id: DbId,
        reviewer_id: DbId,
        now: Timestamp,
        expires_at: Timestamp,
    ) -> Result<Option<ClaimRow>, sqlx::Error> {
        let query = format!(
            "UPDATE candidate_claims SET expires_at = $4, updated_at = $3 \
             WHERE candidate_id = $1 AND reviewer_id = $2 \
               AND is_active = true AND expires_at > $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClaimRow>(&query)
            .bind(candidate_id)
            .bind(reviewer_id)
            .bind(now)
            .bind(expires_at)
            .fetch_optional(executor)
            .await
    }

    /// Release an unexpired claim held by `reviewer_id`.
    pub async fn release(
        executor: impl PgExecutor<'_>,
        candidate_id: DbId,
        reviewer_id: DbId,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE candidate_claims SET is_active = false, released_at = $3, updated_at = $3 \
             WHERE candidate_id = $1 AND reviewer_id = $2 \
               AND is_active = true AND expires_at > $3",
        )
        .bind(candidate_id)
        .bind(reviewer_id)
        .bind(now)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Release whatever claim is active on a candidate, regardless of holder.
    pub async fn release_any(
        executor: impl PgExecutor<'_>,
        candidate_id: DbId,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE candidate_claims SET is_active = false, released_at = $2, updated_at = $2 \
             WHERE candidate_id = $1 AND is_active = true",
        )
        .bind(candidate_id)
        .bind(now)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// The unexpired active claim on a candidate.
    pub async fn get_active(
        executor: impl PgExecutor<'_>,
        candidate_id: DbId,
        now: Timestamp,
    ) -> Result<Option<ClaimRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM candidate_claims \
             WHERE candidate_id = $1 AND is_active = true AND expires_at > $2"
        );
        sqlx::query_as::<_, ClaimRow>(&query)
            .bind(candidate_id)
            .bind(now)
            .fetch_optional(executor)
            .await
    }

    pub async fn list_active(
        executor: impl PgExecutor<'_>,
        now: Timestamp,
    ) -> Result<Vec<ClaimRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM candidate_claims \
             WHERE is_active = true AND expires_at > $1"
        );
        sqlx::query_as::<_, ClaimRow>(&query)
            .bind(now)
            .fetch_all(executor)
            .await
    }

    /// Deactivate expired claims, optionally only for one candidate.
    /// Returns the number released.
    pub async fn expire(
        executor: impl PgExecutor<'_>,
        candidate_id: Option<DbId>,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE candidate_claims SET is_active = false, released_at = expires_at, updated_at = $2 \
             WHERE is_active = true AND expires_at <= $2 \
               AND ($1::BIGINT IS NULL OR candidate_id = $1)",
        )
        .bind(candidate_id)
        .bind(now)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
