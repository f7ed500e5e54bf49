//! Repository for the `recognition_candidates` table.

use sqlx::PgExecutor;
use vinco_core::candidate::Detection;
use vinco_core::types::{DbId, Timestamp};

use crate::models::candidate::CandidateRow;
use crate::models::status::StatusId;

/// Column list for recognition_candidates queries.
const COLUMNS: &str = "id, image_id, athlete_id, confidence, temporal_boost, \
                       bbox_left, bbox_top, bbox_width, bbox_height, status_id, \
                       captured_at, created_at, updated_at";

pub struct CandidateRepo;

impl CandidateRepo {
    /// Insert a candidate. Fails with a unique violation on a duplicate
    /// `(image_id, athlete_id)` pair.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        detection: &Detection,
        status_id: StatusId,
        now: Timestamp,
    ) -> Result<CandidateRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO recognition_candidates \
                 (image_id, athlete_id, confidence, temporal_boost, \
                  bbox_left, bbox_top, bbox_width, bbox_height, status_id, \
                  captured_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CandidateRow>(&query)
            .bind(detection.image_id)
            .bind(detection.athlete_id)
            .bind(detection.confidence)
            .bind(detection.temporal_boost)
            .bind(detection.bounding_box.left)
            .bind(detection.bounding_box.top)
            .bind(detection.bounding_box.width)
            .bind(detection.bounding_box.height)
            .bind(status_id)
            .bind(detection.captured_at)
            .bind(now)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<CandidateRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM recognition_candidates WHERE id = $1");
        sqlx::query_as::<_, CandidateRow>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List candidates in queue order, optionally restricted to one status.
    pub async fn list(
        executor: impl PgExecutor<'_>,
        status_id: Option<StatusId>,
    ) -> Result<Vec<CandidateRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM recognition_candidates \
             WHERE ($1::SMALLINT IS NULL OR status_id = $1) \
             ORDER BY captured_at, image_id, athlete_id, id"
        );
        sqlx::query_as::<_, CandidateRow>(&query)
            .bind(status_id)
            .fetch_all(executor)
            .await
    }

    /// Compare-and-set the status. Returns `None` if the row is no longer in
    /// `from_status_id`.
    pub async fn update_status(
        executor: impl PgExecutor<'_>,
        id: DbId,
        from_status_id: StatusId,
        to_status_id: StatusId,
        now: Timestamp,
    ) -> Result<Option<CandidateRow>, sqlx::Error> {
        let query = format!(
            "UPDATE recognition_candidates SET status_id = $3, updated_at = $4 \
             WHERE id = $1 AND status_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CandidateRow>(&query)
            .bind(id)
            .bind(from_status_id)
            .bind(to_status_id)
            .bind(now)
            .fetch_optional(executor)
            .await
    }

    pub async fn exists(executor: impl PgExecutor<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM recognition_candidates WHERE id = $1)")
                .bind(id)
                .fetch_one(executor)
                .await?;
        Ok(row.0)
    }
}
