//! Repository for the `candidate_transitions` audit log.

use sqlx::PgExecutor;
use vinco_core::candidate::TransitionRecord;
use vinco_core::types::DbId;

use crate::models::status::status_id;
use crate::models::transition::TransitionRow;

/// Column list for candidate_transitions queries.
const COLUMNS: &str = "id, candidate_id, reviewer_id, action, from_status_id, to_status_id, \
                       note, reason, created_at";

pub struct TransitionRepo;

impl TransitionRepo {
    pub async fn create(
        executor: impl PgExecutor<'_>,
        record: &TransitionRecord,
    ) -> Result<TransitionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO candidate_transitions \
                 (candidate_id, reviewer_id, action, from_status_id, to_status_id, \
                  note, reason, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TransitionRow>(&query)
            .bind(record.candidate_id)
            .bind(record.reviewer_id)
            .bind(record.action.as_str())
            .bind(status_id(record.from_status))
            .bind(status_id(record.to_status))
            .bind(record.note.as_deref())
            .bind(record.reason.as_deref())
            .bind(record.created_at)
            .fetch_one(executor)
            .await
    }

    /// Transitions for a candidate, oldest first.
    pub async fn list_by_candidate(
        executor: impl PgExecutor<'_>,
        candidate_id: DbId,
    ) -> Result<Vec<TransitionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM candidate_transitions \
             WHERE candidate_id = $1 \
             ORDER BY id"
        );
        sqlx::query_as::<_, TransitionRow>(&query)
            .bind(candidate_id)
            .fetch_all(executor)
            .await
    }
}
