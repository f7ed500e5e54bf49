//! `candidate_claims` rows.

use sqlx::FromRow;
use vinco_core::claims::Claim;
use vinco_core::types::{DbId, Timestamp};

/// A row from the `candidate_claims` table.
#[derive(Debug, Clone, FromRow)]
pub struct ClaimRow {
    pub id: DbId,
    pub candidate_id: DbId,
    pub reviewer_id: DbId,
    pub claimed_at: Timestamp,
    pub expires_at: Timestamp,
    pub released_at: Option<Timestamp>,
    pub is_active: bool,
}

impl From<ClaimRow> for Claim {
    fn from(row: ClaimRow) -> Self {
        Self {
            candidate_id: row.candidate_id,
            reviewer_id: row.reviewer_id,
            claimed_at: row.claimed_at,
            expires_at: row.expires_at,
        }
    }
}
