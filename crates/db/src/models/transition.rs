//! `candidate_transitions` rows.

use sqlx::FromRow;
use vinco_core::candidate::{ReviewAction, TransitionRecord};
use vinco_core::types::{DbId, Timestamp};

use super::status::{decode_status, StatusId};

/// A row from the `candidate_transitions` table.
#[derive(Debug, Clone, FromRow)]
pub struct TransitionRow {
    pub id: DbId,
    pub candidate_id: DbId,
    pub reviewer_id: DbId,
    pub action: String,
    pub from_status_id: StatusId,
    pub to_status_id: StatusId,
    pub note: Option<String>,
    pub reason: Option<String>,
    pub created_at: Timestamp,
}

/// Decode the `action` column written by [`ReviewAction::as_str`].
pub fn decode_action(value: &str) -> Result<ReviewAction, sqlx::Error> {
    match value {
        "approve" => Ok(ReviewAction::Approve),
        "reject" => Ok(ReviewAction::Reject),
        "override-reject" => Ok(ReviewAction::OverrideReject),
        "reassign" => Ok(ReviewAction::Reassign),
        other => Err(sqlx::Error::Decode(
            format!("unknown review action '{other}'").into(),
        )),
    }
}

impl TryFrom<TransitionRow> for TransitionRecord {
    type Error = sqlx::Error;

    fn try_from(row: TransitionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            candidate_id: row.candidate_id,
            reviewer_id: row.reviewer_id,
            action: decode_action(&row.action)?,
            from_status: decode_status(row.from_status_id)?,
            to_status: decode_status(row.to_status_id)?,
            note: row.note,
            reason: row.reason,
            created_at: row.created_at,
        })
    }
}
