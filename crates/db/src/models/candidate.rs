//! `recognition_candidates` rows.

use sqlx::FromRow;
use vinco_core::candidate::{BoundingBox, RecognitionCandidate};
use vinco_core::types::{DbId, Timestamp};

use super::status::{decode_status, StatusId};

/// A row from the `recognition_candidates` table.
#[derive(Debug, Clone, FromRow)]
pub struct CandidateRow {
    pub id: DbId,
    pub image_id: DbId,
    pub athlete_id: DbId,
    pub confidence: f64,
    pub temporal_boost: f64,
    pub bbox_left: f64,
    pub bbox_top: f64,
    pub bbox_width: f64,
    pub bbox_height: f64,
    pub status_id: StatusId,
    pub captured_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<CandidateRow> for RecognitionCandidate {
    type Error = sqlx::Error;

    fn try_from(row: CandidateRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            image_id: row.image_id,
            athlete_id: row.athlete_id,
            confidence: row.confidence,
            temporal_boost: row.temporal_boost,
            bounding_box: BoundingBox {
                left: row.bbox_left,
                top: row.bbox_top,
                width: row.bbox_width,
                height: row.bbox_height,
            },
            status: decode_status(row.status_id)?,
            captured_at: row.captured_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
