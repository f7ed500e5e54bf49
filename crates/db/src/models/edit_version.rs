//! `edit_versions` rows.

use sqlx::types::Json;
use sqlx::FromRow;
use vinco_core::edits::EditParameters;
use vinco_core::history::EditVersion;
use vinco_core::types::{DbId, Timestamp, VersionNumber};

/// A row from the `edit_versions` table. Parameters are stored as JSONB.
#[derive(Debug, Clone, FromRow)]
pub struct EditVersionRow {
    pub id: DbId,
    pub image_id: DbId,
    pub version: VersionNumber,
    pub parameters: Json<EditParameters>,
    pub author_id: DbId,
    pub reverted_from: Option<VersionNumber>,
    pub created_at: Timestamp,
}

impl From<EditVersionRow> for EditVersion {
    fn from(row: EditVersionRow) -> Self {
        Self {
            id: row.id,
            image_id: row.image_id,
            version: row.version,
            parameters: row.parameters.0,
            author_id: row.author_id,
            reverted_from: row.reverted_from,
            created_at: row.created_at,
        }
    }
}
