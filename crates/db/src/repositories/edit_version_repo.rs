//! Repository for the `edit_versions` table.
//!
//! Versions are immutable snapshots; nothing here updates or deletes.

use sqlx::types::Json;
use sqlx::PgExecutor;
use vinco_core::edits::EditParameters;
use vinco_core::types::{DbId, Timestamp, VersionNumber};

use crate::models::edit_version::EditVersionRow;

/// Column list for edit_versions queries.
const COLUMNS: &str = "id, image_id, version, parameters, author_id, reverted_from, created_at";

pub struct EditVersionRepo;

impl EditVersionRepo {
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        executor: impl PgExecutor<'_>,
        image_id: DbId,
        version: VersionNumber,
        parameters: &EditParameters,
        author_id: DbId,
        reverted_from: Option<VersionNumber>,
        now: Timestamp,
    ) -> Result<EditVersionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO edit_versions \
                 (image_id, version, parameters, author_id, reverted_from, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EditVersionRow>(&query)
            .bind(image_id)
            .bind(version)
            .bind(Json(parameters))
            .bind(author_id)
            .bind(reverted_from)
            .bind(now)
            .fetch_one(executor)
            .await
    }

    /// Serialize version assignment for one image until the surrounding
    /// transaction ends.
    pub async fn lock_image(executor: impl PgExecutor<'_>, image_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(image_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Highest version number for an image (0 if none exist).
    pub async fn get_latest_version_number(
        executor: impl PgExecutor<'_>,
        image_id: DbId,
    ) -> Result<VersionNumber, sqlx::Error> {
        let result: Option<(VersionNumber,)> = sqlx::query_as(
            "SELECT COALESCE(MAX(version), 0) FROM edit_versions WHERE image_id = $1",
        )
        .bind(image_id)
        .fetch_optional(executor)
        .await?;

        Ok(result.map(|(v,)| v).unwrap_or(0))
    }

    pub async fn find_latest(
        executor: impl PgExecutor<'_>,
        image_id: DbId,
    ) -> Result<Option<EditVersionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM edit_versions \
             WHERE image_id = $1 \
             ORDER BY version DESC LIMIT 1"
        );
        sqlx::query_as::<_, EditVersionRow>(&query)
            .bind(image_id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_image_and_version(
        executor: impl PgExecutor<'_>,
        image_id: DbId,
        version: VersionNumber,
    ) -> Result<Option<EditVersionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM edit_versions \
             WHERE image_id = $1 AND version = $2"
        );
        sqlx::query_as::<_, EditVersionRow>(&query)
            .bind(image_id)
            .bind(version)
            .fetch_optional(executor)
            .await
    }

    /// All versions for an image, newest first.
    pub async fn list_by_image(
        executor: impl PgExecutor<'_>,
        image_id: DbId,
    ) -> Result<Vec<EditVersionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM edit_versions \
             WHERE image_id = $1 \
             ORDER BY version DESC"
        );
        sqlx::query_as::<_, EditVersionRow>(&query)
            .bind(image_id)
            .fetch_all(executor)
            .await
    }
}
