//! Append-only edit snapshot log per image.
//!
//! Every save, revert or reset appends a full [`EditParameters`] snapshot.
//! Nothing is ever rewritten, so "undo" is a revert that appends a copy of
//! an older version.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::diff::FieldChange;
use crate::edits::EditParameters;
use crate::error::CoreError;
use crate::store::EditHistoryStore;
use crate::types::{DbId, Timestamp, VersionNumber};

/// One stored snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditVersion {
    pub id: DbId,
    pub image_id: DbId,
    /// Per-image, starting at 1 and strictly increasing.
    pub version: VersionNumber,
    pub parameters: EditParameters,
    pub author_id: DbId,
    /// Set when this entry was produced by reverting to an older version.
    pub reverted_from: Option<VersionNumber>,
    pub created_at: Timestamp,
}

/// The effective parameters for an image plus the version they came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentEdits {
    pub image_id: DbId,
    /// `None` when the image has never been edited.
    pub version: Option<VersionNumber>,
    pub parameters: EditParameters,
}

/// Result of comparing two versions of one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionDiff {
    pub image_id: DbId,
    pub from: VersionNumber,
    pub to: VersionNumber,
    pub changes: Vec<FieldChange>,
}

/// Edit history service.
pub struct EditHistory {
    store: Arc<dyn EditHistoryStore>,
}

impl EditHistory {
    pub fn new(store: Arc<dyn EditHistoryStore>) -> Self {
        Self { store }
    }

    /// Validate and append a snapshot. Rotation is stored normalized.
    pub async fn append(
        &self,
        image_id: DbId,
        parameters: EditParameters,
        author_id: DbId,
        now: Timestamp,
    ) -> Result<EditVersion, CoreError> {
        let parameters = parameters.validate()?;
        self.store
            .append_version(image_id, &parameters, author_id, None, now)
            .await
    }

    /// The last snapshot, or the default parameters if none exist.
    pub async fn current(&self, image_id: DbId) -> Result<CurrentEdits, CoreError> {
        let latest = self.store.latest_version(image_id).await?;
        Ok(match latest {
            Some(v) => CurrentEdits {
                image_id,
                version: Some(v.version),
                parameters: v.parameters,
            },
            None => CurrentEdits {
                image_id,
                version: None,
                parameters: EditParameters::default(),
            },
        })
    }

    /// Append a copy of `version` as the newest entry.
    pub async fn revert_to(
        &self,
        image_id: DbId,
        version: VersionNumber,
        author_id: DbId,
        now: Timestamp,
    ) -> Result<EditVersion, CoreError> {
        let target = self.require_version(image_id, version).await?;
        self.store
            .append_version(image_id, &target.parameters, author_id, Some(version), now)
            .await
    }

    /// Append the default parameters as the newest entry.
    pub async fn reset(
        &self,
        image_id: DbId,
        author_id: DbId,
        now: Timestamp,
    ) -> Result<EditVersion, CoreError> {
        self.store
            .append_version(image_id, &EditParameters::default(), author_id, None, now)
            .await
    }

    /// Every version for the image, newest first.
    pub async fn versions(&self, image_id: DbId) -> Result<Vec<EditVersion>, CoreError> {
        self.store.list_versions(image_id).await
    }

    /// Changed fields between two stored versions.
    pub async fn diff(
        &self,
        image_id: DbId,
        from: VersionNumber,
        to: VersionNumber,
    ) -> Result<VersionDiff, CoreError> {
        let before = self.require_version(image_id, from).await?;
        let after = self.require_version(image_id, to).await?;
        Ok(VersionDiff {
            image_id,
            from,
            to,
            changes: before.parameters.diff(&after.parameters),
        })
    }

    async fn require_version(
        &self,
        image_id: DbId,
        version: VersionNumber,
    ) -> Result<EditVersion, CoreError> {
        self.store
            .find_version(image_id, version)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "EditVersion",
                id: version as DbId,
            })
    }
}
