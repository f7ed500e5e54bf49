//! Field-level comparison of two edit snapshots.
//!
//! Used to render before/after views. Only changed fields are reported;
//! values are carried as JSON so that scalar, boolean and structured fields
//! (the optional crop) share one representation.

use serde::{Deserialize, Serialize};

/// The status of a field in a snapshot comparison.
///
/// - `Added`     -- present only in the newer snapshot (e.g. a crop was set).
/// - `Removed`   -- present only in the older snapshot (crop cleared).
/// - `Changed`   -- present in both with different values.
/// - `Unchanged` -- present in both with identical values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Added,
    Removed,
    Changed,
    Unchanged,
}

impl DiffStatus {
    /// String representation for display and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
        }
    }

    /// Classify a pair of optional values.
    pub fn classify<T: PartialEq>(before: Option<&T>, after: Option<&T>) -> Self {
        match (before, after) {
            (None, None) => Self::Unchanged,
            (None, Some(_)) => Self::Added,
            (Some(_), None) => Self::Removed,
            (Some(a), Some(b)) if a == b => Self::Unchanged,
            (Some(_), Some(_)) => Self::Changed,
        }
    }
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One differing field between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Dot-separated field path, e.g. `"sharpening.amount"`.
    pub field: String,
    pub status: DiffStatus,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
}

impl FieldChange {
    /// Build a change entry, or `None` when the two sides are equal.
    pub fn between<T: PartialEq + Serialize>(
        field: &str,
        before: Option<&T>,
        after: Option<&T>,
    ) -> Option<Self> {
        let status = DiffStatus::classify(before, after);
        if status == DiffStatus::Unchanged {
            return None;
        }
        Some(Self {
            field: field.to_string(),
            status,
            before: before.and_then(|v| serde_json::to_value(v).ok()),
            after: after.and_then(|v| serde_json::to_value(v).ok()),
        })
    }
}
