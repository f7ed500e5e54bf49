//! Shared query parameter types for API handlers.

use serde::Deserialize;
use vinco_core::types::VersionNumber;

/// `GET /validation/queue?filter=&cursor=&page=&limit=`.
///
/// `filter` is parsed by the handler so that an unknown value yields a
/// `VALIDATION_ERROR` instead of a query rejection.
#[derive(Debug, Default, Deserialize)]
pub struct QueueParams {
    pub filter: Option<String>,
    pub cursor: Option<usize>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// `GET /images/{image_id}/edits/diff?from=&to=`.
#[derive(Debug, Deserialize)]
pub struct DiffParams {
    pub from: VersionNumber,
    pub to: VersionNumber,
}
