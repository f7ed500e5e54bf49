//! Route definitions for the `/recognition` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::recognition;
use crate::state::AppState;

/// Routes mounted at `/recognition`.
///
/// ```text
/// POST   /candidates   -> ingest
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/candidates", post(recognition::ingest))
}
