//! Route definitions for `/images/{image_id}/edits`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::edits;
use crate::state::AppState;

/// Routes mounted at `/images/{image_id}/edits`.
///
/// ```text
/// GET    /                            -> get_current
/// PUT    /                            -> save
/// GET    /versions                    -> list_versions
/// POST   /versions/{version}/revert   -> revert
/// POST   /reset                       -> reset
/// GET    /diff                        -> diff  (?from, ?to)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(edits::get_current).put(edits::save))
        .route("/versions", get(edits::list_versions))
        .route("/versions/{version}/revert", post(edits::revert))
        .route("/reset", post(edits::reset))
        .route("/diff", get(edits::diff))
}
