pub mod edits;
pub mod health;
pub mod recognition;
pub mod validation;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /recognition/candidates                          ingest (POST, editor)
///
/// /validation/queue                                list (?filter, ?cursor, ?page, ?limit)
/// /validation/candidates/{id}                      get
/// /validation/candidates/{id}/history              transition log
/// /validation/candidates/{id}/claim                claim (POST)
/// /validation/candidates/{id}/release              release (POST)
/// /validation/candidates/{id}/extend               extend (POST)
/// /validation/candidates/{id}/resolve              resolve (POST)
///
/// /images/{image_id}/edits                         current (GET), save (PUT)
/// /images/{image_id}/edits/versions                list versions
/// /images/{image_id}/edits/versions/{v}/revert     revert (POST)
/// /images/{image_id}/edits/reset                   reset to default (POST)
/// /images/{image_id}/edits/diff                    diff (?from, ?to)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/recognition", recognition::router())
        .nest("/validation", validation::router())
        .nest("/images/{image_id}/edits", edits::router())
}
