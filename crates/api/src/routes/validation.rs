//! Route definitions for the `/validation` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::validation;
use crate::state::AppState;

/// Routes mounted at `/validation`.
///
/// ```text
/// GET    /queue                     -> list_queue  (?filter, ?cursor, ?page, ?limit)
/// GET    /candidates/{id}           -> get_candidate
/// GET    /candidates/{id}/history   -> get_history
/// POST   /candidates/{id}/claim     -> claim
/// POST   /candidates/{id}/release   -> release
/// POST   /candidates/{id}/extend    -> extend
/// POST   /candidates/{id}/resolve   -> resolve
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/queue", get(validation::list_queue))
        .route("/candidates/{id}", get(validation::get_candidate))
        .route("/candidates/{id}/history", get(validation::get_history))
        .route("/candidates/{id}/claim", post(validation::claim))
        .route("/candidates/{id}/release", post(validation::release))
        .route("/candidates/{id}/extend", post(validation::extend))
        .route("/candidates/{id}/resolve", post(validation::resolve))
}
