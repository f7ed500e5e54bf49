//! Handlers for `/validation`: the recognition review queue.
//!
//! Listing is served from a freshly materialized, deterministically ordered
//! snapshot on every request. The reviewer's cursor travels in the query
//! string, so the server keeps no per-session state.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use vinco_core::candidate::TransitionRecord;
use vinco_core::claims::Claim;
use vinco_core::queue::{
    PageRequest, QueueCursor, QueueEntry, QueueFilter, QueuePage, Resolution, Resolved,
};
use vinco_core::types::DbId;
use vinco_events::{event_types, ReviewEvent};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireEditor;
use crate::query::QueueParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// A page of the queue plus the entry under the reviewer's cursor.
#[derive(Debug, Serialize)]
pub struct QueueListing {
    pub filter: QueueFilter,
    pub cursor: QueueCursor,
    /// The entry at `cursor` in the full listing, if any.
    pub current: Option<QueueEntry>,
    /// `true` once the cursor has moved past the last entry.
    pub exhausted: bool,
    #[serde(flatten)]
    pub page: QueuePage,
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/validation/queue?filter=&cursor=&page=&limit=
pub async fn list_queue(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Query(params): Query<QueueParams>,
) -> AppResult<Json<DataResponse<QueueListing>>> {
    let filter = match params.filter.as_deref() {
        Some(raw) => raw.parse::<QueueFilter>()?,
        None => QueueFilter::default(),
    };
    let cursor = QueueCursor(params.cursor.unwrap_or(0));

    let listing = state.queue.list(filter, user.user_id, Utc::now()).await?;
    let page = QueuePage::from_listing(&listing, PageRequest::new(params.page, params.limit));

    tracing::debug!(
        reviewer_id = user.user_id,
        filter = filter.as_str(),
        total = page.total,
        cursor = cursor.position(),
        "Validation queue listed"
    );

    Ok(Json(DataResponse {
        data: QueueListing {
            filter,
            cursor,
            current: cursor.entry(&listing).cloned(),
            exhausted: cursor.is_exhausted(&listing),
            page,
        },
    }))
}

/// GET /api/v1/validation/candidates/{id}
pub async fn get_candidate(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<QueueEntry>>> {
    let entry = state.queue.get(id, Utc::now()).await?;
    Ok(Json(DataResponse { data: entry }))
}

/// GET /api/v1/validation/candidates/{id}/history
///
/// Transition log, oldest first.
pub async fn get_history(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<TransitionRecord>>>> {
    let history = state.queue.history(id).await?;
    Ok(Json(DataResponse { data: history }))
}

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

/// POST /api/v1/validation/candidates/{id}/claim
///
/// Returns 409 `CLAIM_CONFLICT` with the holder while another reviewer's
/// claim is active. Re-claiming your own candidate refreshes the lease.
pub async fn claim(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Claim>>> {
    let claim = state.queue.claim(id, user.reviewer(), Utc::now()).await?;

    tracing::info!(
        candidate_id = id,
        reviewer_id = user.user_id,
        expires_at = %claim.expires_at,
        "Candidate claimed"
    );
    state.event_bus.publish(
        ReviewEvent::new(event_types::RECOGNITION_CLAIMED)
            .with_entity(event_types::ENTITY_CANDIDATE, id)
            .with_actor(user.user_id)
            .with_payload(serde_json::json!({ "expires_at": claim.expires_at })),
    );

    Ok(Json(DataResponse { data: claim }))
}

/// POST /api/v1/validation/candidates/{id}/release
pub async fn release(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.queue.release(id, user.reviewer(), Utc::now()).await?;

    tracing::info!(candidate_id = id, reviewer_id = user.user_id, "Claim released");
    state.event_bus.publish(
        ReviewEvent::new(event_types::RECOGNITION_RELEASED)
            .with_entity(event_types::ENTITY_CANDIDATE, id)
            .with_actor(user.user_id),
    );

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/validation/candidates/{id}/extend
pub async fn extend(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Claim>>> {
    let claim = state.queue.extend(id, user.reviewer(), Utc::now()).await?;

    tracing::debug!(
        candidate_id = id,
        reviewer_id = user.user_id,
        expires_at = %claim.expires_at,
        "Claim extended"
    );

    Ok(Json(DataResponse { data: claim }))
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// POST /api/v1/validation/candidates/{id}/resolve
///
/// Body: `{"action": "approve" | "reject" | "override_reject" | "reassign",
/// "note"?: string, "reason"?: string}`.
pub async fn resolve(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(resolution): Json<Resolution>,
) -> AppResult<Json<DataResponse<Resolved>>> {
    let resolved = state
        .queue
        .resolve(id, user.reviewer(), resolution, Utc::now())
        .await?;

    let t = &resolved.transition;
    tracing::info!(
        candidate_id = id,
        reviewer_id = user.user_id,
        action = %t.action,
        from = %t.from_status,
        to = %t.to_status,
        "Candidate resolved"
    );
    state.event_bus.publish(
        ReviewEvent::new(event_types::RECOGNITION_RESOLVED)
            .with_entity(event_types::ENTITY_CANDIDATE, id)
            .with_actor(user.user_id)
            .with_payload(serde_json::json!({
                "action": t.action,
                "from_status": t.from_status,
                "to_status": t.to_status,
            })),
    );

    Ok(Json(DataResponse { data: resolved }))
}
