//! Handlers for `/images/{image_id}/edits`: the non-destructive edit log.
//!
//! Every write appends a full snapshot; nothing here rewrites history.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use vinco_core::edits::EditParameters;
use vinco_core::history::{CurrentEdits, EditVersion, VersionDiff};
use vinco_core::types::{DbId, VersionNumber};
use vinco_events::{event_types, ReviewEvent};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireImageEditor;
use crate::query::DiffParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/images/{image_id}/edits
///
/// The latest snapshot, or the defaults with `version: null` when the image
/// has never been edited.
pub async fn get_current(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(image_id): Path<DbId>,
) -> AppResult<Json<DataResponse<CurrentEdits>>> {
    let current = state.history.current(image_id).await?;
    tracing::debug!(image_id, version = ?current.version, "Current edits read");
    Ok(Json(DataResponse { data: current }))
}

/// PUT /api/v1/images/{image_id}/edits
///
/// Validate and append a snapshot. Omitted fields take their default value.
pub async fn save(
    State(state): State<AppState>,
    RequireImageEditor(user): RequireImageEditor,
    Path(image_id): Path<DbId>,
    Json(parameters): Json<EditParameters>,
) -> AppResult<(StatusCode, Json<DataResponse<EditVersion>>)> {
    let saved = state
        .history
        .append(image_id, parameters, user.user_id, Utc::now())
        .await?;

    tracing::info!(image_id, version = saved.version, author_id = user.user_id, "Edits saved");
    publish_edit_event(&state, event_types::EDITS_SAVED, &saved);

    Ok((StatusCode::CREATED, Json(DataResponse { data: saved })))
}

/// GET /api/v1/images/{image_id}/edits/versions
///
/// Every snapshot, newest first.
pub async fn list_versions(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(image_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<EditVersion>>>> {
    let versions = state.history.versions(image_id).await?;
    Ok(Json(DataResponse { data: versions }))
}

/// POST /api/v1/images/{image_id}/edits/versions/{version}/revert
///
/// Append a copy of `version` as the newest snapshot.
pub async fn revert(
    State(state): State<AppState>,
    RequireImageEditor(user): RequireImageEditor,
    Path((image_id, version)): Path<(DbId, VersionNumber)>,
) -> AppResult<(StatusCode, Json<DataResponse<EditVersion>>)> {
    let reverted = state
        .history
        .revert_to(image_id, version, user.user_id, Utc::now())
        .await?;

    tracing::info!(
        image_id,
        version = reverted.version,
        reverted_from = version,
        author_id = user.user_id,
        "Edits reverted"
    );
    publish_edit_event(&state, event_types::EDITS_REVERTED, &reverted);

    Ok((StatusCode::CREATED, Json(DataResponse { data: reverted })))
}

/// POST /api/v1/images/{image_id}/edits/reset
///
/// Append the default snapshot.
pub async fn reset(
    State(state): State<AppState>,
    RequireImageEditor(user): RequireImageEditor,
    Path(image_id): Path<DbId>,
) -> AppResult<(StatusCode, Json<DataResponse<EditVersion>>)> {
    let snapshot = state
        .history
        .reset(image_id, user.user_id, Utc::now())
        .await?;

    tracing::info!(image_id, version = snapshot.version, author_id = user.user_id, "Edits reset");
    publish_edit_event(&state, event_types::EDITS_RESET, &snapshot);

    Ok((StatusCode::CREATED, Json(DataResponse { data: snapshot })))
}

/// GET /api/v1/images/{image_id}/edits/diff?from=&to=
pub async fn diff(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(image_id): Path<DbId>,
    Query(params): Query<DiffParams>,
) -> AppResult<Json<DataResponse<VersionDiff>>> {
    let diff = state.history.diff(image_id, params.from, params.to).await?;
    Ok(Json(DataResponse { data: diff }))
}

fn publish_edit_event(state: &AppState, event_type: &str, version: &EditVersion) {
    state.event_bus.publish(
        ReviewEvent::new(event_type)
            .with_entity(event_types::ENTITY_IMAGE, version.image_id)
            .with_actor(version.author_id)
            .with_payload(serde_json::json!({
                "version": version.version,
                "reverted_from": version.reverted_from,
            })),
    );
}
