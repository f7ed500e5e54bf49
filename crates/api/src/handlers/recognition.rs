//! Handlers for `/recognition`: detections entering the review pipeline.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use vinco_core::candidate::{Detection, RecognitionCandidate};
use vinco_core::queue::IngestOutcome;
use vinco_events::{event_types, ReviewEvent};

use crate::error::AppResult;
use crate::middleware::rbac::RequireEditor;
use crate::response::DataResponse;
use crate::state::AppState;

/// What became of an ingested detection.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IngestResponse {
    Stored { candidate: RecognitionCandidate },
    Discarded { effective_score: f64 },
}

/// POST /api/v1/recognition/candidates
///
/// Store a detection with the status chosen by the auto-approval policy.
/// Returns 201 when stored and 200 when the detection fell below the
/// review floor and was discarded.
pub async fn ingest(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Json(detection): Json<Detection>,
) -> AppResult<(StatusCode, Json<DataResponse<IngestResponse>>)> {
    let outcome = state.queue.ingest(&detection, Utc::now()).await?;

    let (status, data) = match outcome {
        IngestOutcome::Stored(candidate) => {
            tracing::info!(
                candidate_id = candidate.id,
                image_id = candidate.image_id,
                athlete_id = candidate.athlete_id,
                status = %candidate.status,
                "Recognition candidate ingested"
            );
            state.event_bus.publish(
                ReviewEvent::new(event_types::RECOGNITION_INGESTED)
                    .with_entity(event_types::ENTITY_CANDIDATE, candidate.id)
                    .with_actor(user.user_id)
                    .with_payload(serde_json::json!({
                        "image_id": candidate.image_id,
                        "athlete_id": candidate.athlete_id,
                        "status": candidate.status,
                        "effective_score": candidate.effective_score(),
                    })),
            );
            (StatusCode::CREATED, IngestResponse::Stored { candidate })
        }
        IngestOutcome::Discarded { effective_score } => {
            tracing::debug!(
                image_id = detection.image_id,
                athlete_id = detection.athlete_id,
                effective_score,
                "Detection below review floor discarded"
            );
            (StatusCode::OK, IngestResponse::Discarded { effective_score })
        }
    };

    Ok((status, Json(DataResponse { data })))
}
