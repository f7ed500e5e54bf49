//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no router needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use vinco_api::error::AppError;
use vinco_core::candidate::{CandidateStatus, ReviewAction};
use vinco_core::edits::EditValidationError;
use vinco_core::error::CoreError;

/// Convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "RecognitionCandidate",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "RecognitionCandidate with id 42 not found");
}

#[tokio::test]
async fn out_of_range_carries_bounds() {
    let err = AppError::from(CoreError::from(EditValidationError::OutOfRange {
        field: "tint",
        value: 200.0,
        min: -150.0,
        max: 150.0,
    }));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "OUT_OF_RANGE");
    assert_eq!(json["field"], "tint");
    assert_eq!(json["value"], 200.0);
    assert_eq!(json["min"], -150.0);
    assert_eq!(json["max"], 150.0);
}

#[tokio::test]
async fn invalid_geometry_returns_400() {
    let err = AppError::from(CoreError::from(EditValidationError::InvalidGeometry(
        "crop width must be positive".into(),
    )));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_GEOMETRY");
}

#[tokio::test]
async fn invalid_transition_returns_422() {
    let err = AppError::Core(CoreError::InvalidTransition {
        from: CandidateStatus::AutoApproved,
        action: ReviewAction::Approve,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "INVALID_TRANSITION");
    assert_eq!(json["from"], "AUTO_APPROVED");
    assert_eq!(json["action"], "approve");
}

#[tokio::test]
async fn claim_conflict_names_holder() {
    let claimed_at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let err = AppError::Core(CoreError::ClaimConflict {
        candidate_id: 5,
        held_by: 42,
        claimed_at,
        expires_at: claimed_at + chrono::Duration::minutes(15),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CLAIM_CONFLICT");
    assert_eq!(json["held_by"], 42);
    assert_eq!(json["candidate_id"], 5);
    assert_eq!(json["claimed_at"], "2026-03-01T12:00:00Z");
    assert_eq!(json["expires_at"], "2026-03-01T12:15:00Z");
}

#[tokio::test]
async fn forbidden_and_unauthorized() {
    let (status, json) = error_to_response(AppError::Core(CoreError::Forbidden("no".into()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");

    let (status, json) =
        error_to_response(AppError::Core(CoreError::Unauthorized("who".into()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn store_unavailable_is_retryable_503() {
    let err = AppError::Core(CoreError::StoreUnavailable("pool timed out".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "STORE_UNAVAILABLE");
    assert_eq!(json["retryable"], true);
    assert!(!json["error"].as_str().unwrap().contains("pool timed out"));
}

#[tokio::test]
async fn internal_error_is_sanitized() {
    let err = AppError::Core(CoreError::Internal("stack trace here".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}
