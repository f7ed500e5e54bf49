use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Map, Value};
use vinco_core::edits::EditValidationError;
use vinco_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Store failures reach handlers already classified as [`CoreError`].
/// Every error renders as `{"error": message, "code": CODE}` plus
/// variant-specific detail fields.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut details = Map::new();

        let (status, code, message) = match self {
            AppError::Core(core) => classify_core_error(core, &mut details),
        };

        let mut body = Map::new();
        body.insert("error".into(), Value::String(message));
        body.insert("code".into(), Value::String(code.into()));
        body.extend(details);

        (status, axum::Json(Value::Object(body))).into_response()
    }
}

fn classify_core_error(
    err: CoreError,
    details: &mut Map<String, Value>,
) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
        CoreError::InvalidEdit(edit) => {
            let message = edit.to_string();
            match edit {
                EditValidationError::OutOfRange {
                    field,
                    value,
                    min,
                    max,
                } => {
                    details.insert("field".into(), json!(field));
                    details.insert("value".into(), json!(value));
                    details.insert("min".into(), json!(min));
                    details.insert("max".into(), json!(max));
                    (StatusCode::BAD_REQUEST, "OUT_OF_RANGE", message)
                }
                EditValidationError::InvalidGeometry(_) => {
                    (StatusCode::BAD_REQUEST, "INVALID_GEOMETRY", message)
                }
            }
        }
        CoreError::InvalidTransition { from, action } => {
            details.insert("from".into(), json!(from));
            details.insert("action".into(), json!(action.as_str()));
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_TRANSITION",
                format!("Cannot {action} a candidate in status {from}"),
            )
        }
        conflict @ CoreError::ClaimConflict { .. } => {
            let message = conflict.to_string();
            if let CoreError::ClaimConflict {
                candidate_id,
                held_by,
                claimed_at,
                expires_at,
            } = conflict
            {
                tracing::debug!(candidate_id, held_by, "Claim conflict");
                details.insert("candidate_id".into(), json!(candidate_id));
                details.insert("held_by".into(), json!(held_by));
                details.insert("claimed_at".into(), json!(claimed_at));
                details.insert("expires_at".into(), json!(expires_at));
            }
            (StatusCode::CONFLICT, "CLAIM_CONFLICT", message)
        }
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
        CoreError::StoreUnavailable(msg) => {
            tracing::warn!(error = %msg, "Store unavailable");
            details.insert("retryable".into(), json!(true));
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                "The data store is temporarily unavailable".to_string(),
            )
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
