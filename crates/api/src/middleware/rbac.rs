//! Role-based access control extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use vinco_core::error::CoreError;
use vinco_core::roles::{can_edit_images, has_role, ROLE_EDITOR};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires `editor` or a role that grants it (`admin`). Rejects with
/// 403 Forbidden otherwise.
///
/// ```ignore
/// async fn save(RequireEditor(user): RequireEditor) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireEditor(pub AuthUser);

impl FromRequestParts<AppState> for RequireEditor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !has_role(&user.role, ROLE_EDITOR) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Editor role required".into(),
            )));
        }
        Ok(RequireEditor(user))
    }
}

/// Requires a role that may write edit snapshots. Rejects with 403 Forbidden
/// otherwise.
pub struct RequireImageEditor(pub AuthUser);

impl FromRequestParts<AppState> for RequireImageEditor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !can_edit_images(&user.role) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Image editing requires the editor role".into(),
            )));
        }
        Ok(RequireImageEditor(user))
    }
}
