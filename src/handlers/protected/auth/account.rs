use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::middleware::{message, ApiResponse, ApiResult, AuthUser};
use crate::services::auth_service::{PasswordChange, ProfileUpdate, UserLookup};
use crate::state::AppState;

/// PATCH /auth/update - Partial profile update (`display_name`, `phone_number`, `role`)
pub async fn update_patch(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(fields): Json<ProfileUpdate>,
) -> ApiResult<Value> {
    let profile = state.auth().update_profile(auth.user_id, fields).await?;
    Ok(ApiResponse::success(json!({ "message": "Profile updated", "user": profile })))
}

/// PATCH /auth/password - `{ current_password, new_password }`
pub async fn password_patch(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(change): Json<PasswordChange>,
) -> ApiResult<Value> {
    state.auth().change_password(auth.user_id, change).await?;
    Ok(message("Password changed"))
}

/// DELETE /auth/user - Remove an account found by exactly one of
/// `login_id`, `display_name` or `phone_number`. Self or admin only.
pub async fn user_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(lookup): Json<UserLookup>,
) -> ApiResult<Value> {
    let removed = state.auth().delete_user(auth.user_id, lookup).await?;
    Ok(ApiResponse::success(json!({ "message": "User deleted", "userId": removed })))
}
