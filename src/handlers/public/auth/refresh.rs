// handlers/public/auth/refresh.rs - POST /auth/refresh
use axum::{extract::State, http::HeaderMap};
use serde_json::{json, Value};

use crate::auth::cookie::refresh_token_from_headers;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /auth/refresh - New access token from the refresh cookie
///
/// 200 `{ "accessToken": "..." }`; 403 when the cookie is missing, invalid or expired.
/// The refresh token itself is not rotated.
pub async fn refresh_post(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Value> {
    let refresh_token = refresh_token_from_headers(&headers);
    let access_token = state.auth().refresh(refresh_token.as_deref())?;
    Ok(ApiResponse::success(json!({ "accessToken": access_token })))
}
