// handlers/public/auth/login.rs - POST /auth/login
use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::auth::cookie;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::services::auth_service::LoginInput;
use crate::state::AppState;

/// POST /auth/login - Authenticate and receive the token pair
///
/// Expected Input:
/// ```json
/// { "login_id": "alice", "password": "pw1" }
/// ```
///
/// Expected Output:
/// ```json
/// { "accessToken": "eyJhbGciOiJIUzI1NiI...", "isAdmin": false }
/// ```
/// plus `Set-Cookie: refreshToken=...; HttpOnly; Secure; SameSite=Strict` (7 days).
pub async fn login_post(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.auth().login(input).await?;

    let set_cookie = cookie::refresh_cookie(
        &outcome.refresh_token,
        state.tokens.refresh_ttl(),
        state.config.security.secure_cookies,
    );
    let set_cookie = cookie::header_value(&set_cookie)
        .ok_or_else(|| ApiError::internal_server_error("Failed to build session cookie"))?;

    Ok((
        [(SET_COOKIE, set_cookie)],
        ApiResponse::success(json!({
            "message": "Login successful",
            "accessToken": outcome.access_token,
            "isAdmin": outcome.is_admin,
        })),
    ))
}
