use axum::{extract::State, http::header::SET_COOKIE, response::IntoResponse};

use crate::auth::cookie;
use crate::error::ApiError;
use crate::middleware::message;
use crate::state::AppState;

/// POST /auth/logout - Clear the refresh cookie. Always succeeds.
pub async fn logout_post(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let cleared = cookie::clear_refresh_cookie(state.config.security.secure_cookies);
    let cleared = cookie::header_value(&cleared)
        .ok_or_else(|| ApiError::internal_server_error("Failed to build session cookie"))?;
    Ok(([(SET_COOKIE, cleared)], message("Logged out")))
}
