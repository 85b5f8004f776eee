use axum::Extension;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /auth/ - Confirms the access token and reports whose it is
///
/// ```json
/// { "message": "Authenticated", "userId": "..." }
/// ```
pub async fn whoami(Extension(auth): Extension<AuthUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "message": "Authenticated",
        "userId": auth.user_id,
    })))
}
