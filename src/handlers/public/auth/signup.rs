// handlers/public/auth/signup.rs - POST /auth/signup
use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::auth_service::SignupInput;
use crate::state::AppState;

/// POST /auth/signup - Create an account
///
/// Expected Input:
/// ```json
/// { "login_id": "alice", "password": "pw1", "display_name": "Alice", "phone_number": "010-0000-0000", "role": "member" }
/// ```
///
/// 201 `{ "message": "Signup complete", "userId": "..." }`; 400 when the login id is taken.
pub async fn signup_post(State(state): State<AppState>, Json(input): Json<SignupInput>) -> ApiResult<Value> {
    let user = state.auth().signup(input).await?;
    Ok(ApiResponse::created(json!({
        "message": "Signup complete",
        "userId": user.id,
    })))
}
