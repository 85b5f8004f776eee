use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::middleware::{message, ApiResponse, ApiResult, AuthUser};
use crate::services::plan_service::{NewPlan, PlanUpdate};
use crate::state::AppState;

/// GET /folders/:fid/plans
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(folder_id): Path<Uuid>,
) -> ApiResult<Value> {
    let plans = state.plans().list(auth.user_id, folder_id).await?;
    Ok(ApiResponse::success(json!({ "plans": plans })))
}

/// POST /folders/:fid/plans - Create a plan, optionally with its first projects
///
/// Expected Input:
/// ```json
/// {
///   "title": "Backend weekly",
///   "week_label": "2025-W10",
///   "projects": [{ "name": "API", "last_week_notes": "...", "this_week_notes": "..." }]
/// }
/// ```
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(folder_id): Path<Uuid>,
    Json(input): Json<NewPlan>,
) -> ApiResult<Value> {
    let (plan, projects) = state.plans().create(auth.user_id, folder_id, input).await?;
    Ok(ApiResponse::created(json!({
        "message": "Plan created",
        "planId": plan.id,
        "projectIds": projects.iter().map(|p| p.id).collect::<Vec<_>>(),
    })))
}

/// PATCH /folders/:fid/plans/:pid - `{ title?, week_label? }`
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((folder_id, plan_id)): Path<(Uuid, Uuid)>,
    Json(fields): Json<PlanUpdate>,
) -> ApiResult<Value> {
    let plan = state.plans().update(auth.user_id, folder_id, plan_id, fields).await?;
    Ok(ApiResponse::success(json!({ "message": "Plan updated", "plan": plan })))
}

/// DELETE /folders/:fid/plans/:pid
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((folder_id, plan_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Value> {
    state.plans().delete(auth.user_id, folder_id, plan_id).await?;
    Ok(message("Plan deleted"))
}
