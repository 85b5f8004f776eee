use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::middleware::{message, ApiResponse, ApiResult, AuthUser};
use crate::services::project_service::{NewProject, ProjectListing, ProjectUpdate};
use crate::state::AppState;

/// GET /folders/:fid/plans/:pid/projects - `{ projects, user_info }`
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((folder_id, plan_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<ProjectListing> {
    let listing = state.projects().list(auth.user_id, folder_id, plan_id).await?;
    Ok(ApiResponse::success(listing))
}

/// POST /folders/:fid/plans/:pid/projects
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((folder_id, plan_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<NewProject>,
) -> ApiResult<Value> {
    let project = state.projects().create(auth.user_id, folder_id, plan_id, input).await?;
    Ok(ApiResponse::created(json!({ "message": "Project created", "projectId": project.id })))
}

/// PATCH /folders/:fid/plans/:pid/projects/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((folder_id, plan_id, project_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(fields): Json<ProjectUpdate>,
) -> ApiResult<Value> {
    let project = state
        .projects()
        .update(auth.user_id, folder_id, plan_id, project_id, fields)
        .await?;
    Ok(ApiResponse::success(json!({ "message": "Project updated", "project": project })))
}

/// DELETE /folders/:fid/plans/:pid/projects/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((folder_id, plan_id, project_id)): Path<(Uuid, Uuid, Uuid)>,
) -> ApiResult<Value> {
    state.projects().delete(auth.user_id, folder_id, plan_id, project_id).await?;
    Ok(message("Project deleted"))
}
