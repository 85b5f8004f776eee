use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::middleware::{message, ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FolderName {
    pub name: String,
}

/// GET /folders - Own folders; admins see every folder with its owner
pub async fn list(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<Value> {
    let folders = state.folders().list(auth.user_id).await?;
    Ok(ApiResponse::success(json!({ "folders": folders })))
}

/// POST /folders - `{ name }` → 201 `{ message, folderId }`
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<FolderName>,
) -> ApiResult<Value> {
    let folder = state.folders().create(auth.user_id, &body.name).await?;
    Ok(ApiResponse::created(json!({ "message": "Folder created", "folderId": folder.id })))
}

/// PATCH /folders/:fid - Rename
pub async fn rename(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(folder_id): Path<Uuid>,
    Json(body): Json<FolderName>,
) -> ApiResult<Value> {
    let folder = state.folders().rename(auth.user_id, folder_id, &body.name).await?;
    Ok(ApiResponse::success(json!({ "message": "Folder renamed", "folder": folder })))
}

/// DELETE /folders/:fid - Removes the folder with its plans and projects
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(folder_id): Path<Uuid>,
) -> ApiResult<Value> {
    state.folders().delete(auth.user_id, folder_id).await?;
    Ok(message("Folder deleted"))
}
