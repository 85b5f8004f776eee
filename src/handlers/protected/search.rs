use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Deserialize;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::search_service::SearchResults;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub keyword: String,
}

/// GET /search?keyword= - `{ folders, plans, projects }` owned by the caller
pub async fn search(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<SearchResults> {
    let results = state.search().search(auth.user_id, &query.keyword).await?;
    Ok(ApiResponse::success(results))
}
