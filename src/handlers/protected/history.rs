use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::history_service::HistoryOutcome;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// GET /history?limit= - Most recent audit entries in the caller's scope, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Value> {
    let history = state.history();
    let caller = history.caller(auth.user_id).await?;
    let entries = history.list(Some(caller), query.limit).await?;
    Ok(ApiResponse::success(json!({ "entries": entries })))
}

/// POST /history/undo - Reverse the most recent mutation that is not yet undone.
/// A token that outlived its account gets 401.
pub async fn undo(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<Value> {
    let history = state.history();
    let caller = history.caller(auth.user_id).await?;
    let outcome = history.undo(Some(caller)).await?;
    Ok(ApiResponse::success(outcome_body("Undo complete", &outcome)))
}

/// POST /history/redo - Replay the most recently undone entry
pub async fn redo(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<Value> {
    let history = state.history();
    let caller = history.caller(auth.user_id).await?;
    let outcome = history.redo(Some(caller)).await?;
    Ok(ApiResponse::success(outcome_body("Redo complete", &outcome)))
}

fn outcome_body(message: &str, outcome: &HistoryOutcome) -> Value {
    json!({
        "message": message,
        "entryId": outcome.entry_id,
        "compensates": outcome.compensates,
        "table": outcome.table,
        "rowId": outcome.row_id,
        "action": outcome.action,
    })
}
