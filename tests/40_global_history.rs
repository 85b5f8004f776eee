//! Global-scope history against the same log a per-user server writes to.
//! Kept in its own binary: a global undo reverses whatever mutation is newest,
//! so nothing else may write while it runs.

mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{database_app, send, unique_login};
use weekplan_api::config::{HistoryConfig, HistoryScope};
use weekplan_api::services::{HistoryService, ServiceError};

#[tokio::test]
async fn global_and_user_cursors_reverse_each_entry_once() -> Result<()> {
    let Some((app, state)) = database_app().await? else { return Ok(()) };
    let login_id = unique_login("jules");
    let res = send(&app, Method::POST, "/auth/signup", None, Some(json!({ "login_id": login_id, "password": "pw1" })))
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    let res = send(&app, Method::POST, "/auth/login", None, Some(json!({ "login_id": login_id, "password": "pw1" })))
        .await?;
    let token = res.body["accessToken"].as_str().expect("accessToken").to_string();

    for name in ["First", "Second"] {
        let res = send(&app, Method::POST, "/folders", Some(&token), Some(json!({ "name": name }))).await?;
        assert_eq!(res.status, StatusCode::CREATED);
    }
    let listed = send(&app, Method::GET, "/history?limit=2", Some(&token), None).await?;
    let second = listed.body["entries"][0]["id"].as_i64().expect("entry id");
    let first = listed.body["entries"][1]["id"].as_i64().expect("entry id");

    let global = HistoryService::new(state.pool.clone(), HistoryConfig { scope: HistoryScope::Global, list_limit: 20 });

    let outcome = global.undo(None).await?;
    assert_eq!(outcome.compensates, second);

    // The user's cursor sees the global undo and moves on to the older entry.
    let res = send(&app, Method::POST, "/history/undo", Some(&token), None).await?;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["compensates"], json!(first));

    let folders = send(&app, Method::GET, "/folders", Some(&token), None).await?;
    assert_eq!(folders.body["folders"], json!([]));

    assert_eq!(global.redo(None).await?.compensates, first);
    assert_eq!(global.redo(None).await?.compensates, second);
    assert!(matches!(global.redo(None).await, Err(ServiceError::NothingToRedo)));

    let folders = send(&app, Method::GET, "/folders", Some(&token), None).await?;
    assert_eq!(folders.body["folders"].as_array().map(Vec::len), Some(2));

    // Both redos were written by the global cursor; the user has nothing left to redo.
    let res = send(&app, Method::POST, "/history/redo", Some(&token), None).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", res.body);
    Ok(())
}
