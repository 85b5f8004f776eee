mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use chrono::Duration;
use uuid::Uuid;

use common::{offline_app, send};
use weekplan_api::auth::TokenService;

#[tokio::test]
async fn missing_token_is_rejected_before_the_handler() -> Result<()> {
    let (app, _) = offline_app();
    let res = send(&app, Method::GET, "/auth/", None, None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn malformed_token_is_rejected() -> Result<()> {
    let (app, _) = offline_app();
    let res = send(&app, Method::GET, "/auth/", Some("not-a-jwt"), None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn expired_token_gets_a_distinct_code() -> Result<()> {
    let (app, state) = offline_app();
    let security = &state.config.security;
    let expired = TokenService::new(
        &security.access_token_secret,
        &security.refresh_token_secret,
        Duration::minutes(-5),
        Duration::days(7),
    )
    .issue_access_token(Uuid::new_v4())?;

    let res = send(&app, Method::GET, "/auth/", Some(&expired), None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["code"], "TOKEN_EXPIRED");
    Ok(())
}

#[tokio::test]
async fn refresh_token_does_not_open_protected_routes() -> Result<()> {
    let (app, state) = offline_app();
    let refresh = state.tokens.issue_refresh_token(Uuid::new_v4())?;
    let res = send(&app, Method::GET, "/auth/", Some(&refresh), None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn valid_token_reaches_handler_with_user_id() -> Result<()> {
    let (app, state) = offline_app();
    let user_id = Uuid::new_v4();
    let token = state.tokens.issue_access_token(user_id)?;

    for uri in ["/auth/", "/auth"] {
        let res = send(&app, Method::GET, uri, Some(&token), None).await?;
        assert_eq!(res.status, StatusCode::OK, "{}", uri);
        assert_eq!(res.body["userId"], user_id.to_string());
    }
    Ok(())
}

#[tokio::test]
async fn every_domain_route_is_guarded() -> Result<()> {
    let (app, _) = offline_app();
    let fid = Uuid::new_v4();
    let pid = Uuid::new_v4();
    let routes = [
        (Method::GET, "/folders".to_string()),
        (Method::POST, "/folders".to_string()),
        (Method::PATCH, format!("/folders/{}", fid)),
        (Method::DELETE, format!("/folders/{}/plans/{}", fid, pid)),
        (Method::GET, format!("/folders/{}/plans/{}/projects", fid, pid)),
        (Method::GET, "/search?keyword=x".to_string()),
        (Method::GET, "/history".to_string()),
        (Method::POST, "/history/undo".to_string()),
        (Method::POST, "/history/redo".to_string()),
        (Method::PATCH, "/auth/update".to_string()),
        (Method::PATCH, "/auth/password".to_string()),
        (Method::DELETE, "/auth/user".to_string()),
    ];
    for (method, uri) in routes {
        let res = send(&app, method.clone(), &uri, None, None).await?;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
    }
    Ok(())
}
