mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use uuid::Uuid;

use common::{execute, offline_app, send};

fn refresh_request(cookie: Option<&str>) -> Result<Request<Body>> {
    let mut builder = Request::builder().method(Method::POST).uri("/auth/refresh");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    Ok(builder.body(Body::empty())?)
}

#[tokio::test]
async fn logout_clears_the_refresh_cookie() -> Result<()> {
    let (app, _) = offline_app();
    let res = send(&app, Method::POST, "/auth/logout", None, None).await?;
    assert_eq!(res.status, StatusCode::OK);

    let cookie = res.set_cookie().expect("Set-Cookie header");
    assert!(cookie.starts_with("refreshToken=;"));
    assert!(cookie.contains("Max-Age=0"));
    assert!(cookie.contains("HttpOnly"));
    Ok(())
}

#[tokio::test]
async fn refresh_without_cookie_is_forbidden() -> Result<()> {
    let (app, _) = offline_app();
    let res = execute(&app, refresh_request(None)?).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn refresh_with_garbage_or_access_token_is_forbidden() -> Result<()> {
    let (app, state) = offline_app();
    let access = state.tokens.issue_access_token(Uuid::new_v4())?;

    for cookie in ["refreshToken=garbage".to_string(), format!("refreshToken={}", access)] {
        let res = execute(&app, refresh_request(Some(&cookie))?).await?;
        assert_eq!(res.status, StatusCode::FORBIDDEN, "{}", cookie);
    }
    Ok(())
}

#[tokio::test]
async fn refresh_mints_a_working_access_token() -> Result<()> {
    let (app, state) = offline_app();
    let user_id = Uuid::new_v4();
    let refresh = state.tokens.issue_refresh_token(user_id)?;

    let cookie = format!("theme=dark; refreshToken={}", refresh);
    let res = execute(&app, refresh_request(Some(&cookie))?).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.set_cookie().is_none(), "refresh token is not rotated");

    let access = res.body["accessToken"].as_str().expect("accessToken");
    assert_eq!(state.tokens.verify_access_token(access), Ok(user_id));

    let whoami = send(&app, Method::GET, "/auth/", Some(access), None).await?;
    assert_eq!(whoami.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn health_reports_unreachable_database() -> Result<()> {
    let (app, _) = offline_app();
    let res = send(&app, Method::GET, "/health", None, None).await?;
    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.body["status"], "degraded");
    Ok(())
}
