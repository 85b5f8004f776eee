use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{protected, public};
use crate::middleware::require_access_token;
use crate::state::AppState;

/// Full application router.
///
/// The access guard is attached with `route_layer` to the protected routes
/// only, so signup, login, refresh and logout stay reachable without a token.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security.cors_origins);

    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/", get(public::health::root))
        .route("/health", get(public::health::health))
        .route("/auth/signup", post(auth::signup_post))
        .route("/auth/login", post(auth::login_post))
        .route("/auth/refresh", post(auth::refresh_post))
        .route("/auth/logout", post(auth::logout_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::folders::{folder, plan, project};
    use protected::{auth, history, search};

    Router::new()
        // Session and account
        .route("/auth", get(auth::whoami))
        .route("/auth/", get(auth::whoami))
        .route("/auth/update", patch(auth::update_patch))
        .route("/auth/password", patch(auth::password_patch))
        .route("/auth/user", axum::routing::delete(auth::user_delete))
        // Folders → plans → projects
        .route("/folders", get(folder::list).post(folder::create))
        .route("/folders/:fid", patch(folder::rename).delete(folder::delete))
        .route("/folders/:fid/plans", get(plan::list).post(plan::create))
        .route("/folders/:fid/plans/:pid", patch(plan::update).delete(plan::delete))
        .route(
            "/folders/:fid/plans/:pid/projects",
            get(project::list).post(project::create),
        )
        .route(
            "/folders/:fid/plans/:pid/projects/:id",
            patch(project::update).delete(project::delete),
        )
        .route("/search", get(search::search))
        // Undo/redo
        .route("/history", get(history::list))
        .route("/history/undo", post(history::undo))
        .route("/history/redo", post(history::redo))
        .route_layer(middleware::from_fn_with_state(state, require_access_token))
}

/// Credentials are allowed so the refresh cookie travels, which rules out a
/// wildcard origin; only the configured origins are accepted.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
