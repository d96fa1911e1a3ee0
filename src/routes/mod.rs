//! HTTP route handlers.

pub mod auth;
pub mod pages;

use crate::auth::guard::route_guard;
use crate::auth::middleware::AppState;
use crate::middleware::security_headers;
use axum::{middleware, routing::get, routing::post, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the API router. `/api/*` is outside the route guard.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/session", get(auth::session))
}

/// Build the page router for auth pages and dashboards.
pub fn page_router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(pages::login_page))
        .route("/auth/signup", get(pages::signup_page))
        .route("/auth/error", get(pages::error_page))
        .route("/dashboard", get(pages::dashboard))
        .route("/dashboard/interviewer", get(pages::role_dashboard))
        .route("/dashboard/HR_RECRUiTER", get(pages::role_dashboard))
        .route("/dashboard/hiring_manager", get(pages::role_dashboard))
}

/// The full application: routes, static fallback, guard and response layers.
pub fn app(state: AppState) -> Router {
    // CorsLayer::new() allows no origins: single-origin deployment
    let cors = CorsLayer::new();

    api_router()
        .merge(page_router())
        .fallback_service(ServeDir::new("static"))
        .layer(middleware::from_fn_with_state(state.clone(), route_guard))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}
