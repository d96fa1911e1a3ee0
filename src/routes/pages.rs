//! Auth pages and dashboards.
//!
//! Rendering lives in the front end; these handlers return the data a page
//! needs. Dashboards sit behind the route guard, which has already attached
//! the principal.

use crate::auth::policy::landing_path;
use crate::models::{Principal, Role};
use axum::{extract::Query, Json};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct ErrorQuery {
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

/// Only same-site absolute paths are honoured as post-login targets.
fn safe_callback(url: Option<String>) -> Option<String> {
    url.filter(|u| u.starts_with('/') && !u.starts_with("//"))
}

/// GET /auth/login
pub async fn login_page(Query(query): Query<LoginQuery>) -> Json<Value> {
    Json(json!({
        "page": "login",
        "roles": Role::ALL,
        "callbackUrl": safe_callback(query.callback_url),
    }))
}

/// GET /auth/signup
pub async fn signup_page() -> Json<Value> {
    Json(json!({
        "page": "signup",
        "roles": Role::ALL,
    }))
}

/// GET /auth/error
pub async fn error_page(Query(query): Query<ErrorQuery>) -> Json<Value> {
    Json(json!({
        "page": "error",
        "error": query.error.unwrap_or_else(|| "Something went wrong".to_string()),
    }))
}

/// GET /dashboard: Generic dashboard, any role
pub async fn dashboard(principal: Principal) -> Json<Value> {
    let home = landing_path(principal.role);
    Json(json!({
        "dashboard": "generic",
        "user": principal,
        "home": home,
    }))
}

/// GET /dashboard/interviewer, /dashboard/HR_RECRUiTER, /dashboard/hiring_manager
pub async fn role_dashboard(principal: Principal) -> Json<Value> {
    Json(json!({
        "dashboard": principal.role,
        "user": principal,
    }))
}
