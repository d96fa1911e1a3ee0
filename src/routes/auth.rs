//! Auth API endpoints.

use crate::auth::credentials::{validate_login, verify_credentials};
use crate::auth::middleware::{check_rate_limit, AppState};
use crate::auth::policy::landing_path;
use crate::auth::token::{clear_session_cookie, session_cookie};
use crate::error::{AppError, AuthError};
use crate::models::{LoginRequest, LoginResponse, Principal, SessionResponse};
use crate::storage;
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;

/// POST /api/auth/login: Verify credentials and issue a session token
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    // A body that does not decode is reported like an empty form
    let Json(req) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Login body rejected");
        AuthError::MissingField
    })?;
    let credentials = validate_login(&req)?;

    let mut con = state.redis_connection().await?;

    // Rate limit by IP
    let rate_limit_key = format!("ratelimit:login:{}", addr.ip());
    let allowed = check_rate_limit(
        &mut con,
        &rate_limit_key,
        state.config.rate_limit_login_per_min,
        60,
    )
    .await
    .map_err(|e| AppError::Internal(format!("Rate limit check failed: {}", e)))?;

    if !allowed {
        let mut hasher = std::hash::DefaultHasher::new();
        addr.ip().hash(&mut hasher);
        let ip_hash = format!("{:x}", hasher.finish());
        tracing::warn!(
            action = "rate_limited",
            endpoint = "auth/login",
            ip_hash = %ip_hash,
            "Rate limit exceeded"
        );
        return Err(AppError::RateLimited);
    }

    let identity =
        storage::identity::get_identity_by_email(&mut con, &credentials.email).await?;

    let principal = verify_credentials(identity.as_ref(), &credentials).inspect_err(|e| {
        tracing::warn!(
            action = "login_failed",
            email = %credentials.email,
            reason = ?e,
            "Login rejected"
        );
    })?;

    let token = state.tokens.issue(&principal)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        session_cookie(&token, state.tokens.ttl_secs(), state.config.secure_cookies)?,
    );

    tracing::info!(
        action = "login_success",
        user_id = %principal.id,
        role = %principal.role,
        "User authenticated"
    );

    Ok((
        headers,
        Json(LoginResponse {
            token,
            role: principal.role,
            redirect: landing_path(principal.role).to_string(),
        }),
    ))
}

/// POST /api/auth/logout: Discard the session cookie
///
/// Tokens are stateless; an already-copied token stays valid until it expires.
pub async fn logout(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        clear_session_cookie(state.config.secure_cookies)?,
    );

    tracing::info!(action = "logout", "Session cookie cleared");

    Ok((StatusCode::NO_CONTENT, headers))
}

/// GET /api/auth/session: Current principal
pub async fn session(principal: Principal) -> Json<SessionResponse> {
    let redirect = landing_path(principal.role).to_string();
    Json(SessionResponse {
        user: principal,
        redirect,
    })
}
