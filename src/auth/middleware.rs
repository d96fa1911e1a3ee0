//! Axum extractors for authentication and rate limiting.

use super::policy::RoutePolicy;
use super::token::{token_from_headers, TokenService};
use crate::config::Config;
use crate::error::AppError;
use crate::models::Principal;
use axum::{extract::FromRequestParts, http::request::Parts};
use redis::AsyncCommands;
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub redis: redis::Client,
    pub config: Arc<Config>,
    pub tokens: Arc<TokenService>,
    pub policy: Arc<RoutePolicy>,
}

impl AppState {
    pub fn new(redis: redis::Client, config: Config) -> Self {
        let tokens = TokenService::new(
            &config.session_secret,
            config.token_issuer.clone(),
            config.session_ttl_secs,
        );
        Self {
            redis,
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            policy: Arc::new(RoutePolicy::default()),
        }
    }

    pub async fn redis_connection(
        &self,
    ) -> Result<redis::aio::MultiplexedConnection, AppError> {
        self.redis
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection error: {}", e)))
    }
}

/// Authenticated principal extractor.
///
/// Behind the route guard the principal is already in the request
/// extensions. Elsewhere it is read from the bearer header or session
/// cookie. Returns 401 Unauthorized if missing or invalid.
impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(principal.clone());
        }

        let token = token_from_headers(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Missing session token".to_string()))?;

        let claims = state.tokens.read(&token)?;
        Ok(claims.principal()?)
    }
}

/// Check rate limit using Redis INCR with TTL.
///
/// # Returns
/// * `Ok(true)` if under limit
/// * `Ok(false)` if limit exceeded
pub async fn check_rate_limit<C>(
    con: &mut C,
    key: &str,
    max: u32,
    window_secs: u64,
) -> Result<bool, redis::RedisError>
where
    C: AsyncCommands,
{
    let count: u32 = con.incr(key, 1).await?;

    // Start the window on the first request
    if count == 1 {
        con.expire::<_, ()>(key, window_secs as i64).await?;
    }

    Ok(count <= max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        routing::get,
        Json, Router,
    };
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let config = Config {
            session_secret: "unit-test-secret-unit-test-secret".to_string(),
            token_issuer: "hireboard".to_string(),
            session_ttl_secs: 3600,
            secure_cookies: false,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            rate_limit_login_per_min: 5,
            seed_demo_identities: false,
        };
        let redis = redis::Client::open(config.redis_url.as_str()).unwrap();
        AppState::new(redis, config)
    }

    async fn whoami(principal: Principal) -> Json<Principal> {
        Json(principal)
    }

    fn app(state: AppState) -> Router {
        Router::new().route("/whoami", get(whoami)).with_state(state)
    }

    #[tokio::test]
    async fn test_principal_from_cookie() {
        let state = test_state();
        let principal = Principal {
            id: "u1".to_string(),
            email: "r@example.com".to_string(),
            name: "R".to_string(),
            role: Role::HrRecruiter,
        };
        let token = state.tokens.issue(&principal).unwrap();

        let response = app(state)
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(header::COOKIE, format!("hireboard_session={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["id"], "u1");
        assert_eq!(json["role"], "hr_recruiter");
    }

    #[tokio::test]
    async fn test_principal_missing_token() {
        let response = app(test_state())
            .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_principal_invalid_token() {
        let response = app(test_state())
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(header::AUTHORIZATION, "Bearer garbage")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_check_rate_limit() {
        // Requires a running Redis instance; skipped otherwise
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

        let client = match redis::Client::open(redis_url) {
            Ok(c) => c,
            Err(_) => {
                eprintln!("Skipping test: Redis not available");
                return;
            }
        };

        let mut con = match client.get_multiplexed_async_connection().await {
            Ok(c) => c,
            Err(_) => {
                eprintln!("Skipping test: Redis connection failed");
                return;
            }
        };

        let test_key = format!("test:ratelimit:{}", nanoid::nanoid!(8));

        assert!(check_rate_limit(&mut con, &test_key, 2, 60).await.unwrap());
        assert!(check_rate_limit(&mut con, &test_key, 2, 60).await.unwrap());
        assert!(!check_rate_limit(&mut con, &test_key, 2, 60).await.unwrap());

        let _: Result<(), _> = con.del(&test_key).await;
    }
}
