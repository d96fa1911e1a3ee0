//! Role-based route guard.
//!
//! Runs in front of `/`, `/dashboard/*` and `/auth/*`. Every decision is a
//! pass-through or a `307` redirect; the guard never fails a request and
//! never explains a redirect. Each request is evaluated from scratch.

use super::middleware::AppState;
use super::policy::{
    error_path, landing_path, login_path_with_callback, path_has_prefix, RoutePolicy,
    DASHBOARD_PATH, ERROR_PATH, LOGIN_PATH,
};
use super::token::{token_from_headers, SessionClaims};
use crate::models::Principal;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

/// Result of evaluating a request against the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Path is outside the guarded set.
    Bypass,
    /// Let the request through, with the principal when one was verified.
    Allow(Option<Principal>),
    /// Send the client elsewhere.
    Redirect(String),
}

/// Paths the guard applies to.
pub fn is_guarded(path: &str) -> bool {
    path == "/" || path_has_prefix(path, DASHBOARD_PATH) || path_has_prefix(path, "/auth")
}

/// Decide what to do with a request.
///
/// `path` is the request path and `target` the path plus query string, used
/// as the post-login callback. `claims` holds the verified token claims, if
/// any.
pub fn evaluate(
    policy: &RoutePolicy,
    path: &str,
    target: &str,
    claims: Option<&SessionClaims>,
) -> GuardOutcome {
    if !is_guarded(path) {
        return GuardOutcome::Bypass;
    }

    // The error page stays reachable no matter what the token says
    if path == ERROR_PATH {
        return GuardOutcome::Allow(None);
    }

    let is_root = path == "/";
    let is_auth_page = path_has_prefix(path, "/auth");

    let Some(claims) = claims else {
        return if is_root {
            GuardOutcome::Redirect(LOGIN_PATH.to_string())
        } else if is_auth_page {
            GuardOutcome::Allow(None)
        } else {
            GuardOutcome::Redirect(login_path_with_callback(target))
        };
    };

    let principal = match claims.principal() {
        Ok(principal) => principal,
        Err(err) => return GuardOutcome::Redirect(error_path(&err)),
    };

    if is_root || is_auth_page {
        return GuardOutcome::Redirect(landing_path(principal.role).to_string());
    }

    match policy.required_role(path) {
        Some(required) if required != principal.role => {
            GuardOutcome::Redirect(DASHBOARD_PATH.to_string())
        }
        _ => GuardOutcome::Allow(Some(principal)),
    }
}

/// Axum middleware applying [`evaluate`] to every request.
pub async fn route_guard(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.clone());

    let claims =
        token_from_headers(request.headers()).and_then(|token| state.tokens.read(&token).ok());

    match evaluate(&state.policy, &path, &target, claims.as_ref()) {
        GuardOutcome::Bypass => next.run(request).await,
        GuardOutcome::Allow(principal) => {
            if let Some(principal) = principal {
                request.extensions_mut().insert(principal);
            }
            next.run(request).await
        }
        GuardOutcome::Redirect(location) => {
            tracing::debug!(
                action = "guard_redirect",
                path = %path,
                location = %location,
                "Redirecting request"
            );
            Redirect::temporary(&location).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::TokenService;
    use crate::config::Config;
    use crate::models::Role;
    use axum::{
        body::Body,
        http::{header, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use chrono::Utc;
    use tower::ServiceExt;

    const SECRET: &str = "guard-test-secret-guard-test-secret";

    fn claims(role: &str) -> SessionClaims {
        let now = Utc::now().timestamp();
        SessionClaims {
            sub: "user-1".to_string(),
            role: role.to_string(),
            email: "user@example.com".to_string(),
            name: "User".to_string(),
            iat: now,
            exp: now + 3600,
            iss: "hireboard".to_string(),
        }
    }

    fn eval(path: &str, claims: Option<&SessionClaims>) -> GuardOutcome {
        evaluate(&RoutePolicy::default(), path, path, claims)
    }

    fn redirect(location: &str) -> GuardOutcome {
        GuardOutcome::Redirect(location.to_string())
    }

    #[test]
    fn test_unguarded_paths_bypass() {
        for path in ["/api/auth/login", "/static/app.css", "/dashboards", "/authz"] {
            assert_eq!(eval(path, None), GuardOutcome::Bypass, "{}", path);
        }
    }

    #[test]
    fn test_root_without_token_goes_to_login() {
        assert_eq!(eval("/", None), redirect("/auth/login"));
    }

    #[test]
    fn test_root_with_token_goes_to_landing() {
        assert_eq!(
            eval("/", Some(&claims("interviewer"))),
            redirect("/dashboard/interviewer")
        );
        assert_eq!(
            eval("/", Some(&claims("hr_recruiter"))),
            redirect("/dashboard/HR_RECRUiTER")
        );
        assert_eq!(
            eval("/", Some(&claims("hr_manager"))),
            redirect("/dashboard/hiring_manager")
        );
    }

    #[test]
    fn test_unknown_role_goes_to_error_page() {
        let bad = claims("admin");
        let expected = redirect("/auth/error?error=Invalid%20role");
        assert_eq!(eval("/", Some(&bad)), expected);
        assert_eq!(eval("/auth/login", Some(&bad)), expected);
        assert_eq!(eval("/dashboard", Some(&bad)), expected);
        assert_eq!(eval("/dashboard/interviewer", Some(&bad)), expected);

        let missing = claims("");
        assert_eq!(eval("/", Some(&missing)), expected);
    }

    #[test]
    fn test_error_page_always_allowed() {
        assert_eq!(eval("/auth/error", None), GuardOutcome::Allow(None));
        assert_eq!(
            eval("/auth/error", Some(&claims("admin"))),
            GuardOutcome::Allow(None)
        );
    }

    #[test]
    fn test_auth_pages_without_token_allowed() {
        assert_eq!(eval("/auth/login", None), GuardOutcome::Allow(None));
        assert_eq!(eval("/auth/signup", None), GuardOutcome::Allow(None));
    }

    #[test]
    fn test_auth_pages_with_token_go_to_landing() {
        for role in Role::ALL {
            let c = claims(role.as_str());
            assert_eq!(eval("/auth/login", Some(&c)), redirect(landing_path(role)));
            assert_eq!(eval("/auth/signup", Some(&c)), redirect(landing_path(role)));
        }
    }

    #[test]
    fn test_dashboard_without_token_keeps_callback() {
        let outcome = evaluate(
            &RoutePolicy::default(),
            "/dashboard/interviewer/feedback",
            "/dashboard/interviewer/feedback?id=7",
            None,
        );
        assert_eq!(
            outcome,
            redirect("/auth/login?callbackUrl=%2Fdashboard%2Finterviewer%2Ffeedback%3Fid%3D7")
        );
    }

    #[test]
    fn test_wrong_role_goes_to_generic_dashboard() {
        assert_eq!(
            eval("/dashboard/HR_RECRUiTER", Some(&claims("hr_manager"))),
            redirect("/dashboard")
        );
        assert_eq!(
            eval("/dashboard/hiring_manager/offers", Some(&claims("interviewer"))),
            redirect("/dashboard")
        );
    }

    #[test]
    fn test_matching_role_allowed_with_principal() {
        let c = claims("HR_RECRUITER");
        match eval("/dashboard/HR_RECRUiTER/candidates", Some(&c)) {
            GuardOutcome::Allow(Some(principal)) => {
                assert_eq!(principal.role, Role::HrRecruiter);
                assert_eq!(principal.id, "user-1");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_padded_or_mixed_case_claim_keeps_own_dashboard() {
        for raw in [" hr_manager", "hr_manager ", "HR_Manager"] {
            match eval("/dashboard/hiring_manager", Some(&claims(raw))) {
                GuardOutcome::Allow(Some(principal)) => {
                    assert_eq!(principal.role, Role::HrManager, "{:?}", raw)
                }
                other => panic!("{:?}: unexpected outcome {:?}", raw, other),
            }
        }
        assert_eq!(
            eval("/dashboard/interviewer", Some(&claims(" hr_manager"))),
            redirect("/dashboard")
        );
    }

    #[test]
    fn test_generic_dashboard_allows_any_role() {
        for role in Role::ALL {
            let outcome = eval("/dashboard", Some(&claims(role.as_str())));
            assert!(matches!(outcome, GuardOutcome::Allow(Some(_))));
        }
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let policy = RoutePolicy::default();
        let c = claims("interviewer");
        for path in ["/", "/auth/login", "/dashboard", "/dashboard/hiring_manager", "/api/x"] {
            for claims in [None, Some(&c)] {
                let first = evaluate(&policy, path, path, claims);
                let second = evaluate(&policy, path, path, claims);
                assert_eq!(first, second);
            }
        }
    }

    // ------------------------------------------------------------------
    // Middleware wiring
    // ------------------------------------------------------------------

    fn test_state() -> AppState {
        let config = Config {
            session_secret: SECRET.to_string(),
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

    fn token_for(role: Role) -> String {
        TokenService::new(SECRET, "hireboard", 3600)
            .issue(&Principal {
                id: "user-1".to_string(),
                email: "user@example.com".to_string(),
                name: "User".to_string(),
                role,
            })
            .unwrap()
    }

    async fn show_role(request: Request) -> String {
        request
            .extensions()
            .get::<Principal>()
            .map(|p| p.role.to_string())
            .unwrap_or_else(|| "anonymous".to_string())
    }

    fn app() -> Router {
        let state = test_state();
        Router::new()
            .route("/", get(show_role))
            .route("/dashboard", get(show_role))
            .route("/dashboard/HR_RECRUiTER", get(show_role))
            .route("/auth/login", get(show_role))
            .route("/api/ping", get(show_role))
            .layer(middleware::from_fn_with_state(state.clone(), route_guard))
            .with_state(state)
    }

    async fn send(uri: &str, token: Option<&str>) -> Response {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("hireboard_session={}", token));
        }
        app().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_middleware_root_without_token() {
        let response = send("/", None).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/auth/login");
    }

    #[tokio::test]
    async fn test_middleware_wrong_role() {
        let token = token_for(Role::HrManager);
        let response = send("/dashboard/HR_RECRUiTER", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/dashboard");
    }

    #[tokio::test]
    async fn test_middleware_attaches_principal() {
        let token = token_for(Role::HrRecruiter);
        let response = send("/dashboard/HR_RECRUiTER", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "hr_recruiter");
    }

    #[tokio::test]
    async fn test_middleware_callback_url() {
        let response = send("/dashboard?view=week", None).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            location(&response),
            "/auth/login?callbackUrl=%2Fdashboard%3Fview%3Dweek"
        );
    }

    #[tokio::test]
    async fn test_middleware_callback_url_is_relative() {
        let response = send("http://hr.example.com/dashboard?view=week", None).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            location(&response),
            "/auth/login?callbackUrl=%2Fdashboard%3Fview%3Dweek"
        );
    }

    #[tokio::test]
    async fn test_middleware_login_page_with_token() {
        let token = token_for(Role::Interviewer);
        let response = send("/auth/login", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/dashboard/interviewer");
    }

    #[tokio::test]
    async fn test_middleware_expired_token_treated_as_absent() {
        let expired = TokenService::new(SECRET, "hireboard", 3600)
            .issue_at(
                &Principal {
                    id: "user-1".to_string(),
                    email: String::new(),
                    name: String::new(),
                    role: Role::Interviewer,
                },
                Utc::now() - chrono::Duration::hours(3),
            )
            .unwrap();
        let response = send("/dashboard", Some(&expired)).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/auth/login?callbackUrl=%2Fdashboard");
    }

    #[tokio::test]
    async fn test_middleware_bypasses_api() {
        let response = send("/api/ping", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "anonymous");
    }
}
