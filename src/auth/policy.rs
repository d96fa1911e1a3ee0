//! Landing paths and the role-restricted route table.

use crate::error::AuthError;
use crate::models::Role;

pub const LOGIN_PATH: &str = "/auth/login";
pub const SIGNUP_PATH: &str = "/auth/signup";
pub const ERROR_PATH: &str = "/auth/error";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Default dashboard for a role.
pub fn landing_path(role: Role) -> &'static str {
    match role {
        Role::Interviewer => "/dashboard/interviewer",
        Role::HrRecruiter => "/dashboard/HR_RECRUiTER",
        Role::HrManager => "/dashboard/hiring_manager",
    }
}

/// Landing path for a raw role string.
pub fn resolve_landing(role: &str) -> Result<&'static str, AuthError> {
    Ok(landing_path(role.parse()?))
}

/// Error page location carrying a human-readable message.
pub fn error_path(err: &AuthError) -> String {
    format!("{}?error={}", ERROR_PATH, urlencoding::encode(&err.to_string()))
}

/// Login page location that returns the user to `target` after login.
///
/// `target` is the path and query only, never scheme or host, so the callback
/// is always a same-site relative URL.
pub fn login_path_with_callback(target: &str) -> String {
    format!("{}?callbackUrl={}", LOGIN_PATH, urlencoding::encode(target))
}

/// Returns true if `path` is `prefix` itself or lies beneath it.
pub fn path_has_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Ordered table of path prefixes and the role each requires.
///
/// Only the first matching rule applies.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    rules: Vec<(String, Role)>,
}

impl RoutePolicy {
    pub fn new(rules: Vec<(String, Role)>) -> Self {
        Self { rules }
    }

    pub fn required_role(&self, path: &str) -> Option<Role> {
        self.rules
            .iter()
            .find(|(prefix, _)| path_has_prefix(path, prefix))
            .map(|(_, role)| *role)
    }

    pub fn rules(&self) -> &[(String, Role)] {
        &self.rules
    }
}

impl Default for RoutePolicy {
    /// Each role's dashboard is restricted to that role.
    fn default() -> Self {
        Self::new(
            Role::ALL
                .into_iter()
                .map(|role| (landing_path(role).to_string(), role))
                .collect(),
        )
    }
}
