//! Request and response models for the API.
//!
//! All models use serde for serialization/deserialization.
//! Storage models represent Redis data structures.

use crate::error::AuthError;
use serde::{Deserialize, Serialize};

// ============================================================================
// Auth Models
// ============================================================================

/// Login form submission.
///
/// Absent and `null` fields both deserialize as `None` so that validation can
/// report them with a single user-facing message.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Response after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    /// Landing path for the role.
    pub redirect: String,
}

/// Response for `GET /api/auth/session`.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Principal,
    pub redirect: String,
}

/// The authenticated caller.
///
/// Built once from verified token claims and handed to handlers; handlers
/// never read role or id from anywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

// ============================================================================
// Storage Models
// ============================================================================

/// Identity as stored in Redis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredIdentity {
    pub id: String,
    pub email: String,
    pub name: String,
    /// Argon2 PHC string. Never leaves the server.
    pub password_hash: String,
    pub role: Role,
    pub created_at: i64,
}

impl StoredIdentity {
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }
}

// ============================================================================
// Roles
// ============================================================================

/// Dashboard roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Interviewer,
    HrRecruiter,
    HrManager,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Interviewer, Role::HrRecruiter, Role::HrManager];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Interviewer => "interviewer",
            Role::HrRecruiter => "hr_recruiter",
            Role::HrManager => "hr_manager",
        }
    }

    /// Case-insensitive comparison against a raw role claim.
    pub fn matches(&self, claim: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(claim)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let claim = s.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.matches(claim))
            .ok_or(AuthError::InvalidRole)
    }
}
