//! Login credential validation and verification.

use super::password::verify_password;
use crate::error::AuthError;
use crate::models::{LoginRequest, Principal, Role, StoredIdentity};

/// A login submission that passed field validation.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Check that every field is present and that the role is a known one.
pub fn validate_login(req: &LoginRequest) -> Result<LoginCredentials, AuthError> {
    let email = req.email.as_deref().map(str::trim).unwrap_or_default();
    let password = req.password.as_deref().unwrap_or_default();
    let role = req.role.as_deref().map(str::trim).unwrap_or_default();

    if email.is_empty() || password.is_empty() || role.is_empty() {
        return Err(AuthError::MissingField);
    }

    Ok(LoginCredentials {
        email: email.to_string(),
        password: password.to_string(),
        role: role.parse()?,
    })
}

/// Verify credentials against the identity looked up by email.
///
/// Checks run in a fixed order: existence, role, then password. The role is
/// part of authentication, so a correct password for the wrong role fails
/// with `RoleMismatch`.
pub fn verify_credentials(
    identity: Option<&StoredIdentity>,
    credentials: &LoginCredentials,
) -> Result<Principal, AuthError> {
    let identity = identity.ok_or(AuthError::NotFound)?;

    if identity.role != credentials.role {
        return Err(AuthError::RoleMismatch);
    }

    if !verify_password(&identity.password_hash, &credentials.password) {
        return Err(AuthError::InvalidCredentials);
    }

    Ok(identity.principal())
}
