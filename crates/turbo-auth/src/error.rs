//! Authentication errors.

use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No credentials were presented.
    #[error("missing credentials")]
    MissingCredentials,

    /// Credentials were presented but did not match.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Session not found.
    #[error("session not found")]
    SessionNotFound,

    /// Session expired.
    #[error("session expired")]
    SessionExpired,

    /// Insufficient permissions.
    #[error("insufficient permissions")]
    InsufficientPermissions,

    /// Cache error.
    #[error("cache error: {0}")]
    Cache(#[from] turbo_cache::CacheError),
}

impl AuthError {
    /// Check if this is an authentication failure.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            AuthError::MissingCredentials
                | AuthError::InvalidCredentials
                | AuthError::SessionNotFound
                | AuthError::SessionExpired
        )
    }

    /// Check if this is a permission error.
    pub fn is_permission_error(&self) -> bool {
        matches!(self, AuthError::InsufficientPermissions)
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> u16 {
        if self.is_auth_failure() {
            401
        } else if self.is_permission_error() {
            403
        } else {
            500
        }
    }
}
