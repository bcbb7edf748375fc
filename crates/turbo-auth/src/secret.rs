//! Shared-secret bearer verification.

use crate::AuthError;
use subtle::ConstantTimeEq;

/// A secret shared with a trusted caller, such as a scheduler.
///
/// An empty secret never verifies, so an unset deployment variable cannot
/// open the endpoint.
#[derive(Clone)]
pub struct SharedSecret(String);

impl SharedSecret {
    /// Wrap a configured secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Check whether a secret has been configured at all.
    pub fn is_configured(&self) -> bool {
        !self.0.is_empty()
    }

    /// Verify a presented token in constant time.
    pub fn verify(&self, presented: Option<&str>) -> Result<(), AuthError> {
        let presented = presented.ok_or(AuthError::MissingCredentials)?;
        if !self.is_configured() {
            return Err(AuthError::InvalidCredentials);
        }
        if constant_time_eq(self.0.as_bytes(), presented.as_bytes()) {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret(***)")
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
