//! Session lookup and role checks against the key-value store.

use crate::{AuthError, AuthSession, Role, SessionId, User};
use turbo_cache::Cache;

/// Reads and writes [`AuthSession`] records under `session:{id}`.
pub struct SessionStore<'a> {
    cache: &'a Cache,
}

impl<'a> SessionStore<'a> {
    /// Wrap an open cache.
    pub fn new(cache: &'a Cache) -> Self {
        Self { cache }
    }

    /// Persist a session.
    pub fn save(&self, session: &AuthSession) -> Result<(), AuthError> {
        self.cache.set(&session.id.cache_key(), session)?;
        Ok(())
    }

    /// Remove a session.
    pub fn revoke(&self, id: &SessionId) -> Result<(), AuthError> {
        self.cache.delete(&id.cache_key())?;
        Ok(())
    }

    /// Resolve a presented session id to a live session.
    pub fn authenticate(&self, id: Option<&str>, now: i64) -> Result<AuthSession, AuthError> {
        let id = id
            .filter(|s| !s.is_empty())
            .map(SessionId::from)
            .ok_or(AuthError::MissingCredentials)?;
        let session: AuthSession = self
            .cache
            .get(&id.cache_key())?
            .ok_or(AuthError::SessionNotFound)?;
        session.validate(now)?;
        Ok(session)
    }

    /// Authenticate and require at least `role`.
    pub fn require_role(&self, id: Option<&str>, role: Role, now: i64) -> Result<User, AuthError> {
        let session = self.authenticate(id, now)?;
        if session.user.has_permission(role) {
            Ok(session.user)
        } else {
            Err(AuthError::InsufficientPermissions)
        }
    }
}
