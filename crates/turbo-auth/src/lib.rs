//! Authentication for storefront back-office endpoints.
//!
//! Two ways in: a shared secret presented as a bearer token (scheduled
//! callers) and an admin session looked up in the key-value store.

mod error;
mod secret;
mod session;
mod store;
mod user;

pub use error::AuthError;
pub use secret::SharedSecret;
pub use session::{AuthSession, SessionId};
pub use store::SessionStore;
pub use user::{Role, User};
