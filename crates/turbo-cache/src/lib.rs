//! Type-safe key-value layer.
//!
//! Values are stored as JSON. Inside a Spin component the backing store is
//! the host key-value interface; natively an in-process map stands in so
//! callers can be exercised in tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_cache::{cache_key, Cache};
//!
//! let cache = Cache::open_default()?;
//! let key = cache_key!("session", session_id);
//! let session: Option<AuthSession> = cache.get(&key)?;
//! ```

mod error;
mod kv;

pub use error::CacheError;
pub use kv::Cache;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{cache_key, Cache, CacheError};
}
