//! Type-safe SQLite database layer.
//!
//! Inside a Spin component queries go through the host SQLite interface.
//! Natively the same API is backed by an embedded SQLite, which is what the
//! tests and command-line tools use.
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_db::{Db, params};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Pending {
//!     id: String,
//!     email: String,
//! }
//!
//! let db = Db::open_default()?;
//!
//! let claimed = db.execute(
//!     "UPDATE restock_notifications SET notified = 1 WHERE id = ? AND notified = 0",
//!     params!["rn_123"],
//! )?;
//!
//! let pending: Vec<Pending> = db.query_as(
//!     "SELECT id, email FROM restock_notifications WHERE product_id = ? AND notified = 0",
//!     params!["prod_1"],
//! )?;
//! ```

mod db;
mod error;
mod types;

pub use db::Db;
pub use error::DbError;
pub use types::{QueryResult, Row, Value};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{params, Db, DbError, QueryResult, Row, Value};
}

/// Create a parameter list for SQL queries.
///
/// # Example
///
/// ```rust,ignore
/// use turbo_db::params;
///
/// let params = params!["value1", 42, 3.14];
/// ```
#[macro_export]
macro_rules! params {
    () => {
        &[] as &[$crate::Value]
    };
    ($($param:expr),+ $(,)?) => {
        &[$($crate::Value::from($param)),+]
    };
}
