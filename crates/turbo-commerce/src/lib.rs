//! Catalog and restock domain types for the storefront.
//!
//! This crate holds the types shared by the inventory sync job, the
//! storefront workload and the operator CLI:
//!
//! - **Catalog**: products mirrored from the print provider, with their
//!   cached variant snapshot
//! - **Restock**: "notify me" subscriptions for out-of-stock variants
//! - **Money**: integer minor-unit prices
//!
//! # Example
//!
//! ```rust
//! use turbo_commerce::prelude::*;
//!
//! let mut product = Product::new(ProductId::new("castle-tee"), "4711", "Castle Tee");
//! product.variants.push(
//!     Variant::new(VariantId::new("101"), "Castle Tee / M", Money::new(2900, Currency::EUR))
//!         .with_availability(false),
//! );
//!
//! assert!(!product.is_in_stock());
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod catalog;
pub mod restock;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

pub use catalog::{Product, Variant};
pub use restock::{normalize_email, RestockNotification};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{Product, Variant};

    // Restock
    pub use crate::restock::{normalize_email, RestockNotification};
}
