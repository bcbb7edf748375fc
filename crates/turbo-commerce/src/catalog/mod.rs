//! Product catalog module.
//!
//! Products are mirrored from the print provider's catalog; each keeps
//! the variant snapshot observed by the most recent successful sync.

mod product;

pub use product::{Product, Variant};
