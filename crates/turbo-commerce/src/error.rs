//! Commerce error types.

use thiserror::Error;

/// Errors raised by catalog and restock domain operations.
#[derive(Error, Debug, PartialEq)]
pub enum CommerceError {
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Variant not found on a product.
    #[error("Variant {variant_id} not found on product {product_id}")]
    VariantNotFound {
        product_id: String,
        variant_id: String,
    },

    /// Restock subscriptions only make sense for unavailable variants.
    #[error("Variant {variant_id} of product {product_id} is in stock")]
    VariantAvailable {
        product_id: String,
        variant_id: String,
    },

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// Price could not be parsed.
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// Unsupported currency code.
    #[error("Unsupported currency: {0}")]
    UnknownCurrency(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl CommerceError {
    /// True for lookups that failed because something does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CommerceError::ProductNotFound(_) | CommerceError::VariantNotFound { .. }
        )
    }
}
