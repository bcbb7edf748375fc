//! "Notify me when it's back" subscriptions.

use crate::ids::{NotificationId, ProductId, VariantId};
use crate::CommerceError;
use serde::{Deserialize, Serialize};

/// Maximum accepted email length (RFC 5321 path limit).
const MAX_EMAIL_LEN: usize = 254;

/// A customer's request to be told when a variant is back in stock.
///
/// At most one pending record exists per (email, product, variant). A record
/// becomes notified exactly once and is never deleted automatically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestockNotification {
    /// Unique identifier.
    pub id: NotificationId,
    /// Normalized (trimmed, lowercase) email address.
    pub email: String,
    /// Product the variant belongs to.
    pub product_id: ProductId,
    /// Variant the customer is waiting for.
    pub variant_id: VariantId,
    /// Variant title at subscription time, used in the email.
    pub variant_title: String,
    /// Whether the customer has been notified.
    pub notified: bool,
    /// Unix timestamp of notification.
    pub notified_at: Option<i64>,
    /// Unix timestamp of creation.
    pub created_at: i64,
}

impl RestockNotification {
    /// Create a pending notification. The email must already be normalized.
    pub fn new(
        email: impl Into<String>,
        product_id: ProductId,
        variant_id: VariantId,
        variant_title: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: NotificationId::generate(),
            email: email.into(),
            product_id,
            variant_id,
            variant_title: variant_title.into(),
            notified: false,
            notified_at: None,
            created_at,
        }
    }

    /// Still waiting for a restock.
    pub fn is_pending(&self) -> bool {
        !self.notified
    }
}

/// Trim, lowercase and sanity-check an email address.
pub fn normalize_email(raw: &str) -> Result<String, CommerceError> {
    let email = raw.trim().to_lowercase();
    let invalid = || CommerceError::InvalidEmail(raw.trim().to_string());

    if email.is_empty() || email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }

    Ok(email)
}
