//! Persistence seams used by the sync job.

use crate::dispatch::MailIntent;
use turbo_commerce::{NotificationId, Product, ProductId, RestockNotification, Variant, VariantId};
use turbo_db::DbError;

/// Locally known products and their cached variant snapshots.
pub trait ProductStore {
    /// All products, ordered by id.
    fn list_products(&self) -> Result<Vec<Product>, DbError>;

    fn get_product(&self, id: &ProductId) -> Result<Option<Product>, DbError>;

    /// Replace the variant snapshot and set `last_synced_at`.
    fn save_snapshot(
        &self,
        id: &ProductId,
        variants: &[Variant],
        synced_at: i64,
    ) -> Result<(), DbError>;

    /// Latest `last_synced_at` across all products.
    fn most_recent_sync(&self) -> Result<Option<i64>, DbError>;

    /// Start tracking a catalog product. Fails with a constraint error if
    /// the external id is already registered.
    fn register_product(
        &self,
        external_id: &str,
        title: &str,
        now: i64,
    ) -> Result<Product, DbError>;

    /// Stop tracking a product. Returns whether it existed.
    fn remove_product(&self, id: &ProductId) -> Result<bool, DbError>;
}

/// Restock subscriptions.
pub trait NotificationStore {
    /// Active records for one variant.
    fn pending_for_variant(
        &self,
        product_id: &ProductId,
        variant_id: &VariantId,
    ) -> Result<Vec<RestockNotification>, DbError>;

    /// Active records for every variant of a product.
    fn pending_for_product(&self, product_id: &ProductId)
        -> Result<Vec<RestockNotification>, DbError>;

    fn find_active(
        &self,
        email: &str,
        product_id: &ProductId,
        variant_id: &VariantId,
    ) -> Result<Option<RestockNotification>, DbError>;

    fn insert_notification(&self, notification: &RestockNotification) -> Result<(), DbError>;

    /// Delete the active record, if any. Returns whether one was removed.
    fn delete_active(
        &self,
        email: &str,
        product_id: &ProductId,
        variant_id: &VariantId,
    ) -> Result<bool, DbError>;

    /// Flip `notified` from false to true and enqueue `intent`, atomically.
    ///
    /// Returns `false` without enqueueing when the record was already
    /// notified (or is gone).
    fn notify_once(
        &self,
        id: &NotificationId,
        notified_at: i64,
        intent: &MailIntent,
    ) -> Result<bool, DbError>;
}

/// A persisted exclusive claim on a named job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseRecord {
    pub name: String,
    pub holder: String,
    pub acquired_at: i64,
    pub expires_at: i64,
}

/// Compare-and-swap lease over a single row per name.
pub trait SyncLease {
    /// Claim `name` for `holder` if it is free or expired at `now`.
    fn try_acquire(&self, name: &str, holder: &str, now: i64, ttl_secs: i64)
        -> Result<bool, DbError>;

    /// Release `name` if `holder` still owns it.
    fn release(&self, name: &str, holder: &str) -> Result<bool, DbError>;

    /// The current claim, if any (including expired ones).
    fn current_lease(&self, name: &str) -> Result<Option<LeaseRecord>, DbError>;
}
