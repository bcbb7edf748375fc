//! Fakes shared by the unit tests.

use crate::catalog::{CatalogError, CatalogSource, RemoteProduct, RemoteVariant};
use crate::clock::Clock;
use crate::dispatch::MailIntent;
use crate::sqlite::SqliteStore;
use crate::store::{LeaseRecord, NotificationStore, ProductStore, SyncLease};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use turbo_commerce::{
    Currency, Money, NotificationId, Product, ProductId, RestockNotification, Variant, VariantId,
};
use turbo_db::{params, Db, DbError};

pub const CASTLE_TEE_EXTERNAL_ID: &str = "4711";

/// Clock that only moves when told to.
pub struct FixedClock(Cell<i64>);

impl FixedClock {
    pub fn new(now: i64) -> Self {
        Self(Cell::new(now))
    }

    pub fn advance(&self, secs: i64) {
        self.0.set(self.0.get() + secs);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0.get()
    }
}

pub fn price() -> Money {
    Money::new(2900, Currency::EUR)
}

pub fn remote_variant(id: &str, title: &str, available: bool) -> RemoteVariant {
    RemoteVariant {
        id: VariantId::new(id),
        title: title.to_string(),
        available,
        enabled: true,
        price: Some(price()),
    }
}

/// Catalog answering from a table, recording every request.
#[derive(Default)]
pub struct FakeCatalog {
    products: RefCell<HashMap<String, Result<RemoteProduct, CatalogError>>>,
    calls: RefCell<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_variants(&self, external_id: &str, variants: Vec<RemoteVariant>) {
        self.products.borrow_mut().insert(
            external_id.to_string(),
            Ok(RemoteProduct {
                external_id: external_id.to_string(),
                title: format!("Remote {}", external_id),
                variants,
            }),
        );
    }

    pub fn fail(&self, external_id: &str, error: CatalogError) {
        self.products
            .borrow_mut()
            .insert(external_id.to_string(), Err(error));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CatalogSource for FakeCatalog {
    fn fetch_product(&self, external_id: &str) -> Result<RemoteProduct, CatalogError> {
        self.calls.borrow_mut().push(external_id.to_string());
        self.products
            .borrow()
            .get(external_id)
            .cloned()
            .unwrap_or_else(|| {
                Err(CatalogError::Http {
                    status: 404,
                    message: "not found".to_string(),
                })
            })
    }
}

/// Overwrite a product's snapshot without touching `last_synced_at`.
pub fn seed_snapshot(store: &SqliteStore, id: &ProductId, variants: &[Variant]) {
    store
        .db()
        .execute(
            "UPDATE products SET variants = ? WHERE id = ?",
            params![serde_json::to_string(variants).unwrap(), id.as_str()],
        )
        .unwrap();
}

/// Store with the castle tee: v1 (S) unavailable, v2 (M) available.
pub fn seeded_store() -> (SqliteStore, Product) {
    let store = SqliteStore::new(Db::open_in_memory().unwrap());
    store.migrate().unwrap();
    let tee = store
        .register_product(CASTLE_TEE_EXTERNAL_ID, "Castle Tee", 0)
        .unwrap();
    seed_snapshot(
        &store,
        &tee.id,
        &[
            Variant::new(VariantId::new("v1"), "Castle Tee / S", price()).with_availability(false),
            Variant::new(VariantId::new("v2"), "Castle Tee / M", price()),
        ],
    );
    let tee = store.get_product(&tee.id).unwrap().unwrap();
    (store, tee)
}

/// Store wrapper that fails selected writes.
pub struct FaultyStore<'a> {
    pub inner: &'a SqliteStore,
    pub fail_snapshot: HashSet<ProductId>,
    pub fail_notify: HashSet<NotificationId>,
}

impl<'a> FaultyStore<'a> {
    pub fn new(inner: &'a SqliteStore) -> Self {
        Self {
            inner,
            fail_snapshot: HashSet::new(),
            fail_notify: HashSet::new(),
        }
    }
}

fn injected() -> DbError {
    DbError::QueryError("disk I/O error".to_string())
}

impl ProductStore for FaultyStore<'_> {
    fn list_products(&self) -> Result<Vec<Product>, DbError> {
        self.inner.list_products()
    }

    fn get_product(&self, id: &ProductId) -> Result<Option<Product>, DbError> {
        self.inner.get_product(id)
    }

    fn save_snapshot(&self, id: &ProductId, variants: &[Variant], synced_at: i64) -> Result<(), DbError> {
        if self.fail_snapshot.contains(id) {
            return Err(injected());
        }
        self.inner.save_snapshot(id, variants, synced_at)
    }

    fn most_recent_sync(&self) -> Result<Option<i64>, DbError> {
        self.inner.most_recent_sync()
    }

    fn register_product(&self, external_id: &str, title: &str, now: i64) -> Result<Product, DbError> {
        self.inner.register_product(external_id, title, now)
    }

    fn remove_product(&self, id: &ProductId) -> Result<bool, DbError> {
        self.inner.remove_product(id)
    }
}

impl NotificationStore for FaultyStore<'_> {
    fn pending_for_variant(
        &self,
        product_id: &ProductId,
        variant_id: &VariantId,
    ) -> Result<Vec<RestockNotification>, DbError> {
        self.inner.pending_for_variant(product_id, variant_id)
    }

    fn pending_for_product(&self, product_id: &ProductId) -> Result<Vec<RestockNotification>, DbError> {
        self.inner.pending_for_product(product_id)
    }

    fn find_active(
        &self,
        email: &str,
        product_id: &ProductId,
        variant_id: &VariantId,
    ) -> Result<Option<RestockNotification>, DbError> {
        self.inner.find_active(email, product_id, variant_id)
    }

    fn insert_notification(&self, notification: &RestockNotification) -> Result<(), DbError> {
        self.inner.insert_notification(notification)
    }

    fn delete_active(
        &self,
        email: &str,
        product_id: &ProductId,
        variant_id: &VariantId,
    ) -> Result<bool, DbError> {
        self.inner.delete_active(email, product_id, variant_id)
    }

    fn notify_once(&self, id: &NotificationId, notified_at: i64, intent: &MailIntent) -> Result<bool, DbError> {
        if self.fail_notify.contains(id) {
            return Err(injected());
        }
        self.inner.notify_once(id, notified_at, intent)
    }
}

impl SyncLease for FaultyStore<'_> {
    fn try_acquire(&self, name: &str, holder: &str, now: i64, ttl_secs: i64) -> Result<bool, DbError> {
        self.inner.try_acquire(name, holder, now, ttl_secs)
    }

    fn release(&self, name: &str, holder: &str) -> Result<bool, DbError> {
        self.inner.release(name, holder)
    }

    fn current_lease(&self, name: &str) -> Result<Option<LeaseRecord>, DbError> {
        self.inner.current_lease(name)
    }
}
