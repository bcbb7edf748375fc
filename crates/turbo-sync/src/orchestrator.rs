//! Sync orchestration: guard, lease, fetch, diff & apply, dispatch.

use crate::catalog::CatalogSource;
use crate::clock::Clock;
use crate::diff::diff_variants;
use crate::dispatch::dispatch_restocks;
use crate::result::{ProductOutcome, RestockEvent, SyncResult, SyncStage};
use crate::settings::SyncSettings;
use crate::store::{NotificationStore, ProductStore, SyncLease};
use crate::SyncError;
use edge_observability::StructuredLogger;
use std::collections::HashMap;
use turbo_commerce::{Product, ProductId};

/// Lease row guarding the inventory job.
pub const LEASE_NAME: &str = "inventory";

/// Parameters of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncRequest {
    /// Restrict the run to one product.
    pub product_id: Option<ProductId>,
    /// Skip the recency guard (the lease still applies).
    pub force: bool,
}

impl SyncRequest {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn product(id: ProductId) -> Self {
        Self {
            product_id: Some(id),
            force: false,
        }
    }

    pub fn forced(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// One reconciliation job, wired to its collaborators.
pub struct InventorySync<'a, S: ?Sized, C: ?Sized, K: ?Sized> {
    store: &'a S,
    catalog: &'a C,
    clock: &'a K,
    settings: &'a SyncSettings,
    logger: &'a StructuredLogger,
}

impl<'a, S, C, K> InventorySync<'a, S, C, K>
where
    S: ProductStore + NotificationStore + SyncLease + ?Sized,
    C: CatalogSource + ?Sized,
    K: Clock + ?Sized,
{
    pub fn new(
        store: &'a S,
        catalog: &'a C,
        clock: &'a K,
        settings: &'a SyncSettings,
        logger: &'a StructuredLogger,
    ) -> Self {
        Self {
            store,
            catalog,
            clock,
            settings,
            logger,
        }
    }

    /// Run the job.
    ///
    /// Returns [`SyncError::Conflict`] without writing anything when the
    /// recency guard trips or another run holds the lease. Per-product
    /// failures never abort the run; they are collected in the result.
    pub fn run(&self, request: &SyncRequest) -> Result<SyncResult, SyncError> {
        let now = self.clock.now();

        if !request.force {
            self.check_recency(now)?;
        }

        let holder = format!("sync-{}", self.logger.request_id());
        if !self
            .store
            .try_acquire(LEASE_NAME, &holder, now, self.settings.lease_ttl_secs)?
        {
            self.logger.warn("sync rejected: lease held by another run");
            return Err(SyncError::Conflict(
                "another sync run holds the inventory lease".to_string(),
            ));
        }

        self.logger
            .info_builder("inventory sync started")
            .field("holder", holder.as_str())
            .field("scope", scope_label(request))
            .field_bool("force", request.force)
            .emit();

        let outcome = self.run_locked(request, now);

        match self.store.release(LEASE_NAME, &holder) {
            Ok(true) => {}
            Ok(false) => self.logger.warn("sync lease was taken over before release"),
            Err(e) => self
                .logger
                .error_builder("failed to release sync lease")
                .field("error", e.to_string())
                .emit(),
        }

        if let Ok(result) = &outcome {
            self.logger
                .info_builder("inventory sync finished")
                .field_i64("products_updated", result.products_updated as i64)
                .field_i64("variants_checked", result.variants_checked as i64)
                .field_i64("restock_events", result.restock_events.len() as i64)
                .field_i64(
                    "notifications_sent",
                    result.restock_notifications_sent as i64,
                )
                .field_i64("errors", result.errors.len() as i64)
                .emit();
        }
        outcome
    }

    fn check_recency(&self, now: i64) -> Result<(), SyncError> {
        let window = self.settings.guard_window_secs;
        if window == 0 {
            return Ok(());
        }
        if let Some(last) = self.store.most_recent_sync()? {
            if last > now {
                self.logger
                    .warn_builder("last_synced_at is in the future; ignoring recency guard")
                    .field_i64("last_synced_at", last)
                    .field_i64("now", now)
                    .emit();
                return Ok(());
            }
            if now - last < window {
                self.logger
                    .warn_builder("sync rejected: recent run inside guard window")
                    .field_i64("last_synced_at", last)
                    .field_i64("guard_window_secs", window)
                    .emit();
                return Err(SyncError::Conflict(format!(
                    "a sync completed {}s ago (guard window {}s)",
                    now - last,
                    window
                )));
            }
        }
        Ok(())
    }

    fn run_locked(&self, request: &SyncRequest, now: i64) -> Result<SyncResult, SyncError> {
        let mut result = SyncResult::new(now);

        let products = match &request.product_id {
            Some(id) => match self.store.get_product(id)? {
                Some(product) => vec![product],
                None => {
                    self.logger
                        .warn_builder("targeted product not found")
                        .field("product_id", id.as_str())
                        .emit();
                    result.fail(id.as_str(), SyncStage::Lookup, "product not found".to_string());
                    vec![]
                }
            },
            None => self.store.list_products()?,
        };

        let mut titles: HashMap<ProductId, String> = HashMap::new();
        let mut events: Vec<RestockEvent> = Vec::new();

        for product in &products {
            titles.insert(product.id.clone(), product.title.clone());
            self.sync_product(product, now, &mut result, &mut events);
        }

        let report = dispatch_restocks(self.store, &events, &titles, now, self.logger);
        result.restock_notifications_sent = report.sent;
        for failure in report.failures {
            result.note_error(failure.product_id, failure.stage, failure.message);
        }

        result.restock_events = events;
        result.finished_at = self.clock.now();
        Ok(result)
    }

    fn sync_product(
        &self,
        product: &Product,
        now: i64,
        result: &mut SyncResult,
        events: &mut Vec<RestockEvent>,
    ) {
        let remote = match self.catalog.fetch_product(&product.external_id) {
            Ok(remote) => remote,
            Err(e) => {
                self.logger
                    .warn_builder("catalog fetch failed")
                    .field("product_id", product.id.as_str())
                    .field("external_id", product.external_id.as_str())
                    .field("error", e.to_string())
                    .emit();
                result.fail(product.id.as_str(), SyncStage::Fetch, e.to_string());
                return;
            }
        };

        let diff = diff_variants(
            &product.variants,
            &remote.variants,
            self.settings.missing_variant_policy,
        );

        result.variants_checked += diff.checked;

        if let Err(e) = self.store.save_snapshot(&product.id, &diff.snapshot, now) {
            self.logger
                .error_builder("failed to persist variant snapshot")
                .field("product_id", product.id.as_str())
                .field("error", e.to_string())
                .emit();
            result.fail(product.id.as_str(), SyncStage::Persist, e.to_string());
            return;
        }

        result.variants_added += diff.added;
        result.variants_removed += diff.removed;

        for variant in &diff.restocked {
            self.logger
                .info_builder("variant restocked")
                .field("product_id", product.id.as_str())
                .field("variant_id", variant.id.as_str())
                .field("variant_title", variant.title.as_str())
                .emit();
            events.push(RestockEvent {
                product_id: product.id.clone(),
                variant_id: variant.id.clone(),
                variant_title: variant.title.clone(),
            });
        }

        if diff.changed {
            result.products_updated += 1;
            result.outcomes.push(ProductOutcome::Updated {
                product_id: product.id.clone(),
                restocked: diff.restocked.len(),
            });
        } else {
            result.outcomes.push(ProductOutcome::Unchanged {
                product_id: product.id.clone(),
            });
        }
    }
}

fn scope_label(request: &SyncRequest) -> String {
    match &request.product_id {
        Some(id) => id.to_string(),
        None => "all".to_string(),
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::catalog::CatalogError;
    use crate::settings::MissingVariantPolicy;
    use crate::sqlite::SqliteStore;
    use crate::testing::*;
    use edge_observability::{LogCapture, LogLevel, RequestId};
    use turbo_commerce::{RestockNotification, VariantId};

    const T0: i64 = 1_700_000_000;

    fn logger(capture: &LogCapture) -> StructuredLogger {
        StructuredLogger::capturing(RequestId::from_string("req-test"), capture)
    }

    fn subscribe(store: &SqliteStore, email: &str, product: &ProductId, variant: &str) -> RestockNotification {
        let n = RestockNotification::new(email, product.clone(), VariantId::new(variant), "Castle Tee / S", T0 - 100);
        store.insert_notification(&n).unwrap();
        n
    }

    fn castle_tee_restocked(catalog: &FakeCatalog) {
        catalog.set_variants(
            CASTLE_TEE_EXTERNAL_ID,
            vec![
                remote_variant("v1", "Castle Tee / S", true),
                remote_variant("v2", "Castle Tee / M", true),
            ],
        );
    }

    fn notification_row(store: &SqliteStore, id: &turbo_commerce::NotificationId) -> (bool, Option<i64>) {
        let result = store
            .db()
            .query(
                "SELECT notified, notified_at FROM restock_notifications WHERE id = ?",
                turbo_db::params![id.as_str()],
            )
            .unwrap();
        let row = result.first().unwrap();
        (row.boolean("notified").unwrap(), row.optional_integer("notified_at").unwrap())
    }

    // === Core properties ===

    #[test]
    fn test_castle_tee_scenario() {
        let (store, tee) = seeded_store();
        let catalog = FakeCatalog::new();
        castle_tee_restocked(&catalog);
        let waiting = subscribe(&store, "ada@example.com", &tee.id, "v1");
        let clock = FixedClock::new(T0);
        let settings = SyncSettings::default();
        let capture = LogCapture::new();
        let logger = logger(&capture);

        let result = InventorySync::new(&store, &catalog, &clock, &settings, &logger)
            .run(&SyncRequest::all())
            .unwrap();

        assert_eq!(result.variants_checked, 2);
        assert_eq!(result.products_updated, 1);
        assert_eq!(
            result.restock_events,
            vec![RestockEvent {
                product_id: tee.id.clone(),
                variant_id: VariantId::new("v1"),
                variant_title: "Castle Tee / S".to_string(),
            }]
        );
        assert_eq!(result.restock_notifications_sent, 1);
        assert!(result.errors.is_empty());

        let summary = serde_json::to_value(result.to_response()).unwrap();
        assert_eq!(summary["results"]["productsUpdated"], 1);
        assert_eq!(summary["results"]["variantsChecked"], 2);

        assert_eq!(notification_row(&store, &waiting.id), (true, Some(T0)));
        let outbox = store.mail_outbox().unwrap();
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].email, "ada@example.com");
        assert_eq!(outbox[0].product_title, "Castle Tee");

        let synced = store.get_product(&tee.id).unwrap().unwrap();
        assert_eq!(synced.last_synced_at, Some(T0));
        assert!(synced.variants.iter().all(|v| v.available));
    }

    #[test]
    fn test_second_run_without_remote_change_is_quiet() {
        let (store, tee) = seeded_store();
        let catalog = FakeCatalog::new();
        castle_tee_restocked(&catalog);
        subscribe(&store, "ada@example.com", &tee.id, "v1");
        let clock = FixedClock::new(T0);
        let settings = SyncSettings::default();
        let capture = LogCapture::new();
        let logger = logger(&capture);
        let job = InventorySync::new(&store, &catalog, &clock, &settings, &logger);

        job.run(&SyncRequest::all()).unwrap();
        clock.advance(settings.guard_window_secs);
        let second = job.run(&SyncRequest::all()).unwrap();

        assert!(second.restock_events.is_empty());
        assert_eq!(second.products_updated, 0);
        assert_eq!(second.variants_checked, 2);
        assert_eq!(second.restock_notifications_sent, 0);
        assert_eq!(
            second.outcomes,
            vec![ProductOutcome::Unchanged { product_id: tee.id.clone() }]
        );
        assert_eq!(store.mail_outbox().unwrap().len(), 1);
        assert_eq!(
            store.get_product(&tee.id).unwrap().unwrap().last_synced_at,
            Some(T0 + settings.guard_window_secs)
        );
    }

    #[test]
    fn test_redispatch_of_same_event_finds_nothing() {
        let (store, tee) = seeded_store();
        let waiting = subscribe(&store, "ada@example.com", &tee.id, "v1");
        let capture = LogCapture::new();
        let logger = logger(&capture);
        let event = RestockEvent {
            product_id: tee.id.clone(),
            variant_id: VariantId::new("v1"),
            variant_title: "Castle Tee / S".to_string(),
        };
        let titles = HashMap::from([(tee.id.clone(), tee.title.clone())]);

        let first = dispatch_restocks(&store, std::slice::from_ref(&event), &titles, T0, &logger);
        let second = dispatch_restocks(&store, std::slice::from_ref(&event), &titles, T0 + 5, &logger);

        assert_eq!(first.sent, 1);
        assert_eq!(second.sent, 0);
        assert_eq!(notification_row(&store, &waiting.id), (true, Some(T0)));
        assert_eq!(store.mail_outbox().unwrap().len(), 1);
    }

    #[test]
    fn test_subscriber_to_disabled_variant_notified_when_reenabled() {
        let (store, tee) = seeded_store();
        let disabled = turbo_commerce::Variant::new(VariantId::new("v3"), "Castle Tee / L", price())
            .with_availability(true)
            .with_enabled(false);
        let mut snapshot = tee.variants.clone();
        snapshot.push(disabled);
        seed_snapshot(&store, &tee.id, &snapshot);

        let clock = FixedClock::new(T0);
        let subscribed = crate::Subscriptions::new(&store, &clock)
            .subscribe("ada@example.com", &tee.id, &VariantId::new("v3"))
            .unwrap();
        assert!(subscribed.is_created());

        let catalog = FakeCatalog::new();
        catalog.set_variants(
            CASTLE_TEE_EXTERNAL_ID,
            vec![
                remote_variant("v1", "Castle Tee / S", false),
                remote_variant("v2", "Castle Tee / M", true),
                remote_variant("v3", "Castle Tee / L", true),
            ],
        );
        let settings = SyncSettings::default();
        let capture = LogCapture::new();
        let logger = logger(&capture);

        let result = InventorySync::new(&store, &catalog, &clock, &settings, &logger)
            .run(&SyncRequest::all())
            .unwrap();

        assert_eq!(result.restock_events.len(), 1);
        assert_eq!(result.restock_events[0].variant_id, VariantId::new("v3"));
        assert_eq!(result.restock_notifications_sent, 1);
        assert!(store.pending_for_product(&tee.id).unwrap().is_empty());
    }

    // === Concurrency guard ===

    #[test]
    fn test_future_sync_timestamp_does_not_block_runs() {
        let (store, tee) = seeded_store();
        store
            .save_snapshot(&tee.id, &tee.variants, T0 + 3_600)
            .unwrap();
        let catalog = FakeCatalog::new();
        castle_tee_restocked(&catalog);
        let clock = FixedClock::new(T0);
        let settings = SyncSettings::default();
        let capture = LogCapture::new();
        let logger = logger(&capture);

        let result = InventorySync::new(&store, &catalog, &clock, &settings, &logger)
            .run(&SyncRequest::all())
            .unwrap();

        assert_eq!(result.restock_events.len(), 1);
        assert!(capture
            .at_level(LogLevel::Warn)
            .iter()
            .any(|e| e.message.contains("in the future")));
    }

    #[test]
    fn test_recency_guard_rejects_without_writes() {
        let (store, tee) = seeded_store();
        let catalog = FakeCatalog::new();
        castle_tee_restocked(&catalog);
        let clock = FixedClock::new(T0);
        let settings = SyncSettings::default();
        let capture = LogCapture::new();
        let logger = logger(&capture);
        let job = InventorySync::new(&store, &catalog, &clock, &settings, &logger);

        job.run(&SyncRequest::all()).unwrap();
        let snapshot_before = store.get_product(&tee.id).unwrap().unwrap();
        let calls_before = catalog.calls().len();

        // remote changes, but the guard must keep the run from seeing it
        catalog.set_variants(CASTLE_TEE_EXTERNAL_ID, vec![remote_variant("v1", "Castle Tee / S", false)]);
        clock.advance(settings.guard_window_secs - 1);
        let err = job.run(&SyncRequest::all()).unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(catalog.calls().len(), calls_before);
        assert_eq!(store.get_product(&tee.id).unwrap().unwrap(), snapshot_before);
        assert!(store.current_lease(LEASE_NAME).unwrap().is_none());
        assert!(!capture.at_level(LogLevel::Warn).is_empty());
    }

    #[test]
    fn test_force_skips_recency_guard() {
        let (store, _tee) = seeded_store();
        let catalog = FakeCatalog::new();
        castle_tee_restocked(&catalog);
        let clock = FixedClock::new(T0);
        let settings = SyncSettings::default();
        let capture = LogCapture::new();
        let logger = logger(&capture);
        let job = InventorySync::new(&store, &catalog, &clock, &settings, &logger);

        job.run(&SyncRequest::all()).unwrap();
        clock.advance(1);
        let forced = job.run(&SyncRequest::all().forced(true)).unwrap();
        assert_eq!(forced.variants_checked, 2);
        assert_eq!(catalog.calls().len(), 2);
    }

    #[test]
    fn test_zero_guard_window_disables_recency_check() {
        let (store, _tee) = seeded_store();
        let catalog = FakeCatalog::new();
        castle_tee_restocked(&catalog);
        let clock = FixedClock::new(T0);
        let settings = SyncSettings {
            guard_window_secs: 0,
            ..SyncSettings::default()
        };
        let capture = LogCapture::new();
        let logger = logger(&capture);
        let job = InventorySync::new(&store, &catalog, &clock, &settings, &logger);

        job.run(&SyncRequest::all()).unwrap();
        assert!(job.run(&SyncRequest::all()).is_ok());
    }

    #[test]
    fn test_held_lease_rejects_even_when_forced() {
        let (store, _tee) = seeded_store();
        let catalog = FakeCatalog::new();
        castle_tee_restocked(&catalog);
        let clock = FixedClock::new(T0);
        let settings = SyncSettings::default();
        let capture = LogCapture::new();
        let logger = logger(&capture);

        assert!(store.try_acquire(LEASE_NAME, "other-run", T0 - 10, 300).unwrap());
        let err = InventorySync::new(&store, &catalog, &clock, &settings, &logger)
            .run(&SyncRequest::all().forced(true))
            .unwrap_err();

        assert!(matches!(err, SyncError::Conflict(_)));
        assert!(catalog.calls().is_empty());
        assert_eq!(store.current_lease(LEASE_NAME).unwrap().unwrap().holder, "other-run");
    }

    #[test]
    fn test_expired_lease_is_taken_over_and_released() {
        let (store, _tee) = seeded_store();
        let catalog = FakeCatalog::new();
        castle_tee_restocked(&catalog);
        let clock = FixedClock::new(T0);
        let settings = SyncSettings::default();
        let capture = LogCapture::new();
        let logger = logger(&capture);

        assert!(store.try_acquire(LEASE_NAME, "crashed-run", T0 - 400, 300).unwrap());
        InventorySync::new(&store, &catalog, &clock, &settings, &logger)
            .run(&SyncRequest::all())
            .unwrap();
        assert!(store.current_lease(LEASE_NAME).unwrap().is_none());
    }

    // === Per-product isolation ===

    #[test]
    fn test_fetch_failure_does_not_abort_other_products() {
        let (store, tee) = seeded_store();
        let hoodie = store.register_product("4712", "Moat Hoodie", 0).unwrap();
        let catalog = FakeCatalog::new();
        catalog.fail(
            CASTLE_TEE_EXTERNAL_ID,
            CatalogError::Http { status: 500, message: "upstream down".to_string() },
        );
        catalog.set_variants("4712", vec![remote_variant("h1", "Moat Hoodie / L", true)]);
        let clock = FixedClock::new(T0);
        let settings = SyncSettings::default();
        let capture = LogCapture::new();
        let logger = logger(&capture);

        let result = InventorySync::new(&store, &catalog, &clock, &settings, &logger)
            .run(&SyncRequest::all())
            .unwrap();

        assert_eq!(result.products_updated, 1);
        assert_eq!(result.variants_checked, 1);
        assert_eq!(result.variants_added, 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].product_id, tee.id.to_string());
        assert_eq!(result.errors[0].stage, SyncStage::Fetch);
        assert!(result.errors[0].message.contains("upstream down"));

        assert_eq!(store.get_product(&tee.id).unwrap().unwrap().last_synced_at, None);
        assert_eq!(store.get_product(&hoodie.id).unwrap().unwrap().last_synced_at, Some(T0));
        assert!(store.current_lease(LEASE_NAME).unwrap().is_none());
    }

    #[test]
    fn test_persist_failure_is_recorded_and_skips_events() {
        let (store, tee) = seeded_store();
        let hoodie = store.register_product("4712", "Moat Hoodie", 0).unwrap();
        let catalog = FakeCatalog::new();
        castle_tee_restocked(&catalog);
        catalog.set_variants("4712", vec![remote_variant("h1", "Moat Hoodie / L", true)]);
        subscribe(&store, "ada@example.com", &tee.id, "v1");
        let mut faulty = FaultyStore::new(&store);
        faulty.fail_snapshot.insert(tee.id.clone());
        let clock = FixedClock::new(T0);
        let settings = SyncSettings::default();
        let capture = LogCapture::new();
        let logger = logger(&capture);

        let result = InventorySync::new(&faulty, &catalog, &clock, &settings, &logger)
            .run(&SyncRequest::all())
            .unwrap();

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].stage, SyncStage::Persist);
        assert!(result.restock_events.is_empty());
        assert_eq!(result.restock_notifications_sent, 0);
        assert_eq!(result.products_updated, 1);
        assert_eq!(result.variants_checked, 3);
        assert_eq!(store.get_product(&hoodie.id).unwrap().unwrap().last_synced_at, Some(T0));
        assert_eq!(store.pending_for_product(&tee.id).unwrap().len(), 1);
    }

    #[test]
    fn test_dispatch_failure_skips_one_record() {
        let (store, tee) = seeded_store();
        let catalog = FakeCatalog::new();
        castle_tee_restocked(&catalog);
        let broken = subscribe(&store, "ada@example.com", &tee.id, "v1");
        let fine = subscribe(&store, "bob@example.com", &tee.id, "v1");
        let mut faulty = FaultyStore::new(&store);
        faulty.fail_notify.insert(broken.id.clone());
        let clock = FixedClock::new(T0);
        let settings = SyncSettings::default();
        let capture = LogCapture::new();
        let logger = logger(&capture);

        let result = InventorySync::new(&faulty, &catalog, &clock, &settings, &logger)
            .run(&SyncRequest::all())
            .unwrap();

        assert_eq!(result.restock_notifications_sent, 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].stage, SyncStage::Dispatch);
        assert_eq!(notification_row(&store, &broken.id), (false, None));
        assert_eq!(notification_row(&store, &fine.id), (true, Some(T0)));
        assert!(!capture.at_level(LogLevel::Error).is_empty());
    }

    // === Targeted sync & policy ===

    #[test]
    fn test_targeted_sync_fetches_one_product() {
        let (store, tee) = seeded_store();
        store.register_product("4712", "Moat Hoodie", 0).unwrap();
        let catalog = FakeCatalog::new();
        castle_tee_restocked(&catalog);
        let clock = FixedClock::new(T0);
        let settings = SyncSettings::default();
        let capture = LogCapture::new();
        let logger = logger(&capture);

        let result = InventorySync::new(&store, &catalog, &clock, &settings, &logger)
            .run(&SyncRequest::product(tee.id.clone()))
            .unwrap();

        assert_eq!(catalog.calls(), vec![CASTLE_TEE_EXTERNAL_ID.to_string()]);
        assert_eq!(result.outcomes.len(), 1);
    }

    #[test]
    fn test_targeted_sync_of_unknown_product_is_an_error_entry() {
        let (store, _tee) = seeded_store();
        let catalog = FakeCatalog::new();
        let clock = FixedClock::new(T0);
        let settings = SyncSettings::default();
        let capture = LogCapture::new();
        let logger = logger(&capture);

        let result = InventorySync::new(&store, &catalog, &clock, &settings, &logger)
            .run(&SyncRequest::product(ProductId::new("prod_missing")))
            .unwrap();

        assert!(catalog.calls().is_empty());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].stage, SyncStage::Lookup);
        assert_eq!(result.errors[0].product_id, "prod_missing");
    }

    #[test]
    fn test_mark_discontinued_policy_keeps_missing_variant() {
        let (store, tee) = seeded_store();
        let catalog = FakeCatalog::new();
        catalog.set_variants(CASTLE_TEE_EXTERNAL_ID, vec![remote_variant("v1", "Castle Tee / S", false)]);
        subscribe(&store, "ada@example.com", &tee.id, "v2");
        let clock = FixedClock::new(T0);
        let settings = SyncSettings {
            missing_variant_policy: MissingVariantPolicy::MarkDiscontinued,
            ..SyncSettings::default()
        };
        let capture = LogCapture::new();
        let logger = logger(&capture);

        let result = InventorySync::new(&store, &catalog, &clock, &settings, &logger)
            .run(&SyncRequest::all())
            .unwrap();

        assert_eq!(result.variants_removed, 1);
        let synced = store.get_product(&tee.id).unwrap().unwrap();
        let v2 = synced.variant(&VariantId::new("v2")).unwrap();
        assert!(v2.discontinued);
        assert_eq!(store.pending_for_product(&tee.id).unwrap().len(), 1);
    }

    #[test]
    fn test_restock_is_logged() {
        let (store, _tee) = seeded_store();
        let catalog = FakeCatalog::new();
        castle_tee_restocked(&catalog);
        let clock = FixedClock::new(T0);
        let settings = SyncSettings::default();
        let capture = LogCapture::new();
        let logger = logger(&capture);

        InventorySync::new(&store, &catalog, &clock, &settings, &logger)
            .run(&SyncRequest::all())
            .unwrap();

        let restocked: Vec<_> = capture
            .entries()
            .into_iter()
            .filter(|e| e.message == "variant restocked")
            .collect();
        assert_eq!(restocked.len(), 1);
        assert_eq!(restocked[0].field("variant_id"), Some(&serde_json::json!("v1")));
    }
}
