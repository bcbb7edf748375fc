//! Inventory reconciliation for the print-on-demand storefront.
//!
//! One sync run fetches every locally known product from the fulfillment
//! provider's catalog, diffs availability against the stored snapshot,
//! persists the new snapshot, and hands restocked variants to the
//! notification dispatcher. Runs are serialized by a recency guard and an
//! exclusive lease row.
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_sync::{HttpCatalog, InventorySync, SqliteStore, SyncRequest, SyncSettings, SystemClock};
//!
//! let settings = SyncSettings::default();
//! let store = SqliteStore::new(turbo_db::Db::open_default()?);
//! store.migrate()?;
//! let catalog = HttpCatalog::new(&settings.catalog);
//!
//! let result = InventorySync::new(&store, &catalog, &SystemClock, &settings, &logger)
//!     .run(&SyncRequest::all())?;
//! println!("{}", result.message());
//! ```

pub mod api;
mod catalog;
mod clock;
mod diff;
mod dispatch;
mod error;
mod orchestrator;
mod result;
mod settings;
mod sqlite;
mod store;
mod subscriptions;

#[cfg(all(test, not(target_arch = "wasm32")))]
mod testing;

pub use catalog::{CatalogError, CatalogSource, HttpCatalog, RemoteProduct, RemoteVariant};
pub use clock::{Clock, SystemClock};
pub use diff::{diff_variants, VariantDiff};
pub use dispatch::{dispatch_restocks, DispatchReport, MailIntent};
pub use error::SyncError;
pub use orchestrator::{InventorySync, SyncRequest, LEASE_NAME};
pub use result::{
    ProductOutcome, RestockEvent, SyncErrorEntry, SyncResponse, SyncResult, SyncStage, SyncSummary,
};
pub use settings::{CatalogSettings, MissingVariantPolicy, SyncSettings};
pub use sqlite::SqliteStore;
pub use store::{LeaseRecord, NotificationStore, ProductStore, SyncLease};
pub use subscriptions::{Subscribed, Subscriptions};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        CatalogSource, Clock, InventorySync, SqliteStore, SyncError, SyncRequest, SyncResult,
        SyncSettings, SystemClock,
    };
}
