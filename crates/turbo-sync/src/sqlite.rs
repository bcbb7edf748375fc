//! SQLite-backed stores.

use crate::dispatch::MailIntent;
use crate::store::{LeaseRecord, NotificationStore, ProductStore, SyncLease};
use turbo_commerce::{NotificationId, Product, ProductId, RestockNotification, Variant, VariantId};
use turbo_db::{params, Db, DbError, Row};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS products (
    id TEXT PRIMARY KEY,
    external_id TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    variants TEXT NOT NULL DEFAULT '[]',
    last_synced_at INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS restock_notifications (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL,
    product_id TEXT NOT NULL,
    variant_id TEXT NOT NULL,
    variant_title TEXT NOT NULL,
    notified INTEGER NOT NULL DEFAULT 0,
    notified_at INTEGER,
    created_at INTEGER NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS restock_notifications_one_active
    ON restock_notifications (email, product_id, variant_id) WHERE notified = 0;
CREATE INDEX IF NOT EXISTS restock_notifications_by_variant
    ON restock_notifications (product_id, variant_id, notified);
CREATE TABLE IF NOT EXISTS mail_outbox (
    id TEXT PRIMARY KEY,
    notification_id TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL,
    product_id TEXT NOT NULL,
    variant_id TEXT NOT NULL,
    variant_title TEXT NOT NULL,
    product_title TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS sync_leases (
    name TEXT PRIMARY KEY,
    holder TEXT,
    acquired_at INTEGER,
    expires_at INTEGER NOT NULL DEFAULT 0
)
";

const PRODUCT_COLUMNS: &str =
    "id, external_id, title, variants, last_synced_at, created_at, updated_at";
const NOTIFICATION_COLUMNS: &str =
    "id, email, product_id, variant_id, variant_title, notified, notified_at, created_at";

/// All sync state in one SQLite database.
pub struct SqliteStore {
    db: Db,
}

impl SqliteStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Create tables and indexes if they do not exist yet.
    pub fn migrate(&self) -> Result<(), DbError> {
        self.db.execute_batch(SCHEMA)
    }

    /// Underlying connection.
    pub fn db(&self) -> &Db {
        &self.db
    }

    /// Queued mail intents, oldest first.
    pub fn mail_outbox(&self) -> Result<Vec<MailIntent>, DbError> {
        self.db.query_as(
            "SELECT id, notification_id, email, product_id, variant_id, variant_title,
                    product_title, created_at
             FROM mail_outbox ORDER BY created_at, id",
            params![],
        )
    }

    fn notifications_where(
        &self,
        condition: &str,
        params: &[turbo_db::Value],
    ) -> Result<Vec<RestockNotification>, DbError> {
        let sql = format!(
            "SELECT {} FROM restock_notifications WHERE {} ORDER BY created_at, id",
            NOTIFICATION_COLUMNS, condition
        );
        self.db
            .query(&sql, params)?
            .iter()
            .map(notification_from_row)
            .collect()
    }
}

fn product_from_row(row: &Row) -> Result<Product, DbError> {
    Ok(Product {
        id: ProductId::new(row.text("id")?),
        external_id: row.text("external_id")?,
        title: row.text("title")?,
        variants: row.json("variants")?,
        last_synced_at: row.optional_integer("last_synced_at")?,
        created_at: row.integer("created_at")?,
        updated_at: row.integer("updated_at")?,
    })
}

fn notification_from_row(row: &Row) -> Result<RestockNotification, DbError> {
    Ok(RestockNotification {
        id: NotificationId::new(row.text("id")?),
        email: row.text("email")?,
        product_id: ProductId::new(row.text("product_id")?),
        variant_id: VariantId::new(row.text("variant_id")?),
        variant_title: row.text("variant_title")?,
        notified: row.boolean("notified")?,
        notified_at: row.optional_integer("notified_at")?,
        created_at: row.integer("created_at")?,
    })
}

impl ProductStore for SqliteStore {
    fn list_products(&self) -> Result<Vec<Product>, DbError> {
        let sql = format!("SELECT {} FROM products ORDER BY id", PRODUCT_COLUMNS);
        self.db
            .query(&sql, params![])?
            .iter()
            .map(product_from_row)
            .collect()
    }

    fn get_product(&self, id: &ProductId) -> Result<Option<Product>, DbError> {
        let sql = format!("SELECT {} FROM products WHERE id = ?", PRODUCT_COLUMNS);
        self.db
            .query(&sql, params![id.as_str()])?
            .first()
            .map(product_from_row)
            .transpose()
    }

    fn save_snapshot(
        &self,
        id: &ProductId,
        variants: &[Variant],
        synced_at: i64,
    ) -> Result<(), DbError> {
        let snapshot = serde_json::to_string(variants)?;
        let changed = self.db.execute(
            "UPDATE products SET variants = ?, last_synced_at = ?, updated_at = ? WHERE id = ?",
            params![snapshot, synced_at, synced_at, id.as_str()],
        )?;
        if changed == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    fn most_recent_sync(&self) -> Result<Option<i64>, DbError> {
        let result = self
            .db
            .query("SELECT MAX(last_synced_at) AS latest FROM products", params![])?;
        match result.first() {
            Some(row) => row.optional_integer("latest"),
            None => Ok(None),
        }
    }

    fn register_product(
        &self,
        external_id: &str,
        title: &str,
        now: i64,
    ) -> Result<Product, DbError> {
        let mut product = Product::new(ProductId::generate(), external_id, title);
        product.created_at = now;
        product.updated_at = now;
        self.db.execute(
            "INSERT INTO products (id, external_id, title, variants, last_synced_at, created_at, updated_at)
             VALUES (?, ?, ?, '[]', NULL, ?, ?)",
            params![product.id.as_str(), external_id, title, now, now],
        )?;
        Ok(product)
    }

    fn remove_product(&self, id: &ProductId) -> Result<bool, DbError> {
        let removed = self
            .db
            .execute("DELETE FROM products WHERE id = ?", params![id.as_str()])?;
        Ok(removed > 0)
    }
}

impl NotificationStore for SqliteStore {
    fn pending_for_variant(
        &self,
        product_id: &ProductId,
        variant_id: &VariantId,
    ) -> Result<Vec<RestockNotification>, DbError> {
        self.notifications_where(
            "product_id = ? AND variant_id = ? AND notified = 0",
            params![product_id.as_str(), variant_id.as_str()],
        )
    }

    fn pending_for_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<RestockNotification>, DbError> {
        self.notifications_where(
            "product_id = ? AND notified = 0",
            params![product_id.as_str()],
        )
    }

    fn find_active(
        &self,
        email: &str,
        product_id: &ProductId,
        variant_id: &VariantId,
    ) -> Result<Option<RestockNotification>, DbError> {
        Ok(self
            .notifications_where(
                "email = ? AND product_id = ? AND variant_id = ? AND notified = 0",
                params![email, product_id.as_str(), variant_id.as_str()],
            )?
            .into_iter()
            .next())
    }

    fn insert_notification(&self, n: &RestockNotification) -> Result<(), DbError> {
        self.db.execute(
            "INSERT INTO restock_notifications
                (id, email, product_id, variant_id, variant_title, notified, notified_at, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                n.id.as_str(),
                n.email.as_str(),
                n.product_id.as_str(),
                n.variant_id.as_str(),
                n.variant_title.as_str(),
                n.notified,
                n.notified_at,
                n.created_at
            ],
        )?;
        Ok(())
    }

    fn delete_active(
        &self,
        email: &str,
        product_id: &ProductId,
        variant_id: &VariantId,
    ) -> Result<bool, DbError> {
        let removed = self.db.execute(
            "DELETE FROM restock_notifications
             WHERE email = ? AND product_id = ? AND variant_id = ? AND notified = 0",
            params![email, product_id.as_str(), variant_id.as_str()],
        )?;
        Ok(removed > 0)
    }

    fn notify_once(
        &self,
        id: &NotificationId,
        notified_at: i64,
        intent: &MailIntent,
    ) -> Result<bool, DbError> {
        self.db.transaction(|db| {
            let claimed = db.execute(
                "UPDATE restock_notifications SET notified = 1, notified_at = ?
                 WHERE id = ? AND notified = 0",
                params![notified_at, id.as_str()],
            )?;
            if claimed == 0 {
                return Ok(false);
            }
            db.execute(
                "INSERT INTO mail_outbox
                    (id, notification_id, email, product_id, variant_id, variant_title,
                     product_title, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    intent.id.as_str(),
                    intent.notification_id.as_str(),
                    intent.email.as_str(),
                    intent.product_id.as_str(),
                    intent.variant_id.as_str(),
                    intent.variant_title.as_str(),
                    intent.product_title.as_str(),
                    intent.created_at
                ],
            )?;
            Ok(true)
        })
    }
}

impl SyncLease for SqliteStore {
    fn try_acquire(
        &self,
        name: &str,
        holder: &str,
        now: i64,
        ttl_secs: i64,
    ) -> Result<bool, DbError> {
        self.db.execute(
            "INSERT OR IGNORE INTO sync_leases (name, holder, acquired_at, expires_at)
             VALUES (?, NULL, NULL, 0)",
            params![name],
        )?;
        let claimed = self.db.execute(
            "UPDATE sync_leases SET holder = ?, acquired_at = ?, expires_at = ?
             WHERE name = ? AND (holder IS NULL OR expires_at <= ?)",
            params![holder, now, now + ttl_secs, name, now],
        )?;
        Ok(claimed == 1)
    }

    fn release(&self, name: &str, holder: &str) -> Result<bool, DbError> {
        let released = self.db.execute(
            "UPDATE sync_leases SET holder = NULL, acquired_at = NULL, expires_at = 0
             WHERE name = ? AND holder = ?",
            params![name, holder],
        )?;
        Ok(released == 1)
    }

    fn current_lease(&self, name: &str) -> Result<Option<LeaseRecord>, DbError> {
        let result = self.db.query(
            "SELECT name, holder, acquired_at, expires_at FROM sync_leases
             WHERE name = ? AND holder IS NOT NULL",
            params![name],
        )?;
        match result.first() {
            Some(row) => Ok(Some(LeaseRecord {
                name: row.text("name")?,
                holder: row.text("holder")?,
                acquired_at: row.optional_integer("acquired_at")?.unwrap_or(0),
                expires_at: row.integer("expires_at")?,
            })),
            None => Ok(None),
        }
    }
}
