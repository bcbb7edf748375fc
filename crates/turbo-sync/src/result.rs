//! Sync run outcome and its JSON summary.

use serde::{Deserialize, Serialize};
use turbo_commerce::{ProductId, VariantId};

/// Where a per-product failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStage {
    /// The product id did not resolve locally.
    Lookup,
    /// The catalog request failed.
    Fetch,
    /// Writing the snapshot failed.
    Persist,
    /// Notifying subscribers failed.
    Dispatch,
}

impl SyncStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStage::Lookup => "lookup",
            SyncStage::Fetch => "fetch",
            SyncStage::Persist => "persist",
            SyncStage::Dispatch => "dispatch",
        }
    }
}

/// A recorded, non-fatal failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncErrorEntry {
    pub product_id: String,
    pub stage: SyncStage,
    pub message: String,
}

impl std::fmt::Display for SyncErrorEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} failed: {}",
            self.product_id,
            self.stage.as_str(),
            self.message
        )
    }
}

/// A variant that went from unavailable to available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockEvent {
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub variant_title: String,
}

/// What happened to one product during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProductOutcome {
    /// Snapshot changed and was saved.
    Updated {
        product_id: ProductId,
        restocked: usize,
    },
    /// Snapshot identical; timestamp advanced.
    Unchanged { product_id: ProductId },
    /// The product was skipped.
    Failed {
        product_id: String,
        stage: SyncStage,
        message: String,
    },
}

/// Aggregate result of one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub products_updated: usize,
    pub variants_checked: usize,
    pub variants_added: usize,
    pub variants_removed: usize,
    pub restock_events: Vec<RestockEvent>,
    pub restock_notifications_sent: usize,
    pub errors: Vec<SyncErrorEntry>,
    pub outcomes: Vec<ProductOutcome>,
    pub started_at: i64,
    pub finished_at: i64,
}

impl SyncResult {
    pub(crate) fn new(started_at: i64) -> Self {
        Self {
            started_at,
            finished_at: started_at,
            ..Self::default()
        }
    }

    /// Record a per-product failure and its outcome.
    pub(crate) fn fail(&mut self, product_id: impl Into<String>, stage: SyncStage, message: String) {
        let product_id = product_id.into();
        self.outcomes.push(ProductOutcome::Failed {
            product_id: product_id.clone(),
            stage,
            message: message.clone(),
        });
        self.errors.push(SyncErrorEntry {
            product_id,
            stage,
            message,
        });
    }

    /// Record a failure that is not tied to one product's outcome.
    pub(crate) fn note_error(&mut self, product_id: impl Into<String>, stage: SyncStage, message: String) {
        self.errors.push(SyncErrorEntry {
            product_id: product_id.into(),
            stage,
            message,
        });
    }

    /// Human-readable one-liner.
    pub fn message(&self) -> String {
        let mut message = format!(
            "Inventory sync completed: {} products updated, {} variants checked, {} restock notifications sent",
            self.products_updated, self.variants_checked, self.restock_notifications_sent
        );
        if !self.errors.is_empty() {
            message.push_str(&format!(" ({} errors)", self.errors.len()));
        }
        message
    }

    pub fn summary(&self) -> SyncSummary {
        SyncSummary {
            products_updated: self.products_updated,
            variants_checked: self.variants_checked,
            restock_notifications_sent: self.restock_notifications_sent,
            errors: self.errors.iter().map(ToString::to_string).collect(),
        }
    }

    /// The HTTP response body for a completed run.
    pub fn to_response(&self) -> SyncResponse {
        SyncResponse {
            success: true,
            message: self.message(),
            results: Some(self.summary()),
        }
    }
}

/// Counters reported to HTTP callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub products_updated: usize,
    pub variants_checked: usize,
    pub restock_notifications_sent: usize,
    pub errors: Vec<String>,
}

/// Body returned by both sync triggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<SyncSummary>,
}

impl SyncResponse {
    /// A rejected run.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            results: None,
        }
    }
}
