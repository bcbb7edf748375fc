//! Notification dispatcher: hands restocked variants to waiting subscribers.

use crate::result::{RestockEvent, SyncErrorEntry, SyncStage};
use crate::store::NotificationStore;
use edge_observability::StructuredLogger;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use turbo_commerce::{NotificationId, ProductId, RestockNotification, VariantId};

/// A queued "back in stock" email, picked up by the external mailer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailIntent {
    pub id: String,
    pub notification_id: NotificationId,
    pub email: String,
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub variant_title: String,
    pub product_title: String,
    pub created_at: i64,
}

impl MailIntent {
    pub fn for_notification(
        notification: &RestockNotification,
        product_title: &str,
        created_at: i64,
    ) -> Self {
        Self {
            id: format!("mail_{}", notification.id),
            notification_id: notification.id.clone(),
            email: notification.email.clone(),
            product_id: notification.product_id.clone(),
            variant_id: notification.variant_id.clone(),
            variant_title: notification.variant_title.clone(),
            product_title: product_title.to_string(),
            created_at,
        }
    }
}

/// What the dispatcher did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Intents enqueued.
    pub sent: usize,
    /// Records another run had already claimed.
    pub already_notified: usize,
    pub failures: Vec<SyncErrorEntry>,
}

/// Notify every pending subscriber of each restocked variant.
///
/// Each record is claimed with a conditional update, and an intent is
/// enqueued only when the claim succeeded. Failures are logged and skipped.
pub fn dispatch_restocks<S>(
    store: &S,
    events: &[RestockEvent],
    product_titles: &HashMap<ProductId, String>,
    now: i64,
    logger: &StructuredLogger,
) -> DispatchReport
where
    S: NotificationStore + ?Sized,
{
    let mut report = DispatchReport::default();

    for event in events {
        let pending = match store.pending_for_variant(&event.product_id, &event.variant_id) {
            Ok(pending) => pending,
            Err(e) => {
                logger
                    .error_builder("failed to load pending restock notifications")
                    .field("product_id", event.product_id.as_str())
                    .field("variant_id", event.variant_id.as_str())
                    .field("error", e.to_string())
                    .emit();
                report.failures.push(SyncErrorEntry {
                    product_id: event.product_id.to_string(),
                    stage: SyncStage::Dispatch,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let product_title = product_titles
            .get(&event.product_id)
            .map(String::as_str)
            .unwrap_or(event.product_id.as_str());

        for notification in &pending {
            let intent = MailIntent::for_notification(notification, product_title, now);
            match store.notify_once(&notification.id, now, &intent) {
                Ok(true) => report.sent += 1,
                Ok(false) => report.already_notified += 1,
                Err(e) => {
                    logger
                        .error_builder("failed to notify subscriber")
                        .field("notification_id", notification.id.as_str())
                        .field("error", e.to_string())
                        .emit();
                    report.failures.push(SyncErrorEntry {
                        product_id: event.product_id.to_string(),
                        stage: SyncStage::Dispatch,
                        message: format!("notification {}: {}", notification.id, e),
                    });
                }
            }
        }

        logger
            .info_builder("restock dispatched")
            .field("product_id", event.product_id.as_str())
            .field("variant_id", event.variant_id.as_str())
            .field_i64("subscribers", pending.len() as i64)
            .emit();
    }

    report
}
