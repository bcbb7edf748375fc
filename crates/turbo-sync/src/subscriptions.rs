//! "Notify me when back in stock" subscriptions.

use crate::clock::Clock;
use crate::store::{NotificationStore, ProductStore};
use crate::SyncError;
use turbo_commerce::{normalize_email, CommerceError, ProductId, RestockNotification, VariantId};

/// Result of a subscribe call.
#[derive(Debug, Clone, PartialEq)]
pub enum Subscribed {
    Created(RestockNotification),
    /// An active record already existed and is returned unchanged.
    Existing(RestockNotification),
}

impl Subscribed {
    pub fn notification(&self) -> &RestockNotification {
        match self {
            Subscribed::Created(n) | Subscribed::Existing(n) => n,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Subscribed::Created(_))
    }
}

/// Subscription operations over a store.
pub struct Subscriptions<'a, S: ?Sized, K: ?Sized> {
    store: &'a S,
    clock: &'a K,
}

impl<'a, S, K> Subscriptions<'a, S, K>
where
    S: ProductStore + NotificationStore + ?Sized,
    K: Clock + ?Sized,
{
    pub fn new(store: &'a S, clock: &'a K) -> Self {
        Self { store, clock }
    }

    /// Subscribe `email` to a currently unavailable variant. Idempotent.
    pub fn subscribe(
        &self,
        email: &str,
        product_id: &ProductId,
        variant_id: &VariantId,
    ) -> Result<Subscribed, SyncError> {
        let email = normalize_email(email)?;
        let product = self
            .store
            .get_product(product_id)?
            .ok_or_else(|| CommerceError::ProductNotFound(product_id.to_string()))?;
        let variant = product.require_variant(variant_id)?;

        if variant.is_purchasable() {
            return Err(CommerceError::VariantAvailable {
                product_id: product_id.to_string(),
                variant_id: variant_id.to_string(),
            }
            .into());
        }

        if let Some(existing) = self.store.find_active(&email, product_id, variant_id)? {
            return Ok(Subscribed::Existing(existing));
        }

        let notification = RestockNotification::new(
            email.as_str(),
            product_id.clone(),
            variant_id.clone(),
            variant.title.as_str(),
            self.clock.now(),
        );
        match self.store.insert_notification(&notification) {
            Ok(()) => Ok(Subscribed::Created(notification)),
            // A concurrent subscribe won the unique index.
            Err(e) if e.is_constraint() => self
                .store
                .find_active(&email, product_id, variant_id)?
                .map(Subscribed::Existing)
                .ok_or_else(|| e.into()),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the active subscription. Returns whether one existed.
    pub fn unsubscribe(
        &self,
        email: &str,
        product_id: &ProductId,
        variant_id: &VariantId,
    ) -> Result<bool, SyncError> {
        let email = normalize_email(email)?;
        Ok(self.store.delete_active(&email, product_id, variant_id)?)
    }

    /// Active subscriptions for a product.
    pub fn pending_for_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<RestockNotification>, SyncError> {
        Ok(self.store.pending_for_product(product_id)?)
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::testing::{seeded_store, FixedClock};

    #[test]
    fn test_subscribe_creates_then_returns_existing() {
        let (store, tee) = seeded_store();
        let clock = FixedClock::new(1_000);
        let subs = Subscriptions::new(&store, &clock);

        let first = subs
            .subscribe(" Ada@Example.com ", &tee.id, &VariantId::new("v1"))
            .unwrap();
        assert!(first.is_created());
        assert_eq!(first.notification().email, "ada@example.com");
        assert_eq!(first.notification().variant_title, "Castle Tee / S");
        assert_eq!(first.notification().created_at, 1_000);

        let again = subs
            .subscribe("ada@example.com", &tee.id, &VariantId::new("v1"))
            .unwrap();
        assert_eq!(again, Subscribed::Existing(first.notification().clone()));
        assert_eq!(subs.pending_for_product(&tee.id).unwrap().len(), 1);
    }

    #[test]
    fn test_subscribe_rejects_in_stock_variant() {
        let (store, tee) = seeded_store();
        let clock = FixedClock::new(0);
        let subs = Subscriptions::new(&store, &clock);
        let err = subs
            .subscribe("ada@example.com", &tee.id, &VariantId::new("v2"))
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_subscribe_validates_input() {
        let (store, tee) = seeded_store();
        let clock = FixedClock::new(0);
        let subs = Subscriptions::new(&store, &clock);

        let bad_email = subs.subscribe("nope", &tee.id, &VariantId::new("v1")).unwrap_err();
        assert!(bad_email.is_client_error());

        let unknown_product = subs
            .subscribe("ada@example.com", &ProductId::new("prod_x"), &VariantId::new("v1"))
            .unwrap_err();
        assert!(matches!(
            unknown_product,
            SyncError::Commerce(CommerceError::ProductNotFound(_))
        ));

        let unknown_variant = subs
            .subscribe("ada@example.com", &tee.id, &VariantId::new("v9"))
            .unwrap_err();
        assert!(matches!(
            unknown_variant,
            SyncError::Commerce(CommerceError::VariantNotFound { .. })
        ));
    }

    #[test]
    fn test_unsubscribe() {
        let (store, tee) = seeded_store();
        let clock = FixedClock::new(0);
        let subs = Subscriptions::new(&store, &clock);
        subs.subscribe("ada@example.com", &tee.id, &VariantId::new("v1")).unwrap();

        assert!(subs.unsubscribe("ADA@example.com", &tee.id, &VariantId::new("v1")).unwrap());
        assert!(!subs.unsubscribe("ada@example.com", &tee.id, &VariantId::new("v1")).unwrap());
        assert!(subs.pending_for_product(&tee.id).unwrap().is_empty());
    }
}
