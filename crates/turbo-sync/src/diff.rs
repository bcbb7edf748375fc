//! Diff & apply: compare a fetched variant list with the stored snapshot.

use crate::catalog::RemoteVariant;
use crate::settings::MissingVariantPolicy;
use std::collections::{HashMap, HashSet};
use turbo_commerce::{Variant, VariantId};

/// Outcome of comparing one product's variants.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantDiff {
    /// The snapshot to persist.
    pub snapshot: Vec<Variant>,
    /// Variants that became purchasable again.
    pub restocked: Vec<Variant>,
    /// Number of remote variants examined.
    pub checked: usize,
    pub added: usize,
    pub removed: usize,
    /// True if `snapshot` differs from the stored one in any field.
    pub changed: bool,
}

/// Compare `remote` against `stored`.
///
/// A restock is a stored variant that was not purchasable (unavailable,
/// disabled or discontinued) and is purchasable now, the same rule that
/// decides whether it accepts subscriptions. New variants are added
/// without classification, and
/// variants missing remotely are handled per `policy` without ever
/// producing a restock.
pub fn diff_variants(
    stored: &[Variant],
    remote: &[RemoteVariant],
    policy: MissingVariantPolicy,
) -> VariantDiff {
    let by_id: HashMap<&VariantId, &Variant> = stored.iter().map(|v| (&v.id, v)).collect();
    let seen: HashSet<&VariantId> = remote.iter().map(|v| &v.id).collect();

    let mut diff = VariantDiff {
        snapshot: Vec::with_capacity(remote.len()),
        restocked: Vec::new(),
        checked: remote.len(),
        added: 0,
        removed: 0,
        changed: false,
    };

    for fetched in remote {
        let next = Variant {
            id: fetched.id.clone(),
            title: fetched.title.clone(),
            available: fetched.available,
            enabled: fetched.enabled,
            price: fetched
                .price
                .or_else(|| by_id.get(&fetched.id).map(|v| v.price))
                .unwrap_or_default(),
            discontinued: false,
        };

        match by_id.get(&fetched.id) {
            None => {
                diff.added += 1;
                diff.changed = true;
            }
            Some(previous) => {
                if !previous.is_purchasable() && next.is_purchasable() {
                    diff.restocked.push(next.clone());
                }
                if **previous != next {
                    diff.changed = true;
                }
            }
        }
        diff.snapshot.push(next);
    }

    for previous in stored.iter().filter(|v| !seen.contains(&v.id)) {
        match policy {
            MissingVariantPolicy::Drop => {
                diff.removed += 1;
                diff.changed = true;
            }
            MissingVariantPolicy::MarkDiscontinued => {
                let mut kept = previous.clone();
                if !kept.discontinued {
                    kept.discontinue();
                    diff.removed += 1;
                    diff.changed = true;
                }
                diff.snapshot.push(kept);
            }
        }
    }

    diff
}
