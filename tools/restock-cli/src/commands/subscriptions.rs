//! Back-in-stock subscription commands.

use anyhow::{bail, Result};
use turbo_commerce::{ProductId, VariantId};
use turbo_sync::{ProductStore, Subscriptions, SystemClock};

use super::{PendingArgs, SubscriptionArgs};
use crate::context::Context;
use crate::output::{format_timestamp, status_badge};

/// Run the subscribe command.
pub fn subscribe(args: SubscriptionArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let subs = Subscriptions::new(&store, &SystemClock);

    let subscribed = match subs.subscribe(
        &args.email,
        &ProductId::new(args.product),
        &VariantId::new(args.variant),
    ) {
        Ok(subscribed) => subscribed,
        Err(e) if e.is_conflict() || e.is_client_error() => bail!("{}", e),
        Err(e) => return Err(e.into()),
    };

    let notification = subscribed.notification();
    if ctx.output.is_json() {
        ctx.output.json(notification);
    } else if subscribed.is_created() {
        ctx.output.success(&format!(
            "{} will be notified when {} is back",
            notification.email, notification.variant_title
        ));
    } else {
        ctx.output.info(&format!(
            "{} is already waiting for {}",
            notification.email, notification.variant_title
        ));
    }
    Ok(())
}

/// Run the unsubscribe command.
pub fn unsubscribe(args: SubscriptionArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let subs = Subscriptions::new(&store, &SystemClock);

    let removed = match subs.unsubscribe(
        &args.email,
        &ProductId::new(args.product),
        &VariantId::new(args.variant),
    ) {
        Ok(removed) => removed,
        Err(e) if e.is_client_error() => bail!("{}", e),
        Err(e) => return Err(e.into()),
    };

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "removed": removed }));
    } else if removed {
        ctx.output.success("Subscription removed");
    } else {
        ctx.output.info("No pending subscription found");
    }
    Ok(())
}

/// Run the pending command.
pub fn pending(args: PendingArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let product_id = ProductId::new(args.product);
    let Some(product) = store.get_product(&product_id)? else {
        bail!("Product not found: {}", product_id);
    };

    let pending = Subscriptions::new(&store, &SystemClock).pending_for_product(&product_id)?;

    if ctx.output.is_json() {
        ctx.output.json(&pending);
        return Ok(());
    }

    ctx.output
        .header(&format!("Waiting for {} ({})", product.title, product.id));
    if pending.is_empty() {
        ctx.output.info("No pending subscriptions");
        return Ok(());
    }
    for notification in &pending {
        ctx.output.table_row(
            &[
                &notification.email,
                &notification.variant_title,
                &status_badge("pending"),
                &format_timestamp(Some(notification.created_at)),
            ],
            &[32, 24, 8, 0],
        );
    }
    Ok(())
}
