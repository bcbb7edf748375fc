//! Run one reconciliation pass.

use anyhow::{bail, Result};
use turbo_commerce::ProductId;
use turbo_sync::{HttpCatalog, InventorySync, ProductOutcome, SyncRequest, SystemClock};

use super::SyncArgs;
use crate::config::CATALOG_TOKEN_ENV;
use crate::context::Context;
use crate::output::status_badge;

/// Run the sync command.
pub fn run(args: SyncArgs, ctx: &Context) -> Result<()> {
    let settings = &ctx.config.sync;
    if settings.catalog.api_token.is_empty() {
        ctx.output.warn(&format!(
            "No catalog token configured; set {} or sync.catalog.api_token",
            CATALOG_TOKEN_ENV
        ));
    }

    let store = ctx.open_store()?;
    let catalog = HttpCatalog::new(&settings.catalog);
    let logger = ctx.logger();

    let mut request = SyncRequest::all().forced(args.force);
    if let Some(id) = args.product {
        request.product_id = Some(ProductId::new(id));
    }

    let spinner = ctx.output.spinner("Syncing inventory...");
    let outcome = InventorySync::new(&store, &catalog, &SystemClock, settings, &logger).run(&request);
    spinner.finish_and_clear();

    let result = match outcome {
        Ok(result) => result,
        Err(e) if e.is_conflict() => bail!("Sync skipped: {}", e),
        Err(e) => return Err(e.into()),
    };

    if ctx.output.is_json() {
        ctx.output.json(&result.to_response());
        return Ok(());
    }

    ctx.output.header("Inventory Sync");
    ctx.output
        .kv("products updated", &result.products_updated.to_string());
    ctx.output
        .kv("variants checked", &result.variants_checked.to_string());
    ctx.output.kv("variants added", &result.variants_added.to_string());
    ctx.output
        .kv("variants removed", &result.variants_removed.to_string());
    ctx.output.kv(
        "notifications sent",
        &result.restock_notifications_sent.to_string(),
    );

    if !result.outcomes.is_empty() {
        ctx.output.header("Products");
        for outcome in &result.outcomes {
            let (id, status, detail) = match outcome {
                ProductOutcome::Updated {
                    product_id,
                    restocked,
                } => (
                    product_id.to_string(),
                    "updated",
                    format!("{} restocked", restocked),
                ),
                ProductOutcome::Unchanged { product_id } => {
                    (product_id.to_string(), "unchanged", String::new())
                }
                ProductOutcome::Failed {
                    product_id,
                    stage,
                    message,
                } => (
                    product_id.clone(),
                    "failed",
                    format!("{}: {}", stage.as_str(), message),
                ),
            };
            ctx.output
                .table_row(&[&id, &status_badge(status), &detail], &[28, 10, 0]);
        }
    }

    for event in &result.restock_events {
        ctx.output.info(&format!(
            "Back in stock: {} ({})",
            event.variant_title, event.variant_id
        ));
    }

    if result.errors.is_empty() {
        ctx.output.success(&result.message());
    } else {
        for error in &result.errors {
            ctx.output.warn(&error.to_string());
        }
        ctx.output.warn(&result.message());
    }
    Ok(())
}
