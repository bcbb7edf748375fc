//! Tracked product management.

use anyhow::{bail, Result};
use dialoguer::Confirm;
use turbo_commerce::ProductId;
use turbo_sync::{Clock, ProductStore, SystemClock};

use super::{ProductsArgs, ProductsCommand};
use crate::context::Context;
use crate::output::format_timestamp;

/// Run the products command.
pub fn run(args: ProductsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ProductsCommand::List => list_products(ctx),
        ProductsCommand::Add { external_id, title } => add_product(&external_id, &title, ctx),
        ProductsCommand::Remove { id, yes } => remove_product(&id, yes, ctx),
    }
}

fn list_products(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let products = store.list_products()?;

    if ctx.output.is_json() {
        ctx.output.json(&products);
        return Ok(());
    }

    if products.is_empty() {
        ctx.output.info("No products tracked yet. Add one with `restock products add`.");
        return Ok(());
    }

    ctx.output.header("Tracked Products");
    ctx.output
        .table_row(&["ID", "EXTERNAL", "VARIANTS", "LAST SYNC", "TITLE"], &[28, 10, 8, 23, 0]);
    for product in &products {
        let purchasable = product.purchasable_variants().count();
        ctx.output.table_row(
            &[
                product.id.as_str(),
                &product.external_id,
                &format!("{}/{}", purchasable, product.variants.len()),
                &format_timestamp(product.last_synced_at),
                &product.title,
            ],
            &[28, 10, 8, 23, 0],
        );
    }
    Ok(())
}

fn add_product(external_id: &str, title: &str, ctx: &Context) -> Result<()> {
    if external_id.trim().is_empty() || title.trim().is_empty() {
        bail!("External id and title must not be empty");
    }

    let store = ctx.open_store()?;
    let product = match store.register_product(external_id.trim(), title.trim(), SystemClock.now()) {
        Ok(product) => product,
        Err(e) if e.is_constraint() => bail!("Catalog product {} is already tracked", external_id),
        Err(e) => return Err(e.into()),
    };

    if ctx.output.is_json() {
        ctx.output.json(&product);
    } else {
        ctx.output
            .success(&format!("Tracking {} as {}", product.title, product.id));
        ctx.output
            .info("Variants appear after the next `restock sync`.");
    }
    Ok(())
}

fn remove_product(id: &str, yes: bool, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let id = ProductId::new(id);
    let Some(product) = store.get_product(&id)? else {
        bail!("Product not found: {}", id);
    };

    if !yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt(format!("Stop tracking {} ({})?", product.title, product.id))
            .default(false)
            .interact()?;
        if !confirmed {
            ctx.output.info("Aborted");
            return Ok(());
        }
    }

    let removed = store.remove_product(&id)?;
    if ctx.output.is_json() {
        ctx.output
            .json(&serde_json::json!({ "removed": removed, "id": id }));
    } else if removed {
        ctx.output.success(&format!("Removed {}", id));
    } else {
        ctx.output.warn(&format!("{} was already removed", id));
    }
    Ok(())
}
