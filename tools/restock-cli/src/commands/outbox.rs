//! Queued restock emails.

use anyhow::Result;

use super::OutboxArgs;
use crate::context::Context;
use crate::output::format_timestamp;

/// Run the outbox command.
pub fn run(args: OutboxArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let mut intents = store.mail_outbox()?;
    if let Some(limit) = args.limit {
        let skip = intents.len().saturating_sub(limit);
        intents.drain(..skip);
    }

    if ctx.output.is_json() {
        ctx.output.json(&intents);
        return Ok(());
    }

    if intents.is_empty() {
        ctx.output.info("Outbox is empty");
        return Ok(());
    }

    ctx.output.header("Mail Outbox");
    for intent in &intents {
        ctx.output.table_row(
            &[
                &format_timestamp(Some(intent.created_at)),
                &intent.email,
                &format!("{} / {}", intent.product_title, intent.variant_title),
            ],
            &[23, 32, 0],
        );
    }
    ctx.output.debug(&format!("{} queued", intents.len()));
    Ok(())
}
