//! Schema setup.

use anyhow::Result;

use crate::context::Context;

/// Run the migrate command.
pub fn run(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let tables = store.db().query(
        "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        turbo_db::params![],
    )?;

    if ctx.output.is_json() {
        let names: Vec<String> = tables
            .iter()
            .filter_map(|row| row.text("name").ok())
            .collect();
        ctx.output.json(&serde_json::json!({ "tables": names }));
        return Ok(());
    }

    ctx.output.success(&format!(
        "Schema ready at {}",
        ctx.resolve_path(&ctx.config.database.path).display()
    ));
    for row in tables.iter() {
        if let Ok(name) = row.text("name") {
            ctx.output.list_item(&name);
        }
    }
    Ok(())
}
