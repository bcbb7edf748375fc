//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CliConfig, CATALOG_TOKEN_ENV};
use crate::context::{Context, CONFIG_NAMES};

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force, as_json } => init_config(force, as_json, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let mut redacted = ctx.config.clone();
    if !redacted.sync.catalog.api_token.is_empty() {
        redacted.sync.catalog.api_token = "********".to_string();
    }

    if ctx.output.is_json() {
        ctx.output.json(&redacted);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    ctx.output.info("");
    ctx.output.info("[database]");
    ctx.output.kv("path", &redacted.database.path);

    let sync = &redacted.sync;
    ctx.output.info("");
    ctx.output.info("[sync]");
    ctx.output
        .kv("guard_window_secs", &sync.guard_window_secs.to_string());
    ctx.output.kv("lease_ttl_secs", &sync.lease_ttl_secs.to_string());
    ctx.output.kv(
        "missing_variant_policy",
        sync.missing_variant_policy.as_str(),
    );

    ctx.output.info("");
    ctx.output.info("[sync.catalog]");
    ctx.output.kv("base_url", &sync.catalog.base_url);
    ctx.output.kv(
        "api_token",
        if sync.catalog.api_token.is_empty() {
            "(unset)"
        } else {
            sync.catalog.api_token.as_str()
        },
    );
    if let Some(ref store_id) = sync.catalog.store_id {
        ctx.output.kv("store_id", store_id);
    }

    Ok(())
}

fn init_config(force: bool, as_json: bool, ctx: &Context) -> Result<()> {
    let name = if as_json { CONFIG_NAMES[2] } else { CONFIG_NAMES[0] };
    let config_path = ctx.cwd.join(name);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    if as_json {
        CliConfig::default().save(&config_path.to_string_lossy())?;
    } else {
        fs::write(&config_path, generate_default_config())?;
    }
    ctx.output
        .success(&format!("Created: {}", config_path.display()));
    ctx.output.info(&format!(
        "Export {} before running `restock sync`",
        CATALOG_TOKEN_ENV
    ));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    // Hard errors were already rejected while loading.
    let warnings = config_warnings(&ctx.config);

    if warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }
    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}

/// Settings that load fine but are probably mistakes.
fn config_warnings(config: &CliConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let sync = &config.sync;

    if sync.catalog.api_token.is_empty() {
        warnings.push(format!(
            "sync.catalog.api_token is unset and {} is empty",
            CATALOG_TOKEN_ENV
        ));
    }
    if !sync.catalog.base_url.starts_with("https://") {
        warnings.push(format!(
            "sync.catalog.base_url '{}' is not https",
            sync.catalog.base_url
        ));
    }
    if sync.guard_window_secs == 0 {
        warnings.push("sync.guard_window_secs = 0 disables the recency guard".to_string());
    }
    if sync.lease_ttl_secs < sync.guard_window_secs {
        warnings.push(
            "sync.lease_ttl_secs is shorter than the guard window; a stuck run frees the lease early"
                .to_string(),
        );
    }

    warnings
}
