//! CLI configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use turbo_sync::SyncSettings;

/// Env var overriding `sync.catalog.api_token`.
pub const CATALOG_TOKEN_ENV: &str = "RESTOCK_CATALOG_TOKEN";
/// Env var overriding `database.path`.
pub const DATABASE_ENV: &str = "RESTOCK_DATABASE";

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Local database.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Sync tunables and catalog access.
    #[serde(default)]
    pub sync: SyncSettings,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            let config: CliConfig = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))?;
            config.sync.validate()?;
            Ok(config)
        } else {
            Self::parse(&content).with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Parse TOML and validate the sync section.
    pub fn parse(content: &str) -> Result<Self> {
        let config: CliConfig = toml::from_str(content)?;
        config.sync.validate()?;
        Ok(config)
    }

    /// Save config to a file.
    pub fn save(&self, path: &str) -> Result<()> {
        let content = if path.ends_with(".json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path))
    }

    /// Apply environment overrides. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        if let Some(token) = get(CATALOG_TOKEN_ENV) {
            self.sync.catalog.api_token = token;
        }
        if let Some(path) = get(DATABASE_ENV) {
            self.database.path = path;
        }
    }
}

/// Database location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file, relative to the working directory.
    #[serde(default = "default_database_path")]
    pub path: String,
}

fn default_database_path() -> String {
    "restock.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// Generate a default restock.toml config file.
pub fn generate_default_config() -> String {
    r#"# Restock CLI configuration

[database]
path = "restock.db"

[sync]
# Reject a run if any product synced within this many seconds (0 disables)
guard_window_secs = 60
# Lifetime of the exclusive sync lease
lease_ttl_secs = 300
# What to do with variants the catalog stops returning: "drop" or "mark_discontinued"
missing_variant_policy = "drop"

[sync.catalog]
base_url = "https://api.printful.com"
# api_token is read from RESTOCK_CATALOG_TOKEN when unset here
# store_id = "123456"
"#
    .to_string()
}
