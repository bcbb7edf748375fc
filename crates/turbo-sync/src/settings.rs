//! Sync configuration.

use crate::SyncError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default trailing guard window.
pub const DEFAULT_GUARD_WINDOW_SECS: i64 = 60;
/// Default lease lifetime.
pub const DEFAULT_LEASE_TTL_SECS: i64 = 300;
/// Default catalog API root.
pub const DEFAULT_CATALOG_BASE_URL: &str = "https://api.printful.com";

/// What to do with a stored variant the catalog no longer returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingVariantPolicy {
    /// Remove it from the snapshot.
    #[default]
    Drop,
    /// Keep it, unavailable and disabled, flagged as discontinued.
    MarkDiscontinued,
}

impl MissingVariantPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingVariantPolicy::Drop => "drop",
            MissingVariantPolicy::MarkDiscontinued => "mark_discontinued",
        }
    }
}

impl FromStr for MissingVariantPolicy {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "drop" => Ok(MissingVariantPolicy::Drop),
            "mark_discontinued" => Ok(MissingVariantPolicy::MarkDiscontinued),
            other => Err(SyncError::Config(format!(
                "unknown missing_variant_policy `{}` (expected drop or mark_discontinued)",
                other
            ))),
        }
    }
}

/// Connection details for the fulfillment provider's catalog API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// API root, e.g. `https://api.printful.com`.
    pub base_url: String,
    /// Bearer token for the store.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_token: String,
    /// Optional store id sent as `X-PF-Store-Id`.
    pub store_id: Option<String>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_BASE_URL.to_string(),
            api_token: String::new(),
            store_id: None,
        }
    }
}

/// Tunables for a sync run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// A run is rejected if any product synced within this many seconds.
    pub guard_window_secs: i64,
    /// Lifetime of the exclusive lease.
    pub lease_ttl_secs: i64,
    /// Handling of variants the catalog stopped returning.
    pub missing_variant_policy: MissingVariantPolicy,
    /// Catalog API access.
    pub catalog: CatalogSettings,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            guard_window_secs: DEFAULT_GUARD_WINDOW_SECS,
            lease_ttl_secs: DEFAULT_LEASE_TTL_SECS,
            missing_variant_policy: MissingVariantPolicy::Drop,
            catalog: CatalogSettings::default(),
        }
    }
}

impl SyncSettings {
    /// Build settings from named variables, keeping defaults for unset ones.
    ///
    /// Names match the component's variables: `guard_window_secs`,
    /// `lease_ttl_secs`, `missing_variant_policy`, `catalog_base_url`,
    /// `catalog_api_token`, `catalog_store_id`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut settings = SyncSettings::default();

        if let Some(raw) = get("guard_window_secs") {
            settings.guard_window_secs = parse_secs("guard_window_secs", &raw)?;
        }
        if let Some(raw) = get("lease_ttl_secs") {
            settings.lease_ttl_secs = parse_secs("lease_ttl_secs", &raw)?;
        }
        if let Some(raw) = get("missing_variant_policy") {
            settings.missing_variant_policy = raw.parse()?;
        }
        if let Some(url) = get("catalog_base_url") {
            settings.catalog.base_url = url;
        }
        if let Some(token) = get("catalog_api_token") {
            settings.catalog.api_token = token;
        }
        settings.catalog.store_id = get("catalog_store_id");

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would disable the concurrency guards.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.guard_window_secs < 0 {
            return Err(SyncError::Config(
                "guard_window_secs must not be negative".to_string(),
            ));
        }
        if self.lease_ttl_secs <= 0 {
            return Err(SyncError::Config(
                "lease_ttl_secs must be positive".to_string(),
            ));
        }
        if self.catalog.base_url.trim().is_empty() {
            return Err(SyncError::Config("catalog base_url is empty".to_string()));
        }
        Ok(())
    }
}

fn parse_secs(name: &str, raw: &str) -> Result<i64, SyncError> {
    raw.trim()
        .parse()
        .map_err(|_| SyncError::Config(format!("{} must be an integer, got `{}`", name, raw)))
}
