//! CLI command implementations.

pub mod config;
pub mod migrate;
pub mod outbox;
pub mod products;
pub mod subscriptions;
pub mod sync;

use clap::{Args, Subcommand};

/// Arguments for the sync command.
#[derive(Args)]
pub struct SyncArgs {
    /// Only sync this product (local id).
    #[arg(short, long)]
    pub product: Option<String>,

    /// Skip the recency guard. The lease still applies.
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the products command.
#[derive(Args)]
pub struct ProductsArgs {
    #[command(subcommand)]
    pub command: ProductsCommand,
}

#[derive(Subcommand)]
pub enum ProductsCommand {
    /// List tracked products.
    List,
    /// Start tracking a catalog product.
    Add {
        /// Product id in the fulfillment provider's catalog.
        external_id: String,
        /// Display title.
        #[arg(short, long)]
        title: String,
    },
    /// Stop tracking a product.
    Remove {
        /// Local product id.
        id: String,
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for subscribe and unsubscribe.
#[derive(Args)]
pub struct SubscriptionArgs {
    /// Subscriber email.
    pub email: String,

    /// Local product id.
    #[arg(short, long)]
    pub product: String,

    /// Variant id.
    #[arg(short = 'V', long)]
    pub variant: String,
}

/// Arguments for the pending command.
#[derive(Args)]
pub struct PendingArgs {
    /// Local product id.
    pub product: String,
}

/// Arguments for the outbox command.
#[derive(Args)]
pub struct OutboxArgs {
    /// Show only the last N entries.
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
        /// Write restock.json instead of the commented TOML template.
        #[arg(long = "as-json")]
        as_json: bool,
    },
    /// Validate the config file.
    Validate,
}
