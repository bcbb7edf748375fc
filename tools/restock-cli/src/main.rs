//! Restock CLI - operate the inventory sync against a local database.
//!
//! Commands:
//! - `restock migrate` - Create or upgrade the schema
//! - `restock sync` - Run one reconciliation pass
//! - `restock products` - Register, remove and list tracked products
//! - `restock subscribe` / `unsubscribe` - Manage back-in-stock requests
//! - `restock pending` - List waiting subscribers for a product
//! - `restock outbox` - Show queued restock emails
//! - `restock config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConfigArgs, OutboxArgs, PendingArgs, ProductsArgs, SubscriptionArgs, SyncArgs};

/// Restock CLI - reconcile catalog inventory and notify subscribers
#[derive(Parser)]
#[command(name = "restock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    Migrate,

    /// Run one inventory sync pass
    Sync(SyncArgs),

    /// Manage tracked products
    Products(ProductsArgs),

    /// Subscribe an email to a sold-out variant
    Subscribe(SubscriptionArgs),

    /// Remove a pending subscription
    Unsubscribe(SubscriptionArgs),

    /// List pending subscriptions for a product
    Pending(PendingArgs),

    /// Show queued restock emails
    Outbox(OutboxArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let output = output::Output::new(cli.verbose, cli.json);
    let ctx = context::Context::load(cli.config.as_deref(), output)?;

    let result = match cli.command {
        Commands::Migrate => commands::migrate::run(&ctx),
        Commands::Sync(args) => commands::sync::run(args, &ctx),
        Commands::Products(args) => commands::products::run(args, &ctx),
        Commands::Subscribe(args) => commands::subscriptions::subscribe(args, &ctx),
        Commands::Unsubscribe(args) => commands::subscriptions::unsubscribe(args, &ctx),
        Commands::Pending(args) => commands::subscriptions::pending(args, &ctx),
        Commands::Outbox(args) => commands::outbox::run(args, &ctx),
        Commands::Config(args) => commands::config::run(args, &ctx),
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

/// Route structured logs through `tracing`; `RUST_LOG` wins when set.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
