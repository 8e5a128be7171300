//! Larder CLI - migrations, template imports, and deployment tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! larder migrate
//!
//! # Register a store and seed its stock
//! larder store add -n "Oak Street"
//! larder seed inventory -s <STORE_ID> -f stock.json
//!
//! # Import recipe templates from exported rows
//! larder import -f recipes.json
//!
//! # Deploy a template to stores
//! larder deploy -t <TEMPLATE_ID> -s <STORE_ID> -s <STORE_ID>
//!
//! # Report availability for a store
//! larder status -s <STORE_ID>
//!
//! # Record a sale against a catalog entry
//! larder sell -e <ENTRY_ID> -q 2 -x pos-txn-1234
//!
//! # Scan for depleted stock
//! larder reorder -s <STORE_ID>
//! ```
//!
//! All commands read `LARDER_DATABASE_URL` from the environment (or `.env`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use uuid::Uuid;

mod commands;

#[derive(Parser)]
#[command(name = "larder")]
#[command(author, version, about = "Larder recipe and inventory tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage stores
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
    /// Seed data for development and onboarding
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Import recipe templates from a JSON row export
    Import {
        /// Path to a JSON array of template rows
        #[arg(short, long)]
        file: String,
    },
    /// Deploy a template to one or more stores
    Deploy {
        /// Template id
        #[arg(short, long)]
        template: Uuid,

        /// Target store id (repeatable)
        #[arg(short, long, required = true)]
        store: Vec<Uuid>,
    },
    /// Report catalog availability for a store
    Status {
        /// Store id
        #[arg(short, long)]
        store: Uuid,
    },
    /// Scan a store for depleted stock and file a reorder request
    Reorder {
        /// Store id
        #[arg(short, long)]
        store: Uuid,
    },
    /// Record a completed sale and deduct stock
    Sell {
        /// Catalog entry id
        #[arg(short, long)]
        entry: Uuid,

        /// Units sold
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// POS transaction reference
        #[arg(short = 'x', long)]
        transaction: String,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    /// Register a new store
    Add {
        /// Store name
        #[arg(short, long)]
        name: String,
    },
    /// List registered stores
    List,
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Load inventory items for a store from a JSON file
    Inventory {
        /// Store id
        #[arg(short, long)]
        store: Uuid,

        /// Path to a JSON array of items
        #[arg(short, long)]
        file: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Store { action } => match action {
            StoreAction::Add { name } => commands::stores::add(&name).await?,
            StoreAction::List => commands::stores::list().await?,
        },
        Commands::Seed { target } => match target {
            SeedTarget::Inventory { store, file } => {
                commands::seed::inventory(store.into(), &file).await?;
            }
        },
        Commands::Import { file } => commands::import::run(&file).await?,
        Commands::Deploy { template, store } => {
            let stores = store.into_iter().map(Into::into).collect::<Vec<_>>();
            commands::deploy::run(template.into(), &stores).await?;
        }
        Commands::Status { store } => commands::status::run(store.into()).await?,
        Commands::Reorder { store } => commands::reorder::run(store.into()).await?,
        Commands::Sell {
            entry,
            quantity,
            transaction,
        } => commands::sell::run(entry.into(), quantity, transaction).await?,
    }
    Ok(())
}
