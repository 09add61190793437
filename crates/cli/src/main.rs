//! Greengrocer CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply storefront migrations
//! gg-cli migrate storefront
//!
//! # Apply login demo migrations
//! gg-cli migrate login
//!
//! # Apply both
//! gg-cli migrate all
//!
//! # Create the admin from STOREFRONT_ADMIN_USERNAME / STOREFRONT_ADMIN_PASSWORD
//! gg-cli admin bootstrap
//!
//! # Insert products from a YAML catalog
//! gg-cli seed products -f catalog.yaml
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gg-cli")]
#[command(author, version, about = "Greengrocer CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Run storefront database migrations
    Storefront,
    /// Run login demo database migrations
    Login,
    /// Run all database migrations
    All,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create the configured admin if no admin exists yet
    Bootstrap,
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert products from a YAML file, skipping names that already exist
    Products {
        /// Path to the YAML catalog
        #[arg(short, long)]
        file: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
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
        Commands::Migrate { target } => match target {
            MigrateTarget::Storefront => commands::migrate::storefront().await?,
            MigrateTarget::Login => commands::migrate::login().await?,
            MigrateTarget::All => {
                commands::migrate::storefront().await?;
                commands::migrate::login().await?;
            }
        },
        Commands::Admin { action } => match action {
            AdminAction::Bootstrap => commands::admin::bootstrap().await?,
        },
        Commands::Seed { target } => match target {
            SeedTarget::Products { file } => commands::seed::products(&file).await?,
        },
    }
    Ok(())
}
