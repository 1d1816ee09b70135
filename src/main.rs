//! price-tracker - Scrape furniture and electronics prices into a local catalog
//!
//! Stores products by category, rescans them for price changes and exports an
//! HTML report with converted totals.

use anyhow::Result;
use clap::{Parser, Subcommand};
use price_tracker::commands::{AddCommand, ExportCommand, RescanCommand, Services};
use price_tracker::config::Config;
use price_tracker::menu::Menu;
use price_tracker::sites::SiteRegistry;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "price-tracker",
    version,
    about = "Track product prices from IKEA, Elgiganten and Trademax",
    long_about = "Scrapes product pages into a category-grouped JSON store, rescans them for price changes and exports an HTML report with currency conversion."
)]
struct Cli {
    /// Path to config file (JSON or TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the product store
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Delay between retries in milliseconds
    #[arg(long, global = true)]
    delay: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape product URLs into a category
    #[command(alias = "a")]
    Add {
        /// Category name (case-insensitive)
        category: String,

        /// Product page URL(s)
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Export the catalog as an HTML report
    #[command(alias = "e")]
    Export {
        /// Output file (defaults to the configured report path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Re-scrape all stored products and update changed prices
    #[command(alias = "r")]
    Rescan,

    /// Interactive menu (default)
    Menu,

    /// List supported shops
    Sites,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(store) = cli.store {
        config.store_path = store;
    }
    if let Some(delay) = cli.delay {
        config.fetch.retry_delay_ms = delay;
    }

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Add { category, urls } => {
            let cmd = AddCommand::new(config);
            let output = cmd.execute(&category, &urls).await?;
            println!("{}", output);
        }

        Commands::Export { output } => {
            let cmd = ExportCommand::new(config);
            let message = cmd.execute(output.as_deref()).await?;
            println!("{}", message);
        }

        Commands::Rescan => {
            let cmd = RescanCommand::new(config);
            let outcome = cmd.execute().await?;
            println!("{}", outcome);
        }

        Commands::Menu => {
            let services = Services::from_config(&config)?;
            let stdin = std::io::stdin();
            let mut menu = Menu::new(&config, &services, stdin.lock(), std::io::stdout());
            menu.run().await?;
        }

        Commands::Sites => {
            let registry = SiteRegistry::with_defaults();
            println!("Supported shops:\n");
            for domain in registry.domains() {
                println!("  {}", domain);
            }
        }
    }

    Ok(())
}
