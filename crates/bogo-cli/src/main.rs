use std::io::Write;

use anyhow::Context;
use bogo_scraper::{EatsClient, PipelineConfig};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "bogo-cli")]
#[command(about = "Find buy-one-get-one offers from storefronts delivering to an address")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve an address to the location token used for storefront queries
    Locate {
        /// Free-text delivery address
        address: String,
    },
    /// List storefronts with BOGO items for an address
    Offers {
        /// Free-text delivery address
        address: String,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = bogo_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = EatsClient::from_app_config(&config).context("failed to build upstream client")?;

    match cli.command {
        Commands::Locate { address } => {
            let token = bogo_scraper::resolve_location(&client, &address)
                .await
                .with_context(|| format!("could not resolve \"{address}\""))?;
            print_json(&token, true)?;
        }
        Commands::Offers { address, pretty } => {
            let pipeline = PipelineConfig::from_app_config(&config);
            let records = bogo_scraper::find_bogo_offers(&client, &address, &pipeline)
                .await
                .with_context(|| format!("bogo discovery failed for \"{address}\""))?;
            tracing::info!(stores = records.len(), "found bogo storefronts");
            print_json(&records, pretty)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    Ok(())
}
