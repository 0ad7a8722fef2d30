mod adapters;
mod search;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "cartroute-cli")]
#[command(about = "Find nearby stores for a shopping list and plan routes across them")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Discover stores near you and optionally plan routes
    Search {
        /// What you want to buy, in free text (e.g. "2kg rice and 6 eggs")
        #[arg(long)]
        query: String,
        /// Search radius in kilometres
        #[arg(long, default_value = "2")]
        radius_km: f64,
        /// Search around this address instead of the current position
        #[arg(long)]
        address: Option<String>,
        /// Continue to route planning after discovery
        #[arg(long)]
        plan: bool,
        /// Select this route id after planning (implies --plan)
        #[arg(long)]
        select: Option<u32>,
    },
    /// Print the effective configuration (secrets redacted)
    Config,
}

fn init_tracing(fallback_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cartroute_core::load_app_config()?;
    init_tracing(&config.log_level);

    match cli.command {
        Some(Commands::Search {
            query,
            radius_km,
            address,
            plan,
            select,
        }) => {
            search::run_search(
                &config,
                &search::SearchArgs {
                    query,
                    radius_km,
                    address,
                    plan: plan || select.is_some(),
                    select,
                },
            )
            .await?;
        }
        Some(Commands::Config) => println!("{config:#?}"),
        None => println!("cartroute-cli: run with --help for usage"),
    }

    Ok(())
}
