//! Farewatch CLI
//!
//! Local execution entry point.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use farewatch::{
    config,
    error::Result,
    models::{Config, SearchDefinition},
    notify::NotifierChain,
    pipeline::{self, SearchStateUpdater},
    services::SouthwestClient,
};

/// Farewatch - Airline Fare Watcher
#[derive(Parser, Debug)]
#[command(
    name = "farewatch",
    version,
    about = "Polls airline fares and reports what changed"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll now, then every interval until Ctrl-C
    Watch {
        /// Override `watcher.interval_secs`
        #[arg(long)]
        interval_secs: Option<u64>,
    },

    /// Run a single polling cycle
    Once,

    /// Validate configuration and search files
    Validate,

    /// List declared searches
    Searches,
}

/// Initialize logging from the verbosity flag or the configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn build_updater(config: &Config, searches: Vec<SearchDefinition>) -> Result<SearchStateUpdater> {
    let fetcher = SouthwestClient::new(&config.client)?;
    let notifier = NotifierChain::from_config(config)?;
    log::info!(
        "Watching {} searches with {} notifiers",
        searches.len(),
        notifier.len()
    );
    Ok(SearchStateUpdater::new(searches, fetcher, notifier))
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = Config::load(&cli.config)
        .map(|c| c.logging.level)
        .unwrap_or_else(|_| "info".to_string());
    init_logging(cli.verbose, &level);

    log::info!("Farewatch starting...");

    let (config, searches) = config::load_all(&cli.config)?;
    log::info!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Watch { interval_secs } => {
            let secs = interval_secs.unwrap_or(config.watcher.interval_secs).max(1);
            let period = Duration::from_secs(secs);
            let mut updater = build_updater(&config, searches)?;

            log::info!("Polling every {}s, press Ctrl-C to stop", period.as_secs());
            let cycles = pipeline::run_watcher(&mut updater, period, wait_for_ctrl_c()).await;
            log::info!("Stopped after {cycles} cycles");
        }

        Command::Once => {
            let mut updater = build_updater(&config, searches)?;
            let report = updater.run_cycle().await?;
            log::info!(
                "Cycle complete: {} flights tracked across {} searches",
                report.flight_count,
                report.search_count
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            log::info!("✓ Config OK (polling every {}s)", config.watcher.interval_secs);
            log::info!("✓ {} searches OK", searches.len());

            let routes: usize = searches.iter().map(|s| s.routes().len()).sum();
            let queries: usize = searches
                .iter()
                .map(|s| s.routes().len() * s.departure_dates().len())
                .sum();
            log::info!("{routes} routes, {queries} queries per cycle");
            log::info!("All validations passed!");
        }

        Command::Searches => {
            if searches.is_empty() {
                println!("No searches declared.");
            }
            for (i, search) in searches.iter().enumerate() {
                println!("{:>3}. {}", i + 1, search);
            }
        }
    }

    Ok(())
}
