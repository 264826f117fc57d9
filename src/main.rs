use anyhow::Context;
use clap::Parser;
use gmx_trader::cli::{self, Cli, Commands};
use gmx_trader::config::{AppConfig, LoggingConfig};
use gmx_trader::domain::OrderKind;
use gmx_trader::exchange::build_engine;
use gmx_trader::signing::Wallet;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config)
        .with_context(|| format!("failed to load config from '{}'", cli.config))?;
    init_logging(&config.logging, cli.json_logs);

    let wallet = Wallet::from_env()?;
    let engine = build_engine(&config, &wallet)?;
    info!(chain = %cli.chain, trader = %wallet.address(), dry_run = cli.dry_run, "gmx-trader starting");

    let result = match &cli.command {
        Commands::Increase(args) => {
            cli::run_position(&engine, OrderKind::Increase, &cli.chain, args, cli.dry_run).await
        }
        Commands::Decrease(args) => {
            cli::run_decrease(&engine, &cli.chain, args, cli.dry_run).await
        }
        Commands::Swap(args) => cli::run_swap(&engine, &cli.chain, args, cli.dry_run).await,
        Commands::Markets => cli::show_markets(&engine, &cli.chain).await,
        Commands::Positions => cli::show_positions(&engine, &cli.chain).await,
        Commands::Gas => cli::show_gas(&engine, &cli.chain).await,
    };

    if let Err(e) = &result {
        error!("Command failed: {}", e);
    }
    Ok(result?)
}

fn init_logging(logging: &LoggingConfig, json_override: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if logging.level.eq_ignore_ascii_case("info") {
            EnvFilter::new("info,gmx_trader=debug")
        } else {
            EnvFilter::new(&logging.level)
        }
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if logging.json || json_override {
        builder.json().init();
    } else {
        builder.init();
    }
}
