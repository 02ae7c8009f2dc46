//! Revcast CLI - Monthly revenue forecasting
//!
//! Usage:
//!   revcast series                  Show the monthly revenue series
//!   revcast forecast -n 9 -m 8      Fit, forecast and evaluate
//!   revcast export -o result.csv    Export the comparison table
//!   revcast serve --port 3000       Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let (config, source) = commands::load_config(
        cli.config.as_deref(),
        cli.sales.as_deref(),
        cli.time.as_deref(),
    )?;

    match cli.command {
        Commands::Series { json } => commands::cmd_series(&config, json),
        Commands::Forecast {
            horizon,
            seasonal_period,
            json,
        } => commands::cmd_forecast(&config, horizon, seasonal_period, json),
        Commands::Export {
            horizon,
            seasonal_period,
            output,
        } => commands::cmd_export(&config, horizon, seasonal_period, output.as_deref()),
        Commands::Config => commands::cmd_config(&config, &source),
        Commands::Serve { port, host } => commands::cmd_serve(config, &host, port).await,
    }
}
