//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Revcast - Monthly revenue forecasting
#[derive(Parser)]
#[command(name = "revcast")]
#[command(about = "Holt-Winters revenue forecasts from a sales fact table", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the per-user override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Sales fact CSV (overrides the config file)
    #[arg(long, global = true)]
    pub sales: Option<PathBuf>,

    /// Time dimension CSV (overrides the config file)
    #[arg(long, global = true)]
    pub time: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the monthly revenue series
    Series {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fit the model and compare the forecast with the held-out months
    Forecast {
        /// Months held out for evaluation
        #[arg(short = 'n', long)]
        horizon: Option<usize>,

        /// Seasonal cycle length in months
        #[arg(short = 'm', long)]
        seasonal_period: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export the actual-vs-forecast table as CSV
    Export {
        /// Months held out for evaluation
        #[arg(short = 'n', long)]
        horizon: Option<usize>,

        /// Seasonal cycle length in months
        #[arg(short = 'm', long)]
        seasonal_period: Option<usize>,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the resolved configuration
    Config,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}
