//! Shared utilities for commands
//!
//! This module contains:
//! - `load_config` - Resolve the config file and apply CLI overrides
//! - `load_series` - Build the monthly series from the configured inputs
//! - `run_configured_forecast` - Run the pipeline with optional overrides

use std::path::Path;

use anyhow::{Context, Result};
use revcast_core::{
    build_series_from_sources, run_forecast, AppConfig, ConfigSource, ForecastConfig,
    ForecastRun, MonthlySeries,
};
use tracing::debug;

/// Resolve configuration, then apply `--sales`/`--time` overrides
pub fn load_config(
    path: Option<&Path>,
    sales: Option<&Path>,
    time: Option<&Path>,
) -> Result<(AppConfig, ConfigSource)> {
    let (mut config, source) = AppConfig::load(path).context("Failed to load configuration")?;
    debug!(source = %source, "Configuration resolved");

    if let Some(sales) = sales {
        config.data.sales_path = sales.to_path_buf();
    }
    if let Some(time) = time {
        config.data.time_path = time.to_path_buf();
    }

    Ok((config, source))
}

/// Forecast settings with command-line overrides applied
pub fn resolve_forecast(
    config: &AppConfig,
    horizon: Option<usize>,
    seasonal_period: Option<usize>,
) -> ForecastConfig {
    ForecastConfig::new(
        horizon.unwrap_or(config.forecast.horizon),
        seasonal_period.unwrap_or(config.forecast.seasonal_period),
    )
}

pub fn load_series(config: &AppConfig) -> Result<MonthlySeries> {
    build_series_from_sources(&config.data, config.gap_policy).with_context(|| {
        format!(
            "Failed to build monthly series from {} and {}",
            config.data.sales_path.display(),
            config.data.time_path.display()
        )
    })
}

/// Load the series and run the pipeline
pub fn run_configured_forecast(
    config: &AppConfig,
    horizon: Option<usize>,
    seasonal_period: Option<usize>,
) -> Result<ForecastRun> {
    let series = load_series(config)?;
    let forecast = resolve_forecast(config, horizon, seasonal_period);
    run_forecast(&series, &forecast, &config.optimizer).with_context(|| {
        format!(
            "Forecast failed (horizon {}, seasonal period {})",
            forecast.horizon, forecast.seasonal_period
        )
    })
}
