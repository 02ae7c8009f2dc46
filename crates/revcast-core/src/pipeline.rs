//! End-to-end forecasting pipeline
//!
//! Each stage is a pure function; the caller decides when to re-run and
//! whether to cache the monthly series:
//!
//! ```text
//! load_sources → build_series → split_series → HoltWinters::fit → forecast → evaluate
//! ```

use serde::Serialize;
use tracing::info;

use crate::config::DataSources;
use crate::error::Result;
use crate::evaluate::{evaluate, Accuracy};
use crate::load::load_sources;
use crate::model::HoltWinters;
use crate::models::{ForecastConfig, GapPolicy, MonthlyPoint, MonthlySeries, SmoothingParams};
use crate::optimize::OptimizerConfig;
use crate::report::ForecastReport;
use crate::series::build_series;
use crate::split::split_series;

/// What the parameter search settled on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub params: SmoothingParams,
    pub level: f64,
    pub trend: f64,
    pub seasonal: Vec<f64>,
    /// In-sample sum of squared one-step-ahead errors
    pub sse: f64,
    pub iterations: usize,
}

/// Output of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRun {
    pub config: ForecastConfig,
    pub train: Vec<MonthlyPoint>,
    pub test: Vec<MonthlyPoint>,
    /// Forecast values aligned with `test`
    pub forecast: Vec<f64>,
    pub accuracy: Accuracy,
    pub model: ModelSummary,
    pub report: ForecastReport,
}

/// Load both input tables and build the monthly series
pub fn build_series_from_sources(sources: &DataSources, gaps: GapPolicy) -> Result<MonthlySeries> {
    let raw = load_sources(sources)?;
    build_series(&raw.sales, &raw.time, gaps)
}

/// Split, fit, forecast and evaluate a monthly series
pub fn run_forecast(
    series: &MonthlySeries,
    config: &ForecastConfig,
    optimizer: &OptimizerConfig,
) -> Result<ForecastRun> {
    config.validate()?;

    let split = split_series(series, config.horizon)?;
    let train = split.train_values();
    let test = split.test_values();

    let fitted = HoltWinters::new(config.seasonal_period)?
        .with_optimizer(*optimizer)
        .fit(&train)?;
    let forecast = fitted.forecast(test.len());

    let accuracy = evaluate(&test, &forecast)?;
    let report = ForecastReport::new(&split.test, &forecast, &accuracy)?;

    info!(
        horizon = config.horizon,
        seasonal_period = config.seasonal_period,
        train = train.len(),
        mae = accuracy.mae,
        mape = ?accuracy.mape,
        "Forecast complete"
    );

    let model = ModelSummary {
        params: fitted.params(),
        level: fitted.level(),
        trend: fitted.trend(),
        seasonal: fitted.seasonal().to_vec(),
        sse: fitted.sse(),
        iterations: fitted.iterations(),
    };

    Ok(ForecastRun {
        config: *config,
        train: split.train,
        test: split.test,
        forecast,
        accuracy,
        model,
        report,
    })
}
