//! Forecast and comparison export handlers

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, Response, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};
use revcast_core::{
    run_forecast, Accuracy, ComparisonRow, ForecastConfig, ForecastRun, MonthlyPoint,
    ReportSummary, SmoothingParams,
};

/// Query parameters for forecast endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    /// Months held out for evaluation (defaults to the configured horizon)
    pub horizon: Option<usize>,
    /// Seasonal cycle length (defaults to the configured period)
    pub seasonal_period: Option<usize>,
}

/// Forecast run as returned by the API
#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub horizon: usize,
    pub seasonal_period: usize,
    pub fingerprint: String,
    pub train: Vec<MonthlyPoint>,
    pub test: Vec<MonthlyPoint>,
    pub forecast: Vec<f64>,
    pub accuracy: Accuracy,
    pub summary: ReportSummary,
    pub rows: Vec<ComparisonRow>,
    pub params: SmoothingParams,
}

impl ForecastResponse {
    fn new(run: ForecastRun, fingerprint: String) -> Self {
        Self {
            horizon: run.config.horizon,
            seasonal_period: run.config.seasonal_period,
            fingerprint,
            train: run.train,
            test: run.test,
            forecast: run.forecast,
            accuracy: run.accuracy,
            summary: run.report.summary,
            rows: run.report.rows,
            params: run.model.params,
        }
    }
}

/// Run the pipeline on the cached series off the async executor
async fn forecast(
    state: &AppState,
    query: &ForecastQuery,
) -> Result<(ForecastRun, String), AppError> {
    let defaults = state.config.forecast;
    let config = ForecastConfig::new(
        query.horizon.unwrap_or(defaults.horizon),
        query.seasonal_period.unwrap_or(defaults.seasonal_period),
    );
    let optimizer = state.config.optimizer;
    let dataset = state.snapshot()?;

    let series = dataset.series;
    let run = tokio::task::spawn_blocking(move || run_forecast(&series, &config, &optimizer))
        .await??;

    Ok((run, dataset.fingerprint))
}

/// GET /api/forecast - Fit, forecast and evaluate against the held-out months
pub async fn get_forecast(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<ForecastResponse>, AppError> {
    let (run, fingerprint) = forecast(&state, &query).await?;
    Ok(Json(ForecastResponse::new(run, fingerprint)))
}

/// GET /api/forecast/export - Comparison table as a CSV download
pub async fn export_forecast(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ForecastQuery>,
) -> Result<Response<Body>, AppError> {
    let (run, _) = forecast(&state, &query).await?;
    let csv = run.report.to_csv()?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"forecast_result.csv\"",
        )
        .body(Body::from(csv))
        .map_err(|e| AppError::internal(&e.to_string()))
}
