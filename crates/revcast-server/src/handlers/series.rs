//! Monthly series and reload handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::{AppError, AppState, Dataset};
use revcast_core::{fingerprint, MonthlySeries};

/// GET /api/series - The cached monthly revenue series
pub async fn get_series(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MonthlySeries>, AppError> {
    Ok(Json(state.snapshot()?.series))
}

/// Result of a reload request
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    /// Whether the series was rebuilt
    pub reloaded: bool,
    pub months: usize,
    pub fingerprint: String,
}

/// POST /api/reload - Rebuild the series if the input files changed
pub async fn reload(State(state): State<Arc<AppState>>) -> Result<Json<ReloadResponse>, AppError> {
    let current = state.snapshot()?;

    // File reads, hashing and CSV parsing stay off the async executor
    let sources = state.config.data.clone();
    let latest = tokio::task::spawn_blocking(move || fingerprint(&sources)).await??;

    if latest == current.fingerprint {
        return Ok(Json(ReloadResponse {
            reloaded: false,
            months: current.series.len(),
            fingerprint: latest,
        }));
    }

    let config = state.config.clone();
    let dataset = tokio::task::spawn_blocking(move || Dataset::load(&config)).await??;
    let response = ReloadResponse {
        reloaded: true,
        months: dataset.series.len(),
        fingerprint: dataset.fingerprint.clone(),
    };

    info!(
        months = response.months,
        fingerprint = %response.fingerprint,
        "Input files changed, series rebuilt"
    );

    *state
        .dataset
        .write()
        .map_err(|_| AppError::internal("Dataset lock poisoned"))? = dataset;

    Ok(Json(response))
}
