//! Revcast Web Server
//!
//! Axum-based REST API over the revcast forecasting pipeline.
//!
//! The monthly series is built once at startup and cached together with a
//! fingerprint of the input files. `POST /api/reload` re-reads the inputs
//! and only rebuilds when the fingerprint changed; every forecast request
//! runs the fit against the cached series.
//!
//! Security features:
//! - Restrictive CORS policy
//! - Security response headers
//! - Sanitized error responses

use std::sync::{Arc, RwLock};

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info};

use revcast_core::{build_series_from_sources, fingerprint, AppConfig, MonthlySeries};

mod handlers;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// The cached monthly series and the fingerprint of the files it came from
#[derive(Debug, Clone)]
pub struct Dataset {
    pub series: MonthlySeries,
    pub fingerprint: String,
}

impl Dataset {
    /// Read the configured inputs and build the series
    pub fn load(config: &AppConfig) -> revcast_core::Result<Self> {
        let fingerprint = fingerprint(&config.data)?;
        let series = build_series_from_sources(&config.data, config.gap_policy)?;
        Ok(Self {
            series,
            fingerprint,
        })
    }
}

/// Shared application state
pub struct AppState {
    /// Resolved configuration; forecast defaults come from here
    pub config: AppConfig,
    pub dataset: RwLock<Dataset>,
}

impl AppState {
    /// Build the initial dataset from the configured sources
    pub fn new(config: AppConfig) -> revcast_core::Result<Self> {
        let dataset = Dataset::load(&config)?;
        info!(
            months = dataset.series.len(),
            fingerprint = %dataset.fingerprint,
            "Monthly series loaded"
        );
        Ok(Self {
            config,
            dataset: RwLock::new(dataset),
        })
    }

    /// Clone the cached dataset out of the lock
    pub fn snapshot(&self) -> Result<Dataset, AppError> {
        self.dataset
            .read()
            .map(|d| d.clone())
            .map_err(|_| AppError::internal("Dataset lock poisoned"))
    }
}

/// Create the router with all API routes
pub fn create_router(state: AppState, config: ServerConfig) -> Router {
    let state = Arc::new(state);

    let api_routes = Router::new()
        .route("/series", get(handlers::get_series))
        .route("/forecast", get(handlers::get_forecast))
        .route("/forecast/export", get(handlers::export_forecast))
        .route("/reload", post(handlers::reload));

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        ))
}

/// Load the dataset and start the server
pub async fn serve(
    app_config: AppConfig,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let state = AppState::new(app_config)?;
    let app = create_router(state, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// API error type
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unprocessable(msg: &str) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        // Caller mistakes and fit failures are reported as-is
        if let Some(core) = err.downcast_ref::<revcast_core::Error>() {
            use revcast_core::Error;
            match core {
                Error::InvalidHorizon { .. } | Error::InvalidConfig(_) => {
                    return Self::bad_request(&core.to_string());
                }
                Error::ModelFit(_) | Error::UndefinedMetric(_) => {
                    return Self::unprocessable(&core.to_string());
                }
                _ => {}
            }
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
