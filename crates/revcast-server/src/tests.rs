//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tower::ServiceExt;

use revcast_core::{DataSources, ForecastConfig};

/// Write `months` months of trend + seasonal data starting January 2022
fn write_inputs(dir: &Path, months: usize, scale: f64) -> DataSources {
    let mut time = String::from("Date_Key,Full_Date\n");
    let mut sales = String::from("Date_Key,Total Revenue\n");

    for t in 0..months {
        let year = 2022 + (t / 12);
        let month = t % 12 + 1;
        let key = format!("{}{:02}15", year, month);
        let revenue = scale * (100.0 + 10.0 * t as f64 + if t % 4 == 3 { 15.0 } else { 0.0 });
        time.push_str(&format!("{},{}-{:02}-15\n", key, year, month));
        sales.push_str(&format!("{},{:.2}\n", key, revenue));
    }

    let sales_path = dir.join("Fact_Sales.csv");
    let time_path = dir.join("Dim_Time.csv");
    fs::write(&sales_path, sales).unwrap();
    fs::write(&time_path, time).unwrap();

    DataSources {
        sales_path,
        time_path,
        ..DataSources::default()
    }
}

fn test_config(dir: &Path) -> AppConfig {
    AppConfig {
        data: write_inputs(dir, 24, 1.0),
        forecast: ForecastConfig::new(6, 4),
        ..AppConfig::default()
    }
}

fn setup_test_app() -> (Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let state = AppState::new(test_config(dir.path())).unwrap();
    (create_router(state, ServerConfig::default()), dir)
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

// ========== Series API Tests ==========

#[tokio::test]
async fn test_get_series() {
    let (app, _dir) = setup_test_app();

    let response = get(app, "/api/series").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let points = json.as_array().unwrap();
    assert_eq!(points.len(), 24);
    assert_eq!(points[0]["month_end"], "2022-01-31");
    assert_eq!(points[0]["revenue"], 100.0);
    assert_eq!(points[23]["month_end"], "2023-12-31");
}

#[tokio::test]
async fn test_app_state_fails_on_missing_inputs() {
    let dir = TempDir::new().unwrap();
    let config = AppConfig {
        data: DataSources {
            sales_path: dir.path().join("nope.csv"),
            time_path: dir.path().join("nope_either.csv"),
            ..DataSources::default()
        },
        ..AppConfig::default()
    };
    assert!(matches!(
        AppState::new(config),
        Err(revcast_core::Error::DataLoad(_))
    ));
}

// ========== Forecast API Tests ==========

#[tokio::test]
async fn test_forecast_uses_configured_defaults() {
    let (app, _dir) = setup_test_app();

    let response = get(app, "/api/forecast").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["horizon"], 6);
    assert_eq!(json["seasonal_period"], 4);
    assert_eq!(json["train"].as_array().unwrap().len(), 18);
    assert_eq!(json["test"].as_array().unwrap().len(), 6);
    assert_eq!(json["forecast"].as_array().unwrap().len(), 6);
    assert_eq!(json["rows"].as_array().unwrap().len(), 6);
    assert!(json["accuracy"]["mae"].as_f64().unwrap() >= 0.0);
    assert!(json["summary"]["total_actual"].as_f64().unwrap() > 0.0);
    assert!(json["params"]["alpha"].as_f64().is_some());
    assert_eq!(json["fingerprint"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn test_forecast_query_overrides() {
    let (app, _dir) = setup_test_app();

    let response = get(app, "/api/forecast?horizon=3&seasonal_period=4").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["horizon"], 3);
    let rows = json["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2]["date"], "2023-12-31");
}

#[tokio::test]
async fn test_forecast_horizon_too_long() {
    let (app, _dir) = setup_test_app();

    let response = get(app, "/api/forecast?horizon=24").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("n_test=24"));
}

#[tokio::test]
async fn test_forecast_invalid_period() {
    let (app, _dir) = setup_test_app();

    let response = get(app, "/api/forecast?seasonal_period=1").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_forecast_training_too_short_is_unprocessable() {
    let (app, _dir) = setup_test_app();

    // 23 held out leaves one training month for a 4-month season
    let response = get(app, "/api/forecast?horizon=23").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = get_body_json(response).await;
    assert!(json["error"].as_str().is_some());
}

#[tokio::test]
async fn test_export_forecast_csv() {
    let (app, _dir) = setup_test_app();

    let response = get(app, "/api/forecast/export?horizon=4").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/csv; charset=utf-8"
    );
    assert!(response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .contains("forecast_result.csv"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "date,actual,forecast,residual");
    assert_eq!(lines.len(), 5);
    assert!(lines[4].starts_with("2023-12-31,"));
}

// ========== Reload API Tests ==========

#[tokio::test]
async fn test_reload_without_changes() {
    let (app, _dir) = setup_test_app();

    let response = post(app, "/api/reload").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["reloaded"], false);
    assert_eq!(json["months"], 24);
}

#[tokio::test]
async fn test_reload_picks_up_new_data() {
    let dir = TempDir::new().unwrap();
    let state = AppState::new(test_config(dir.path())).unwrap();
    let before = state.snapshot().unwrap().fingerprint;
    let app = create_router(state, ServerConfig::default());

    write_inputs(dir.path(), 30, 2.0);

    let response = post(app.clone(), "/api/reload").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["reloaded"], true);
    assert_eq!(json["months"], 30);
    assert_ne!(json["fingerprint"].as_str().unwrap(), before);

    let response = get(app, "/api/series").await;
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 30);
    assert_eq!(json[0]["revenue"], 200.0);
}

#[tokio::test]
async fn test_reload_rebuilds_once_per_change() {
    let dir = TempDir::new().unwrap();
    let state = AppState::new(test_config(dir.path())).unwrap();
    let app = create_router(state, ServerConfig::default());

    write_inputs(dir.path(), 27, 1.0);

    let first = get_body_json(post(app.clone(), "/api/reload").await).await;
    assert_eq!(first["reloaded"], true);
    assert_eq!(first["months"], 27);

    let second = get_body_json(post(app, "/api/reload").await).await;
    assert_eq!(second["reloaded"], false);
    assert_eq!(second["months"], 27);
    assert_eq!(second["fingerprint"], first["fingerprint"]);
}

#[tokio::test]
async fn test_reload_with_broken_input_keeps_cached_series() {
    let dir = TempDir::new().unwrap();
    let state = AppState::new(test_config(dir.path())).unwrap();
    let app = create_router(state, ServerConfig::default());

    fs::write(dir.path().join("Fact_Sales.csv"), "Wrong,Header\n1,2\n").unwrap();

    let response = post(app.clone(), "/api/reload").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "An internal error occurred");

    let response = get(app, "/api/series").await;
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 24);
}

// ========== Middleware Tests ==========

#[tokio::test]
async fn test_security_headers() {
    let (app, _dir) = setup_test_app();

    let response = get(app, "/api/series").await;
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
}

#[tokio::test]
async fn test_unknown_route() {
    let (app, _dir) = setup_test_app();

    let response = get(app, "/api/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
