//! Revcast Core Library
//!
//! Monthly revenue forecasting for a sales fact table:
//! - CSV loading of the sales fact and time dimension tables
//! - Join and month-end aggregation into a contiguous monthly series
//! - Chronological train/test split
//! - Additive Holt-Winters fitting with a bounded Nelder-Mead search
//! - Accuracy metrics (MAE, MAPE, RMSE) and the comparison report
//! - Layered TOML configuration

pub mod config;
pub mod error;
pub mod evaluate;
pub mod load;
pub mod model;
pub mod models;
pub mod optimize;
pub mod pipeline;
pub mod report;
pub mod series;
pub mod split;

pub use config::{AppConfig, ColumnNames, ConfigSource, DataSources};
pub use error::{Error, Result};
pub use evaluate::{evaluate, Accuracy};
pub use load::{fingerprint, load_sources, RawData};
pub use model::{fit_and_forecast, FittedModel, HoltWinters};
pub use models::{
    ForecastConfig, GapPolicy, MonthlyPoint, MonthlySeries, SaleRecord, SmoothingParams,
    TimeRecord,
};
pub use optimize::OptimizerConfig;
pub use pipeline::{build_series_from_sources, run_forecast, ForecastRun, ModelSummary};
pub use report::{ComparisonRow, ForecastReport, ReportSummary};
pub use series::build_series;
pub use split::{split_series, SeriesSplit};
