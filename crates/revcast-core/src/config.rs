//! Pipeline configuration
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a layered resolution:
//! 1. Explicit path (e.g. `--config`), which must exist
//! 2. Override in data dir (~/.local/share/revcast/config.toml)
//! 3. Embedded defaults (compiled into binary)
//!
//! Keys missing from a file keep their default values.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{ForecastConfig, GapPolicy};
use crate::optimize::OptimizerConfig;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/revcast.toml");

/// Header names of the logical input fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    /// Join key, present in both tables
    pub date_key: String,
    /// Revenue amount in the sales table
    pub revenue: String,
    /// Calendar date in the time dimension
    pub calendar_date: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            date_key: "Date_Key".to_string(),
            revenue: "Total Revenue".to_string(),
            calendar_date: "Full_Date".to_string(),
        }
    }
}

/// Where the two input tables live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub sales_path: PathBuf,
    pub time_path: PathBuf,
    pub columns: ColumnNames,
}

impl Default for DataSources {
    fn default() -> Self {
        Self {
            sales_path: PathBuf::from("Fact_Sales.csv"),
            time_path: PathBuf::from("Dim_Time.csv"),
            columns: ColumnNames::default(),
        }
    }
}

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppConfig {
    pub data: DataSources,
    pub gap_policy: GapPolicy,
    pub forecast: ForecastConfig,
    pub optimizer: OptimizerConfig,
}

/// Which layer a configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    UserOverride(PathBuf),
    Embedded,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::UserOverride(path) => write!(f, "{} (user override)", path.display()),
            Self::Embedded => write!(f, "built-in defaults"),
        }
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("revcast").join("config.toml"))
}

impl AppConfig {
    /// Resolve configuration from an explicit path, the user override, or
    /// the embedded defaults, in that order
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            let config = Self::from_toml(&read(path)?)?;
            return Ok((config, ConfigSource::File(path.to_path_buf())));
        }

        if let Some(path) = default_config_path().filter(|p| p.exists()) {
            debug!(path = %path.display(), "Using config override");
            let config = Self::from_toml(&read(&path)?)?;
            return Ok((config, ConfigSource::UserOverride(path)));
        }

        Ok((Self::from_toml(DEFAULT_CONFIG)?, ConfigSource::Embedded))
    }

    /// Parse config from TOML content, filling gaps with defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = AppConfig::default();

        if let Some(data) = raw.data {
            if let Some(path) = data.sales_path {
                config.data.sales_path = path;
            }
            if let Some(path) = data.time_path {
                config.data.time_path = path;
            }
            if let Some(columns) = data.columns {
                if let Some(name) = columns.date_key {
                    config.data.columns.date_key = name;
                }
                if let Some(name) = columns.revenue {
                    config.data.columns.revenue = name;
                }
                if let Some(name) = columns.calendar_date {
                    config.data.columns.calendar_date = name;
                }
            }
        }

        if let Some(series) = raw.series {
            if let Some(policy) = series.gap_policy {
                config.gap_policy = policy.parse().map_err(Error::Config)?;
            }
        }

        if let Some(forecast) = raw.forecast {
            if let Some(horizon) = forecast.horizon {
                config.forecast.horizon = horizon;
            }
            if let Some(period) = forecast.seasonal_period {
                config.forecast.seasonal_period = period;
            }
        }

        if let Some(optimizer) = raw.optimizer {
            if let Some(max) = optimizer.max_iterations {
                config.optimizer.max_iterations = max;
            }
            if let Some(tol) = optimizer.tolerance {
                config.optimizer.tolerance = tol;
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.forecast.validate()?;
        if self.optimizer.max_iterations == 0 {
            return Err(Error::InvalidConfig(
                "optimizer.max_iterations must be at least 1".into(),
            ));
        }
        if !(self.optimizer.tolerance.is_finite() && self.optimizer.tolerance > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "optimizer.tolerance must be a positive number (got {})",
                self.optimizer.tolerance
            )));
        }
        Ok(())
    }

    /// Render the resolved configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        let raw = RawConfig {
            data: Some(RawData {
                sales_path: Some(self.data.sales_path.clone()),
                time_path: Some(self.data.time_path.clone()),
                columns: Some(RawColumns {
                    date_key: Some(self.data.columns.date_key.clone()),
                    revenue: Some(self.data.columns.revenue.clone()),
                    calendar_date: Some(self.data.columns.calendar_date.clone()),
                }),
            }),
            series: Some(RawSeries {
                gap_policy: Some(self.gap_policy.as_str().to_string()),
            }),
            forecast: Some(RawForecast {
                horizon: Some(self.forecast.horizon),
                seasonal_period: Some(self.forecast.seasonal_period),
            }),
            optimizer: Some(RawOptimizer {
                max_iterations: Some(self.optimizer.max_iterations),
                tolerance: Some(self.optimizer.tolerance),
            }),
        };
        toml::to_string_pretty(&raw)
            .map_err(|e| Error::Config(format!("Failed to render config: {}", e)))
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config {}: {}", path.display(), e)))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Default, Serialize, Deserialize)]
struct RawConfig {
    data: Option<RawData>,
    series: Option<RawSeries>,
    forecast: Option<RawForecast>,
    optimizer: Option<RawOptimizer>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawData {
    sales_path: Option<PathBuf>,
    time_path: Option<PathBuf>,
    columns: Option<RawColumns>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawColumns {
    date_key: Option<String>,
    revenue: Option<String>,
    calendar_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawSeries {
    gap_policy: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawForecast {
    horizon: Option<usize>,
    seasonal_period: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawOptimizer {
    max_iterations: Option<usize>,
    tolerance: Option<f64>,
}
