//! Data models for revcast

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ========== Raw Input Models ==========

/// A row from the sales fact table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Foreign key into the time dimension
    pub date_key: String,
    pub revenue: f64,
}

/// A row from the time dimension table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRecord {
    pub date_key: String,
    pub date: NaiveDate,
}

// ========== Series Models ==========

/// Total revenue for one calendar month, keyed by the month's last day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub month_end: NaiveDate,
    pub revenue: f64,
}

/// Chronologically ordered monthly revenue totals, one point per month
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<MonthlyPoint>", into = "Vec<MonthlyPoint>")]
pub struct MonthlySeries {
    points: Vec<MonthlyPoint>,
}

impl MonthlySeries {
    /// Build a series from points that are already in strictly increasing
    /// month order.
    pub fn from_points(points: Vec<MonthlyPoint>) -> Result<Self> {
        if let Some(pair) = points
            .windows(2)
            .find(|pair| pair[0].month_end >= pair[1].month_end)
        {
            return Err(Error::DataLoad(format!(
                "series is not strictly increasing: {} followed by {}",
                pair[0].month_end, pair[1].month_end
            )));
        }
        Ok(Self { points })
    }

    /// Build a series of consecutive months ending on month-ends, starting
    /// from the month containing `start`.
    pub fn from_values(start: NaiveDate, values: &[f64]) -> Self {
        let mut month_end = crate::series::month_end(start);
        let mut points = Vec::with_capacity(values.len());
        for &revenue in values {
            points.push(MonthlyPoint { month_end, revenue });
            month_end = crate::series::next_month_end(month_end);
        }
        Self { points }
    }

    pub fn points(&self) -> &[MonthlyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Revenue values in chronological order
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.revenue).collect()
    }

    /// Month-end dates in chronological order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.month_end).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.month_end)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.month_end)
    }

    /// Total revenue across all months
    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.revenue).sum()
    }
}

impl TryFrom<Vec<MonthlyPoint>> for MonthlySeries {
    type Error = Error;

    fn try_from(points: Vec<MonthlyPoint>) -> Result<Self> {
        Self::from_points(points)
    }
}

impl From<MonthlySeries> for Vec<MonthlyPoint> {
    fn from(series: MonthlySeries) -> Self {
        series.points
    }
}

/// How months without any matched sale are treated when resampling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Emit a zero-revenue point for every empty month between the first and
    /// last observed month
    #[default]
    ZeroFill,
    /// Only emit months that have at least one sale
    Skip,
}

impl GapPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZeroFill => "zero_fill",
            Self::Skip => "skip",
        }
    }
}

impl std::str::FromStr for GapPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "zero_fill" => Ok(Self::ZeroFill),
            "skip" => Ok(Self::Skip),
            _ => Err(format!(
                "Unknown gap policy: {} (valid: zero_fill, skip)",
                s
            )),
        }
    }
}

// ========== Forecast Models ==========

/// Per-run forecasting parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Number of most recent months held out and forecast (n_test)
    pub horizon: usize,
    /// Length of one seasonal cycle in months
    pub seasonal_period: usize,
}

impl ForecastConfig {
    pub const DEFAULT_HORIZON: usize = 9;
    pub const DEFAULT_SEASONAL_PERIOD: usize = 8;

    pub fn new(horizon: usize, seasonal_period: usize) -> Self {
        Self {
            horizon,
            seasonal_period,
        }
    }

    /// Check the parameters that do not depend on the series length
    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(Error::InvalidConfig("horizon must be at least 1".into()));
        }
        if self.seasonal_period < 2 {
            return Err(Error::InvalidConfig(format!(
                "seasonal_period must be at least 2 (got {})",
                self.seasonal_period
            )));
        }
        Ok(())
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_HORIZON, Self::DEFAULT_SEASONAL_PERIOD)
    }
}

/// Estimated Holt-Winters smoothing coefficients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingParams {
    /// Level smoothing
    pub alpha: f64,
    /// Trend smoothing
    pub beta: f64,
    /// Seasonal smoothing
    pub gamma: f64,
}
