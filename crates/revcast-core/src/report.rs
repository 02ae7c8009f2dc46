//! Actual-vs-forecast comparison table and CSV export

use std::io::{self, Write};

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::evaluate::Accuracy;
use crate::models::MonthlyPoint;

/// One held-out month compared against its forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub date: NaiveDate,
    pub actual: f64,
    pub forecast: f64,
    /// `actual - forecast`
    pub residual: f64,
}

/// Headline figures for the held-out window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_actual: f64,
    pub total_forecast: f64,
    pub mae: f64,
    pub mape: Option<f64>,
}

/// Comparison rows plus summary for a forecast run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    pub rows: Vec<ComparisonRow>,
    pub summary: ReportSummary,
}

impl ForecastReport {
    /// Pair each held-out month with its forecast
    pub fn new(test: &[MonthlyPoint], forecast: &[f64], accuracy: &Accuracy) -> Result<Self> {
        if test.len() != forecast.len() {
            return Err(Error::UndefinedMetric(format!(
                "cannot align {} actual months with {} forecasts",
                test.len(),
                forecast.len()
            )));
        }

        let rows: Vec<ComparisonRow> = test
            .iter()
            .zip(forecast)
            .map(|(point, &f)| ComparisonRow {
                date: point.month_end,
                actual: point.revenue,
                forecast: f,
                residual: point.revenue - f,
            })
            .collect();

        let summary = ReportSummary {
            total_actual: rows.iter().map(|r| r.actual).sum(),
            total_forecast: rows.iter().map(|r| r.forecast).sum(),
            mae: accuracy.mae,
            mape: accuracy.mape,
        };

        Ok(Self { rows, summary })
    }

    /// Write the rows as CSV (`date,actual,forecast,residual`)
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["date", "actual", "forecast", "residual"])?;
        for row in &self.rows {
            wtr.write_record([
                row.date.format("%Y-%m-%d").to_string(),
                format!("{:.2}", row.actual),
                format!("{:.2}", row.forecast),
                format!("{:.2}", row.residual),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Render the rows as a CSV string
    pub fn to_csv(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        into_utf8(buf)
    }
}

fn into_utf8(buf: Vec<u8>) -> Result<String> {
    String::from_utf8(buf).map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}
