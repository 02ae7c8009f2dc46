//! Forecast accuracy metrics

use serde::Serialize;

use crate::error::{Error, Result};

/// Error statistics for one (actual, forecast) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Accuracy {
    /// Mean absolute error, in revenue units
    pub mae: f64,
    /// Mean absolute percentage error over non-zero actuals; `None` when
    /// every actual is zero
    pub mape: Option<f64>,
    /// Root mean squared error, in revenue units
    pub rmse: f64,
    /// Number of compared points
    pub points: usize,
    /// Number of points that contributed to MAPE
    pub mape_points: usize,
}

/// Compare aligned actual and forecast values.
///
/// Zero actuals are left out of MAPE (but still count toward MAE and RMSE).
/// Fails when the inputs are empty or differ in length.
pub fn evaluate(actual: &[f64], forecast: &[f64]) -> Result<Accuracy> {
    if actual.len() != forecast.len() {
        return Err(Error::UndefinedMetric(format!(
            "actual has {} points but forecast has {}",
            actual.len(),
            forecast.len()
        )));
    }
    if actual.is_empty() {
        return Err(Error::UndefinedMetric(
            "no points to compare".into(),
        ));
    }

    let n = actual.len() as f64;
    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;
    let mut pct_sum = 0.0;
    let mut mape_points = 0usize;

    for (&a, &f) in actual.iter().zip(forecast) {
        let abs = (a - f).abs();
        abs_sum += abs;
        sq_sum += abs * abs;
        if a != 0.0 {
            pct_sum += abs / a.abs() * 100.0;
            mape_points += 1;
        }
    }

    let mape = (mape_points > 0).then(|| pct_sum / mape_points as f64);

    Ok(Accuracy {
        mae: abs_sum / n,
        mape,
        rmse: (sq_sum / n).sqrt(),
        points: actual.len(),
        mape_points,
    })
}
