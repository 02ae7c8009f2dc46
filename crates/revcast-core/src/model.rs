//! Holt-Winters triple exponential smoothing (additive trend and season)
//!
//! # Recurrences
//!
//! ```text
//! Prediction: ŷ_t = L + T + S[t mod m]
//! Level:      L'  = α (y_t - S[t mod m]) + (1 - α)(L + T)
//! Trend:      T'  = β (L' - L) + (1 - β) T
//! Season:     S[t mod m] = γ (y_t - L') + (1 - γ) S[t mod m]
//! Forecast:   F_{n+k} = L + k T + S[(n + k - 1) mod m]
//! ```
//!
//! α, β, γ and the initial level, trend and seasonal indices are estimated
//! together by minimising the in-sample one-step-ahead squared error with a
//! bounded Nelder-Mead search. The search runs on the standardised series so
//! its tolerance does not depend on the revenue scale.

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::SmoothingParams;
use crate::optimize::{nelder_mead, OptimizerConfig};

/// Starting smoothing coefficients for the search (α, β, γ)
const START_SMOOTHING: [f64; 3] = [0.3, 0.1, 0.1];
/// Initial simplex step in standardised units
const SIMPLEX_STEP: f64 = 0.1;

/// Unfitted additive Holt-Winters model
#[derive(Debug, Clone)]
pub struct HoltWinters {
    period: usize,
    optimizer: OptimizerConfig,
}

impl HoltWinters {
    /// Create a model for the given seasonal period (must be ≥ 2)
    pub fn new(period: usize) -> Result<Self> {
        if period < 2 {
            return Err(Error::ModelFit(format!(
                "seasonal period must be at least 2 (got {})",
                period
            )));
        }
        Ok(Self {
            period,
            optimizer: OptimizerConfig::default(),
        })
    }

    pub fn with_optimizer(mut self, optimizer: OptimizerConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Estimate parameters and smoothing state from the training values.
    ///
    /// Consumes the model: a fitted model cannot be refit.
    pub fn fit(self, train: &[f64]) -> Result<FittedModel> {
        let m = self.period;
        let n = train.len();

        if n < m {
            return Err(Error::ModelFit(format!(
                "training series has {} points, fewer than one seasonal period ({})",
                n, m
            )));
        }
        if train.iter().any(|v| !v.is_finite()) {
            return Err(Error::ModelFit(
                "training series contains non-finite values".into(),
            ));
        }
        if n < 2 * m {
            debug!(
                n,
                period = m,
                "Training series shorter than two seasonal periods, seasonal estimate may be unstable"
            );
        }

        let mean = train.iter().sum::<f64>() / n as f64;
        let std = (train.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64).sqrt();
        if std <= 1e-12 * mean.abs().max(1.0) {
            return Err(Error::ModelFit(
                "training series is constant, trend and season cannot be estimated".into(),
            ));
        }
        let z: Vec<f64> = train.iter().map(|v| (v - mean) / std).collect();

        // Parameter vector: [α, β, γ, level, trend, season_0 .. season_{m-1}]
        let (level0, trend0, season0) = initial_state(&z, m);
        let mut start = Vec::with_capacity(5 + m);
        start.extend_from_slice(&START_SMOOTHING);
        start.push(level0);
        start.push(trend0);
        start.extend_from_slice(&season0);

        let steps = vec![SIMPLEX_STEP; start.len()];
        let mut bounds = vec![(f64::NEG_INFINITY, f64::INFINITY); start.len()];
        for b in bounds.iter_mut().take(3) {
            *b = (0.0, 1.0);
        }

        let result = nelder_mead(
            |p| run_recurrence(&z, p, m).sse / n as f64,
            &start,
            &steps,
            Some(&bounds),
            &self.optimizer,
        );

        if !result.value.is_finite() {
            return Err(Error::ModelFit(
                "objective is not finite at the best parameters".into(),
            ));
        }
        if !result.converged {
            return Err(Error::ModelFit(format!(
                "parameter search did not converge within {} iterations",
                self.optimizer.max_iterations
            )));
        }

        let state = run_recurrence(&z, &result.point, m);
        let params = SmoothingParams {
            alpha: result.point[0],
            beta: result.point[1],
            gamma: result.point[2],
        };

        debug!(
            alpha = params.alpha,
            beta = params.beta,
            gamma = params.gamma,
            iterations = result.iterations,
            "Fitted Holt-Winters model"
        );

        Ok(FittedModel {
            params,
            level: mean + std * state.level,
            trend: std * state.trend,
            seasonal: state.seasonal.iter().map(|s| std * s).collect(),
            n_obs: n,
            sse: state.sse * std * std,
            iterations: result.iterations,
        })
    }
}

/// Smoothing state after fitting
#[derive(Debug, Clone, Serialize)]
pub struct FittedModel {
    params: SmoothingParams,
    level: f64,
    trend: f64,
    /// Seasonal index per phase (`t mod m`)
    seasonal: Vec<f64>,
    n_obs: usize,
    sse: f64,
    iterations: usize,
}

impl FittedModel {
    pub fn params(&self) -> SmoothingParams {
        self.params
    }

    /// Level after the last training observation
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Trend after the last training observation
    pub fn trend(&self) -> f64 {
        self.trend
    }

    pub fn seasonal(&self) -> &[f64] {
        &self.seasonal
    }

    pub fn period(&self) -> usize {
        self.seasonal.len()
    }

    /// Number of training observations
    pub fn n_obs(&self) -> usize {
        self.n_obs
    }

    /// In-sample sum of squared one-step-ahead errors, in revenue units squared
    pub fn sse(&self) -> f64 {
        self.sse
    }

    /// Simplex iterations used by the parameter search
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Point forecasts for the `horizon` steps after the training data
    pub fn forecast(&self, horizon: usize) -> Vec<f64> {
        let m = self.period();
        (1..=horizon)
            .map(|k| self.level + k as f64 * self.trend + self.seasonal[(self.n_obs + k - 1) % m])
            .collect()
    }
}

/// Fit on `train` and forecast `horizon` steps in one call
pub fn fit_and_forecast(
    train: &[f64],
    horizon: usize,
    period: usize,
    optimizer: &OptimizerConfig,
) -> Result<Vec<f64>> {
    let fitted = HoltWinters::new(period)?
        .with_optimizer(*optimizer)
        .fit(train)?;
    Ok(fitted.forecast(horizon))
}

/// State after running the recurrences over a series
struct RecurrenceState {
    level: f64,
    trend: f64,
    seasonal: Vec<f64>,
    sse: f64,
}

/// Run the additive recurrences with parameter vector `p`
/// (`[α, β, γ, level, trend, season_0 .. season_{m-1}]`)
fn run_recurrence(values: &[f64], p: &[f64], m: usize) -> RecurrenceState {
    let (alpha, beta, gamma) = (p[0], p[1], p[2]);
    let mut level = p[3];
    let mut trend = p[4];
    let mut seasonal = p[5..5 + m].to_vec();
    let mut sse = 0.0;

    for (t, &y) in values.iter().enumerate() {
        let phase = t % m;
        let s = seasonal[phase];

        let error = y - (level + trend + s);
        sse += error * error;

        let level_prev = level;
        level = alpha * (y - s) + (1.0 - alpha) * (level_prev + trend);
        trend = beta * (level - level_prev) + (1.0 - beta) * trend;
        seasonal[phase] = gamma * (y - level) + (1.0 - gamma) * s;
    }

    RecurrenceState {
        level,
        trend,
        seasonal,
        sse,
    }
}

/// Heuristic starting state for the search.
///
/// The trend is the mean per-step change between the first two seasons
/// (or across the whole series when it is shorter than two seasons). The
/// level is the first-season mean projected back to just before the first
/// observation, and the seasonal indices are the first-season deviations
/// from that line, centred to sum to zero.
fn initial_state(values: &[f64], m: usize) -> (f64, f64, Vec<f64>) {
    let n = values.len();
    let first_mean = values[..m].iter().sum::<f64>() / m as f64;

    let trend = if n >= 2 * m {
        (0..m)
            .map(|i| (values[m + i] - values[i]) / m as f64)
            .sum::<f64>()
            / m as f64
    } else if n > 1 {
        (values[n - 1] - values[0]) / (n - 1) as f64
    } else {
        0.0
    };

    let level = first_mean - trend * (m as f64 + 1.0) / 2.0;

    let mut seasonal: Vec<f64> = (0..m)
        .map(|i| values[i] - (level + trend * (i as f64 + 1.0)))
        .collect();
    let offset = seasonal.iter().sum::<f64>() / m as f64;
    for s in seasonal.iter_mut() {
        *s -= offset;
    }

    (level, trend, seasonal)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 100 + 10t with a +5 bump on every 8th month
    fn trend_with_bump(n: usize) -> Vec<f64> {
        (0..n)
            .map(|t| 100.0 + 10.0 * t as f64 + if t % 8 == 7 { 5.0 } else { 0.0 })
            .collect()
    }

    /// Trend + period-4 pattern + deterministic wobble
    fn noisy_seasonal(n: usize) -> Vec<f64> {
        let pattern = [10.0, -5.0, -5.0, 0.0];
        (0..n)
            .map(|t| 200.0 + 2.0 * t as f64 + pattern[t % 4] + 1.5 * (t as f64 * 1.7).sin())
            .collect()
    }

    #[test]
    fn test_tracks_trend_and_bump() {
        let data = trend_with_bump(24);
        let (train, test) = data.split_at(18);

        let fitted = HoltWinters::new(8).unwrap().fit(train).unwrap();
        assert!(
            (fitted.trend() - 10.0).abs() < 0.5,
            "trend = {}",
            fitted.trend()
        );

        let forecast = fitted.forecast(test.len());
        assert_eq!(forecast.len(), 6);
        for (f, a) in forecast.iter().zip(test) {
            assert!((f - a).abs() < 1.0, "forecast {} vs actual {}", f, a);
        }
    }

    #[test]
    fn test_seasonal_phase_alignment() {
        // Period-4 pattern, exact data: the forecast must place the +10 peak
        // on the right future month
        let pattern = [10.0, -5.0, -5.0, 0.0];
        let data: Vec<f64> = (0..24)
            .map(|t| 100.0 + 2.0 * t as f64 + pattern[t % 4])
            .collect();
        let (train, test) = data.split_at(18);

        let forecast = HoltWinters::new(4)
            .unwrap()
            .fit(train)
            .unwrap()
            .forecast(test.len());

        for (f, a) in forecast.iter().zip(test) {
            assert!((f - a).abs() < 0.5, "forecast {} vs actual {}", f, a);
        }
    }

    #[test]
    fn test_noisy_series_fits() {
        let data = noisy_seasonal(36);
        let fitted = HoltWinters::new(4).unwrap().fit(&data[..30]).unwrap();

        let params = fitted.params();
        for v in [params.alpha, params.beta, params.gamma] {
            assert!((0.0..=1.0).contains(&v), "param out of range: {}", v);
        }
        assert!(fitted.sse().is_finite());

        let forecast = fitted.forecast(6);
        for (f, a) in forecast.iter().zip(&data[30..]) {
            assert!((f - a).abs() < 10.0, "forecast {} vs actual {}", f, a);
        }
    }

    #[test]
    fn test_forecast_length_matches_horizon() {
        let fitted = HoltWinters::new(4).unwrap().fit(&noisy_seasonal(20)).unwrap();
        for h in 0..=12 {
            assert_eq!(fitted.forecast(h).len(), h);
        }
    }

    #[test]
    fn test_fit_is_deterministic() {
        let data = noisy_seasonal(30);
        let a = HoltWinters::new(4).unwrap().fit(&data).unwrap();
        let b = HoltWinters::new(4).unwrap().fit(&data).unwrap();
        assert_eq!(a.params(), b.params());
        assert_eq!(a.forecast(5), b.forecast(5));
    }

    #[test]
    fn test_scale_invariance() {
        let data = noisy_seasonal(30);
        let scaled: Vec<f64> = data.iter().map(|v| v * 1000.0).collect();

        let small = HoltWinters::new(4).unwrap().fit(&data).unwrap().forecast(4);
        let large = HoltWinters::new(4).unwrap().fit(&scaled).unwrap().forecast(4);
        for (s, l) in small.iter().zip(&large) {
            assert!((s * 1000.0 - l).abs() < 1e-3 * l.abs(), "{} vs {}", s, l);
        }
    }

    #[test]
    fn test_short_series_between_one_and_two_periods() {
        let data = trend_with_bump(12);
        let fitted = HoltWinters::new(8).unwrap().fit(&data).unwrap();
        assert!(fitted.forecast(3).iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_too_short_for_period() {
        let err = HoltWinters::new(8).unwrap().fit(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, Error::ModelFit(_)));
    }

    #[test]
    fn test_constant_series_rejected() {
        let err = HoltWinters::new(4).unwrap().fit(&[50.0; 16]).unwrap_err();
        assert!(matches!(err, Error::ModelFit(_)));
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut data = noisy_seasonal(16);
        data[3] = f64::NAN;
        assert!(matches!(
            HoltWinters::new(4).unwrap().fit(&data),
            Err(Error::ModelFit(_))
        ));
    }

    #[test]
    fn test_invalid_period() {
        assert!(matches!(HoltWinters::new(1), Err(Error::ModelFit(_))));
        assert!(HoltWinters::new(2).is_ok());
    }

    #[test]
    fn test_iteration_cap_surfaces_as_fit_error() {
        let optimizer = OptimizerConfig {
            max_iterations: 1,
            tolerance: 1e-300,
        };
        let err = HoltWinters::new(4)
            .unwrap()
            .with_optimizer(optimizer)
            .fit(&noisy_seasonal(24))
            .unwrap_err();
        assert!(err.to_string().contains("did not converge"), "{}", err);
    }

    #[test]
    fn test_fit_and_forecast() {
        let data = trend_with_bump(24);
        let forecast = fit_and_forecast(&data[..16], 8, 8, &OptimizerConfig::default()).unwrap();
        assert_eq!(forecast.len(), 8);
        for (f, a) in forecast.iter().zip(&data[16..]) {
            assert!((f - a).abs() < 1.0, "forecast {} vs actual {}", f, a);
        }
    }

    #[test]
    fn test_initial_state_exact_for_linear_seasonal() {
        let data = trend_with_bump(16);
        let (level, trend, seasonal) = initial_state(&data, 8);
        assert!((trend - 10.0).abs() < 1e-9);
        let p: Vec<f64> = [0.5, 0.5, 0.5, level, trend]
            .into_iter()
            .chain(seasonal)
            .collect();
        assert!(run_recurrence(&data, &p, 8).sse < 1e-9);
    }
}
