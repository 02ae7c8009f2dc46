//! Train/test partitioning of a monthly series

use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{MonthlyPoint, MonthlySeries};

/// A series divided into a training prefix and a held-out suffix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSplit {
    pub train: Vec<MonthlyPoint>,
    pub test: Vec<MonthlyPoint>,
}

impl SeriesSplit {
    pub fn train_values(&self) -> Vec<f64> {
        self.train.iter().map(|p| p.revenue).collect()
    }

    pub fn test_values(&self) -> Vec<f64> {
        self.test.iter().map(|p| p.revenue).collect()
    }
}

/// Hold out the last `n_test` months.
///
/// Order is preserved on both sides; `train` followed by `test` is the
/// original series. Requires `1 <= n_test < series.len()`.
pub fn split_series(series: &MonthlySeries, n_test: usize) -> Result<SeriesSplit> {
    let len = series.len();
    if n_test == 0 || n_test >= len {
        return Err(Error::InvalidHorizon {
            horizon: n_test,
            len,
        });
    }

    let (train, test) = series.points().split_at(len - n_test);
    Ok(SeriesSplit {
        train: train.to_vec(),
        test: test.to_vec(),
    })
}
