//! Error types for revcast

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Data load error: {0}")]
    DataLoad(String),

    #[error("Invalid horizon: n_test={horizon} must satisfy 1 <= n_test < {len} (series length)")]
    InvalidHorizon { horizon: usize, len: usize },

    #[error("Model fit error: {0}")]
    ModelFit(String),

    #[error("Undefined metric: {0}")]
    UndefinedMetric(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
