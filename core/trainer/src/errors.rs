// Path and File Name : /home/decepticloud/core/trainer/src/errors.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Error types for the trainer - configuration, checkpoint integrity, numerical failures and wrapped environment errors

use thiserror::Error;

use decepticloud_deception::DeceptionError;

#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Numerical failure: {0}")]
    NumericalFailure(String),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("Environment error: {0}")]
    Environment(#[from] DeceptionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl TrainerError {
    /// Non-finite values reached the network; its parameters must not be persisted.
    pub fn is_numerical(&self) -> bool {
        matches!(self, TrainerError::NumericalFailure(_))
    }
}
