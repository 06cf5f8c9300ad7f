// Path and File Name : /home/decepticloud/core/deception/src/errors.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Error taxonomy for the deception environment - runtime, deployment, signal source and fail-closed configuration failures

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeceptionError {
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Registry validation failed: {0}")]
    RegistryValidationFailed(String),

    #[error("Runtime unreachable: {0}")]
    RuntimeUnreachable(String),

    #[error("Runtime rejected operation: {0}")]
    RuntimeRejected(String),

    #[error("Deployment timed out: {0}")]
    DeploymentTimeout(String),

    #[error("Deployment failed: {0}")]
    DeploymentFailed(String),

    #[error("Inconsistent deployment: {0}")]
    InconsistentDeployment(String),

    #[error("Signal source unavailable: {0}")]
    SignalSourceUnavailable(String),

    #[error("Invalid action index: {0}")]
    InvalidAction(usize),

    #[error("Teardown failed: {0}")]
    TeardownFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
