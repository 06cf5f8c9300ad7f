// Path and File Name : /home/decepticloud/core/deception/src/config.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Environment-driven configuration for the honeynet environment - timestep pacing, runtime/poll timeouts, reset retry policy (fail-closed on invalid values)

use std::time::Duration;

use crate::errors::DeceptionError;

/// Deployment target identifier meaning "no remote effects".
pub const DRY_RUN_TARGET: &str = "dry-run";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentConfig {
    /// `dry-run` or a Docker Engine URL.
    pub target: String,
    /// Wait between deploying and polling signals.
    pub step_settle: Duration,
    pub poll_timeout: Duration,
    pub deploy_timeout: Duration,
    pub reset_retries: u32,
    pub reset_backoff: Duration,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            target: DRY_RUN_TARGET.to_string(),
            step_settle: Duration::from_millis(5000),
            poll_timeout: Duration::from_millis(2000),
            deploy_timeout: Duration::from_millis(60_000),
            reset_retries: 3,
            reset_backoff: Duration::from_millis(2000),
        }
    }
}

impl EnvironmentConfig {
    pub fn from_env() -> Result<Self, DeceptionError> {
        let defaults = Self::default();

        let target = std::env::var("DECEPTICLOUD_TARGET")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.target);

        let step_settle = env_millis("DECEPTICLOUD_STEP_SETTLE_MS", defaults.step_settle)?;

        let poll_timeout = env_millis("DECEPTICLOUD_POLL_TIMEOUT_MS", defaults.poll_timeout)?;
        if poll_timeout.is_zero() {
            return Err(DeceptionError::ConfigurationError(
                "FAIL-CLOSED: DECEPTICLOUD_POLL_TIMEOUT_MS must be > 0".to_string(),
            ));
        }

        let deploy_timeout = env_millis("DECEPTICLOUD_DEPLOY_TIMEOUT_MS", defaults.deploy_timeout)?;
        if deploy_timeout.is_zero() {
            return Err(DeceptionError::ConfigurationError(
                "FAIL-CLOSED: DECEPTICLOUD_DEPLOY_TIMEOUT_MS must be > 0".to_string(),
            ));
        }

        let reset_retries = env_u64("DECEPTICLOUD_RESET_RETRIES", u64::from(defaults.reset_retries))?;
        if reset_retries == 0 || reset_retries > u64::from(u32::MAX) {
            return Err(DeceptionError::ConfigurationError(
                "FAIL-CLOSED: DECEPTICLOUD_RESET_RETRIES must be >= 1".to_string(),
            ));
        }

        let reset_backoff = env_millis("DECEPTICLOUD_RESET_BACKOFF_MS", defaults.reset_backoff)?;

        Ok(Self {
            target,
            step_settle,
            poll_timeout,
            deploy_timeout,
            reset_retries: reset_retries as u32,
            reset_backoff,
        })
    }

    pub fn is_dry_run(&self) -> bool {
        self.target == DRY_RUN_TARGET
    }
}

pub fn env_u64(name: &str, default: u64) -> Result<u64, DeceptionError> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse::<u64>().map_err(|e| {
            DeceptionError::ConfigurationError(format!("FAIL-CLOSED: invalid {} '{}': {}", name, raw, e))
        }),
        Err(_) => Ok(default),
    }
}

fn env_millis(name: &str, default: Duration) -> Result<Duration, DeceptionError> {
    env_u64(name, default.as_millis() as u64).map(Duration::from_millis)
}
