// Path and File Name : /home/decepticloud/core/deception/src/teardown.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Teardown engine - retried deactivation of all deception assets, used as the startup preflight (fail-closed) and as the best-effort shutdown cleanup

use std::sync::Arc;
use std::time::Duration;
use chrono::{DateTime, Utc};
use tracing::{error, warn, info};

use crate::asset::ActiveAsset;
use crate::deployer::DeploymentController;
use crate::errors::DeceptionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeardownStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct TeardownResult {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub attempts: u32,
    pub status: TeardownStatus,
    pub errors: Vec<String>,
}

pub struct TeardownEngine {
    controller: Arc<DeploymentController>,
    max_attempts: u32,
    backoff: Duration,
}

impl TeardownEngine {
    pub fn new(controller: Arc<DeploymentController>, max_attempts: u32, backoff: Duration) -> Self {
        Self {
            controller,
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Stop every asset, retrying with a fixed backoff. Always returns a result record.
    pub async fn teardown_all(&self) -> TeardownResult {
        let started_at = Utc::now();
        let mut errors = Vec::new();

        for attempt in 1..=self.max_attempts {
            match self.controller.deactivate_all().await {
                Ok(()) => {
                    info!("All deception assets stopped (attempt {}/{})", attempt, self.max_attempts);
                    return TeardownResult {
                        started_at,
                        completed_at: Utc::now(),
                        attempts: attempt,
                        status: TeardownStatus::Completed,
                        errors,
                    };
                }
                Err(e) => {
                    warn!("Teardown attempt {}/{} failed: {}", attempt, self.max_attempts, e);
                    errors.push(e.to_string());
                    if attempt < self.max_attempts && !self.backoff.is_zero() {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }

        error!(
            "Teardown failed after {} attempts against {}",
            self.max_attempts,
            self.controller.runtime_description()
        );
        TeardownResult {
            started_at,
            completed_at: Utc::now(),
            attempts: self.max_attempts,
            status: TeardownStatus::Failed,
            errors,
        }
    }

    /// Startup gate: the deployment target must be reachable and end up with nothing active.
    ///
    /// FAIL-CLOSED: returns an error once all attempts are exhausted.
    pub async fn preflight(&self) -> Result<TeardownResult, DeceptionError> {
        info!("Preflight: verifying deployment target {}", self.controller.runtime_description());
        let result = self.teardown_all().await;

        if result.status != TeardownStatus::Completed || self.controller.current() != ActiveAsset::None {
            return Err(DeceptionError::TeardownFailed(format!(
                "FAIL-CLOSED: deployment target {} unreachable or not reset after {} attempts: {}",
                self.controller.runtime_description(),
                result.attempts,
                result.errors.join("; ")
            )));
        }
        Ok(result)
    }
}
