// Path and File Name : /home/decepticloud/core/deception/src/deployer.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Idempotent deception asset deployment - query before acting, bounded runtime calls, re-query after acting so the recorded active asset reflects reality

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use parking_lot::RwLock;
use chrono::{DateTime, Utc};
use tracing::{error, warn, info, debug};

use crate::asset::{ActiveAsset, AssetKind};
use crate::errors::DeceptionError;
use crate::registry::HoneypotRegistry;
use crate::runtime::AssetRuntime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentStatus {
    /// Active asset confirmed by the runtime on the last call.
    Verified,
    /// Runtime could not be queried; `active` is the last verified value.
    Unverified,
    /// Both assets observed running.
    Inconsistent,
}

#[derive(Debug, Clone)]
pub struct DeploymentState {
    pub active: ActiveAsset,
    pub status: DeploymentStatus,
    pub changed_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl DeploymentState {
    fn initial() -> Self {
        Self {
            active: ActiveAsset::None,
            status: DeploymentStatus::Unverified,
            changed_at: Utc::now(),
            verified_at: None,
            last_error: None,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.status == DeploymentStatus::Verified
    }
}

/// Observed running flags of both assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Observation {
    ssh: bool,
    web: bool,
}

impl Observation {
    fn running(&self, kind: AssetKind) -> bool {
        match kind {
            AssetKind::Ssh => self.ssh,
            AssetKind::Web => self.web,
        }
    }

    /// Collapse onto a single selection. Both running resolves to `preferred`
    /// when it is one of them, SSH otherwise.
    fn resolve(&self, preferred: ActiveAsset) -> (ActiveAsset, bool) {
        match (self.ssh, self.web) {
            (false, false) => (ActiveAsset::None, true),
            (true, false) => (ActiveAsset::Ssh, true),
            (false, true) => (ActiveAsset::Web, true),
            (true, true) => {
                if preferred == ActiveAsset::Web {
                    (ActiveAsset::Web, false)
                } else {
                    (ActiveAsset::Ssh, false)
                }
            }
        }
    }
}

pub struct DeploymentController {
    runtime: Arc<dyn AssetRuntime>,
    registry: Arc<HoneypotRegistry>,
    operation_timeout: Duration,
    state: RwLock<DeploymentState>,
}

impl DeploymentController {
    pub fn new(
        runtime: Arc<dyn AssetRuntime>,
        registry: Arc<HoneypotRegistry>,
        operation_timeout: Duration,
    ) -> Self {
        Self {
            runtime,
            registry,
            operation_timeout,
            state: RwLock::new(DeploymentState::initial()),
        }
    }

    /// Controller's view of the running asset.
    pub fn current(&self) -> ActiveAsset {
        self.state.read().active
    }

    pub fn state(&self) -> DeploymentState {
        self.state.read().clone()
    }

    pub fn runtime_description(&self) -> String {
        self.runtime.describe()
    }

    /// Bring the runtime to `target`.
    ///
    /// Only assets not already in the desired state are touched; stops are issued
    /// before starts. The runtime is re-queried afterwards whatever happened, so
    /// `current()` reflects the runtime, not the request.
    pub async fn set_active(&self, target: ActiveAsset) -> Result<(), DeceptionError> {
        debug!("Deployment requested: {} (currently {})", target, self.current());

        let mut failure: Option<DeceptionError> = None;

        match self.observe().await {
            Ok(observed) => {
                for kind in AssetKind::ALL {
                    if observed.running(kind) && !target.wants(kind) {
                        let asset_id = self.registry.asset_id(kind);
                        info!("Stopping {} honeypot: {}", kind, asset_id);
                        if let Err(e) = self.bounded("stop", asset_id, self.runtime.stop(asset_id)).await {
                            error!("Failed to stop {}: {}", asset_id, e);
                            failure.get_or_insert(e);
                        }
                    }
                }
                for kind in AssetKind::ALL {
                    if !observed.running(kind) && target.wants(kind) {
                        let asset_id = self.registry.asset_id(kind);
                        info!("Starting {} honeypot: {}", kind, asset_id);
                        if let Err(e) = self.bounded("start", asset_id, self.runtime.start(asset_id)).await {
                            error!("Failed to start {}: {}", asset_id, e);
                            failure.get_or_insert(e);
                        }
                    }
                }
            }
            Err(e) => {
                warn!("Cannot observe deployment before acting: {}", e);
                failure = Some(e);
            }
        }

        let verified = self.refresh(target).await;

        if let Some(e) = failure {
            self.state.write().last_error = Some(e.to_string());
            return Err(e);
        }

        let active = verified?;
        if active != target {
            let e = DeceptionError::DeploymentFailed(format!(
                "runtime reports '{}' after requesting '{}'",
                active, target
            ));
            self.state.write().last_error = Some(e.to_string());
            return Err(e);
        }

        self.state.write().last_error = None;
        Ok(())
    }

    /// Stop every asset.
    pub async fn deactivate_all(&self) -> Result<(), DeceptionError> {
        self.set_active(ActiveAsset::None).await
    }

    /// Re-query the runtime and record the result.
    pub async fn refresh(&self, preferred: ActiveAsset) -> Result<ActiveAsset, DeceptionError> {
        let observed = match self.observe().await {
            Ok(observed) => observed,
            Err(e) => {
                let mut state = self.state.write();
                warn!(
                    "Deployment state unverified (keeping last known '{}'): {}",
                    state.active, e
                );
                state.status = DeploymentStatus::Unverified;
                state.last_error = Some(e.to_string());
                return Err(e);
            }
        };

        let (active, consistent) = observed.resolve(preferred);
        let now = Utc::now();
        {
            let mut state = self.state.write();
            if state.active != active {
                info!("Active deception asset: {} -> {}", state.active, active);
                state.changed_at = now;
            }
            state.active = active;
            state.verified_at = Some(now);
            state.status = if consistent {
                DeploymentStatus::Verified
            } else {
                DeploymentStatus::Inconsistent
            };
        }

        if !consistent {
            error!("Both honeypots observed running; recording '{}'", active);
            return Err(DeceptionError::InconsistentDeployment(
                "ssh and web honeypots are both running".to_string(),
            ));
        }
        Ok(active)
    }

    async fn observe(&self) -> Result<Observation, DeceptionError> {
        let ssh_id = self.registry.asset_id(AssetKind::Ssh);
        let web_id = self.registry.asset_id(AssetKind::Web);
        let ssh = self.bounded("inspect", ssh_id, self.runtime.is_active(ssh_id)).await?;
        let web = self.bounded("inspect", web_id, self.runtime.is_active(web_id)).await?;
        Ok(Observation { ssh, web })
    }

    async fn bounded<T, F>(&self, operation: &str, asset_id: &str, call: F) -> Result<T, DeceptionError>
    where
        F: Future<Output = Result<T, DeceptionError>>,
    {
        match tokio::time::timeout(self.operation_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(DeceptionError::DeploymentTimeout(format!(
                "{} {} exceeded {:?}",
                operation, asset_id, self.operation_timeout
            ))),
        }
    }
}
