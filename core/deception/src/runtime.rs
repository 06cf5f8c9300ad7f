// Path and File Name : /home/decepticloud/core/deception/src/runtime.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Deception asset lifecycle runtime - typed Docker Engine HTTP client and an in-memory dry-run runtime that records every call

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{info, debug};

use crate::config::DRY_RUN_TARGET;
use crate::errors::DeceptionError;

/// Lifecycle contract of the honeypot runtime. Every operation is idempotent.
#[async_trait]
pub trait AssetRuntime: Send + Sync {
    async fn start(&self, asset_id: &str) -> Result<(), DeceptionError>;
    async fn stop(&self, asset_id: &str) -> Result<(), DeceptionError>;
    async fn is_active(&self, asset_id: &str) -> Result<bool, DeceptionError>;

    /// Human-readable target identifier for logs.
    fn describe(&self) -> String;
}

#[derive(Debug, Deserialize)]
struct ContainerInspect {
    #[serde(rename = "State")]
    state: ContainerState,
}

#[derive(Debug, Deserialize)]
struct ContainerState {
    #[serde(rename = "Running")]
    running: bool,
}

/// Controls honeypot containers through the Docker Engine REST API.
pub struct DockerEngineRuntime {
    client: reqwest::Client,
    base_url: String,
    stop_grace_secs: u64,
}

impl DockerEngineRuntime {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, DeceptionError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(DeceptionError::ConfigurationError(format!(
                "FAIL-CLOSED: Docker Engine endpoint must be an http(s) URL (got '{}')",
                base_url
            )));
        }

        // Engine endpoints are addressed directly, never through HTTP(S)_PROXY.
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .no_proxy()
            .build()
            .map_err(|e| DeceptionError::ConfigurationError(format!("Failed to create HTTP client: {}", e)))?;

        info!("Docker Engine runtime configured for {}", base_url);
        Ok(Self {
            client,
            base_url,
            stop_grace_secs: 10,
        })
    }

    fn container_url(&self, asset_id: &str, suffix: &str) -> String {
        format!("{}/containers/{}/{}", self.base_url, asset_id, suffix)
    }

    fn map_transport(asset_id: &str, e: reqwest::Error) -> DeceptionError {
        if e.is_connect() || e.is_timeout() {
            DeceptionError::RuntimeUnreachable(format!("{}: {}", asset_id, e))
        } else {
            DeceptionError::Http(e)
        }
    }
}

#[async_trait]
impl AssetRuntime for DockerEngineRuntime {
    async fn start(&self, asset_id: &str) -> Result<(), DeceptionError> {
        debug!("POST start for container {}", asset_id);
        let response = self
            .client
            .post(self.container_url(asset_id, "start"))
            .send()
            .await
            .map_err(|e| Self::map_transport(asset_id, e))?;

        match response.status() {
            // 304: already started
            StatusCode::NO_CONTENT | StatusCode::NOT_MODIFIED => Ok(()),
            StatusCode::NOT_FOUND => Err(DeceptionError::AssetNotFound(asset_id.to_string())),
            status => Err(DeceptionError::RuntimeRejected(format!(
                "start {} returned HTTP {}",
                asset_id, status
            ))),
        }
    }

    async fn stop(&self, asset_id: &str) -> Result<(), DeceptionError> {
        debug!("POST stop for container {}", asset_id);
        let response = self
            .client
            .post(self.container_url(asset_id, "stop"))
            .query(&[("t", self.stop_grace_secs)])
            .send()
            .await
            .map_err(|e| Self::map_transport(asset_id, e))?;

        match response.status() {
            // 304: already stopped, 404: container absent
            StatusCode::NO_CONTENT | StatusCode::NOT_MODIFIED | StatusCode::NOT_FOUND => Ok(()),
            status => Err(DeceptionError::RuntimeRejected(format!(
                "stop {} returned HTTP {}",
                asset_id, status
            ))),
        }
    }

    async fn is_active(&self, asset_id: &str) -> Result<bool, DeceptionError> {
        let response = self
            .client
            .get(self.container_url(asset_id, "json"))
            .send()
            .await
            .map_err(|e| Self::map_transport(asset_id, e))?;

        match response.status() {
            StatusCode::OK => {
                let inspect: ContainerInspect = response.json().await?;
                Ok(inspect.state.running)
            }
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(DeceptionError::RuntimeRejected(format!(
                "inspect {} returned HTTP {}",
                asset_id, status
            ))),
        }
    }

    fn describe(&self) -> String {
        format!("docker-engine:{}", self.base_url)
    }
}

/// Lifecycle operation observed by the dry-run runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    Start(String),
    Stop(String),
    IsActive(String),
}

#[derive(Debug, Default)]
struct DryRunInner {
    running: HashMap<String, bool>,
    calls: Vec<RuntimeCall>,
    failing_starts: HashSet<String>,
    failing_stops: HashSet<String>,
    unreachable: bool,
    latency: Option<Duration>,
}

/// In-memory runtime: no remote effects, every call recorded.
#[derive(Debug, Default)]
pub struct DryRunRuntime {
    inner: Mutex<DryRunInner>,
}

impl DryRunRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.inner.lock().calls.clone()
    }

    /// Start/stop calls only (status queries excluded).
    pub fn mutations(&self) -> Vec<RuntimeCall> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| !matches!(c, RuntimeCall::IsActive(_)))
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    pub fn running(&self, asset_id: &str) -> bool {
        self.inner.lock().running.get(asset_id).copied().unwrap_or(false)
    }

    /// Force an asset's state without recording a call.
    pub fn set_running(&self, asset_id: &str, running: bool) {
        self.inner.lock().running.insert(asset_id.to_string(), running);
    }

    pub fn fail_start(&self, asset_id: &str, fail: bool) {
        let mut inner = self.inner.lock();
        if fail {
            inner.failing_starts.insert(asset_id.to_string());
        } else {
            inner.failing_starts.remove(asset_id);
        }
    }

    pub fn fail_stop(&self, asset_id: &str, fail: bool) {
        let mut inner = self.inner.lock();
        if fail {
            inner.failing_stops.insert(asset_id.to_string());
        } else {
            inner.failing_stops.remove(asset_id);
        }
    }

    /// Simulate the whole target being unreachable.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.inner.lock().unreachable = unreachable;
    }

    pub fn set_latency(&self, latency: Option<Duration>) {
        self.inner.lock().latency = latency;
    }

    async fn enter(&self, call: RuntimeCall) -> Result<(), DeceptionError> {
        let latency = {
            let mut inner = self.inner.lock();
            inner.calls.push(call.clone());
            if inner.unreachable {
                return Err(DeceptionError::RuntimeUnreachable(format!("dry-run target down ({:?})", call)));
            }
            inner.latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        Ok(())
    }
}

#[async_trait]
impl AssetRuntime for DryRunRuntime {
    async fn start(&self, asset_id: &str) -> Result<(), DeceptionError> {
        self.enter(RuntimeCall::Start(asset_id.to_string())).await?;
        let mut inner = self.inner.lock();
        if inner.failing_starts.contains(asset_id) {
            return Err(DeceptionError::RuntimeRejected(format!("dry-run start of {} rejected", asset_id)));
        }
        info!("[DRY_RUN] start {}", asset_id);
        inner.running.insert(asset_id.to_string(), true);
        Ok(())
    }

    async fn stop(&self, asset_id: &str) -> Result<(), DeceptionError> {
        self.enter(RuntimeCall::Stop(asset_id.to_string())).await?;
        let mut inner = self.inner.lock();
        if inner.failing_stops.contains(asset_id) {
            return Err(DeceptionError::RuntimeRejected(format!("dry-run stop of {} rejected", asset_id)));
        }
        info!("[DRY_RUN] stop {}", asset_id);
        inner.running.insert(asset_id.to_string(), false);
        Ok(())
    }

    async fn is_active(&self, asset_id: &str) -> Result<bool, DeceptionError> {
        self.enter(RuntimeCall::IsActive(asset_id.to_string())).await?;
        Ok(self.running(asset_id))
    }

    fn describe(&self) -> String {
        "dry-run".to_string()
    }
}

/// Resolve a deployment target identifier (`dry-run` or a Docker Engine URL).
pub fn runtime_for_target(target: &str, request_timeout: Duration) -> Result<Arc<dyn AssetRuntime>, DeceptionError> {
    if target == DRY_RUN_TARGET {
        info!("Using dry-run deployment runtime (no remote effects)");
        return Ok(Arc::new(DryRunRuntime::new()));
    }
    Ok(Arc::new(DockerEngineRuntime::new(target, request_timeout)?))
}
