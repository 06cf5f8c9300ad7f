// Path and File Name : /home/decepticloud/core/deception/src/environment.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Honeynet environment - turns actions into deployments and attack signals into reward and next state; survives transient infrastructure failures

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{warn, info, debug};

use crate::asset::{Action, State, ACTION_COUNT, STATE_SIZE};
use crate::deployer::DeploymentController;
use crate::reward::compute_reward;
use crate::signals::{AttackSignals, SignalExtractor};

/// Result of one timestep. Episode termination is decided by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub next_state: State,
    pub reward: i32,
    pub signals: AttackSignals,
    /// Whether the requested deployment was confirmed by the runtime.
    pub deployment_ok: bool,
}

#[async_trait]
pub trait Environment: Send {
    fn state_size(&self) -> usize {
        STATE_SIZE
    }

    fn action_count(&self) -> usize {
        ACTION_COUNT
    }

    /// Deactivate everything and return the initial state. Never fails.
    async fn reset(&mut self) -> State;

    async fn step(&mut self, action: Action) -> StepOutcome;
}

pub struct HoneynetEnvironment {
    controller: Arc<DeploymentController>,
    signals: Box<dyn SignalExtractor>,
    step_settle: Duration,
    poll_timeout: Duration,
}

impl HoneynetEnvironment {
    pub fn new(
        controller: Arc<DeploymentController>,
        signals: Box<dyn SignalExtractor>,
        step_settle: Duration,
        poll_timeout: Duration,
    ) -> Self {
        Self {
            controller,
            signals,
            step_settle,
            poll_timeout,
        }
    }

    pub fn controller(&self) -> &Arc<DeploymentController> {
        &self.controller
    }

    /// Outer deadline for one poll: each source read is bounded by `poll_timeout`
    /// on its own, plus one slot of slack so the inner bounds always fire first.
    fn poll_budget(&self) -> Duration {
        let slots = u32::try_from(self.signals.source_count()).unwrap_or(u32::MAX - 1);
        self.poll_timeout.saturating_mul(slots.saturating_add(1))
    }

    async fn observe_signals(&mut self) -> AttackSignals {
        let budget = self.poll_budget();
        match tokio::time::timeout(budget, self.signals.poll()).await {
            Ok(Ok(signals)) => signals,
            Ok(Err(e)) => {
                warn!("Signal extractor unavailable, assuming no attack: {}", e);
                AttackSignals::none()
            }
            Err(_) => {
                warn!("Signal poll exceeded {:?}, assuming no attack", budget);
                AttackSignals::none()
            }
        }
    }
}

#[async_trait]
impl Environment for HoneynetEnvironment {
    async fn reset(&mut self) -> State {
        info!("Resetting environment (stopping all honeypots)");

        if let Err(e) = self.controller.deactivate_all().await {
            warn!("Reset could not confirm all honeypots stopped: {}", e);
        }
        if let Err(e) = self.signals.clear().await {
            warn!("Reset could not clear signal state: {}", e);
        }

        State::new(false, false, self.controller.current())
    }

    async fn step(&mut self, action: Action) -> StepOutcome {
        let deployment_ok = match self.controller.set_active(action.target()).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Deployment for action '{}' failed, continuing: {}", action, e);
                false
            }
        };

        if !self.step_settle.is_zero() {
            tokio::time::sleep(self.step_settle).await;
        }

        let signals = self.observe_signals().await;
        let active = self.controller.current();
        let reward = compute_reward(signals, active);
        let next_state = State::new(signals.ssh_attack, signals.web_attack, active);

        debug!(
            "Step: action={} next_state={} reward={} deployment_ok={}",
            action, next_state, reward, deployment_ok
        );

        StepOutcome {
            next_state,
            reward,
            signals,
            deployment_ok,
        }
    }
}
