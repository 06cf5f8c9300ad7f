// Path and File Name : /home/decepticloud/core/trainer/src/policy.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Decision policies driven by the training loop - the learning DQN agent and a fixed-action baseline

use decepticloud_deception::{Action, State, ACTION_COUNT, STATE_SIZE};

use crate::agent::DqnAgent;
use crate::errors::TrainerError;
use crate::replay::Transition;

pub trait Policy: Send {
    fn name(&self) -> String;

    fn state_size(&self) -> usize;

    fn action_count(&self) -> usize;

    fn act(&mut self, state: &State) -> Result<Action, TrainerError>;

    /// Record a transition and learn from it. Returns the training loss when an update ran.
    fn observe(&mut self, transition: Transition) -> Result<Option<f64>, TrainerError>;

    fn end_episode(&mut self);

    fn epsilon(&self) -> f64;
}

impl Policy for DqnAgent {
    fn name(&self) -> String {
        "dqn".to_string()
    }

    fn state_size(&self) -> usize {
        DqnAgent::state_size(self)
    }

    fn action_count(&self) -> usize {
        DqnAgent::action_count(self)
    }

    fn act(&mut self, state: &State) -> Result<Action, TrainerError> {
        DqnAgent::act(self, state)
    }

    fn observe(&mut self, transition: Transition) -> Result<Option<f64>, TrainerError> {
        self.remember(transition);
        let batch_size = self.batch_size();
        self.replay(batch_size)
    }

    fn end_episode(&mut self) {
        DqnAgent::end_episode(self)
    }

    fn epsilon(&self) -> f64 {
        DqnAgent::epsilon(self)
    }
}

/// Always takes the same action. Baseline for comparison runs.
#[derive(Debug, Clone, Copy)]
pub struct StaticPolicy {
    action: Action,
}

impl StaticPolicy {
    pub fn new(action: Action) -> Self {
        Self { action }
    }
}

impl Policy for StaticPolicy {
    fn name(&self) -> String {
        format!("static:{}", self.action)
    }

    fn state_size(&self) -> usize {
        STATE_SIZE
    }

    fn action_count(&self) -> usize {
        ACTION_COUNT
    }

    fn act(&mut self, _state: &State) -> Result<Action, TrainerError> {
        Ok(self.action)
    }

    fn observe(&mut self, _transition: Transition) -> Result<Option<f64>, TrainerError> {
        Ok(None)
    }

    fn end_episode(&mut self) {}

    fn epsilon(&self) -> f64 {
        0.0
    }
}
