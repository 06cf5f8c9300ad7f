// Path and File Name : /home/decepticloud/core/trainer/src/agent.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: DQN agent - epsilon-greedy action selection, experience replay, guarded gradient steps, periodic hard target sync, checkpoint snapshot/restore

use std::path::Path;
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, debug};

use decepticloud_deception::{Action, State};

use crate::config::AgentConfig;
use crate::errors::TrainerError;
use crate::network::{train_step, AdamOptimizer, QNetwork};
use crate::replay::{ReplayBuffer, Transition};
use crate::store::{self, AgentSnapshot};

pub struct DqnAgent {
    config: AgentConfig,
    state_size: usize,
    action_count: usize,
    value: QNetwork,
    target: QNetwork,
    optimizer: AdamOptimizer,
    memory: ReplayBuffer,
    epsilon: f64,
    gradient_steps: u64,
    episodes: u64,
    rng: StdRng,
}

impl DqnAgent {
    pub fn new(state_size: usize, action_count: usize, config: AgentConfig) -> Result<Self, TrainerError> {
        config.validate()?;
        if action_count == 0 || action_count > Action::ALL.len() {
            return Err(TrainerError::ConfigurationError(format!(
                "FAIL-CLOSED: action count {} not supported",
                action_count
            )));
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let sizes = [state_size, config.hidden_size, config.hidden_size, action_count];
        let value = QNetwork::new(&sizes, &mut rng)?;
        let target = value.clone();
        let optimizer = AdamOptimizer::new(&value, config.learning_rate);

        info!(
            "DQN agent initialized: layout={:?} gamma={} lr={} memory={} batch={} sync_interval={}",
            sizes, config.gamma, config.learning_rate, config.memory_size, config.batch_size, config.sync_interval
        );

        Ok(Self {
            memory: ReplayBuffer::new(config.memory_size),
            epsilon: config.epsilon_start,
            config,
            state_size,
            action_count,
            value,
            target,
            optimizer,
            gradient_steps: 0,
            episodes: 0,
            rng,
        })
    }

    pub fn state_size(&self) -> usize {
        self.state_size
    }

    pub fn action_count(&self) -> usize {
        self.action_count
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn gradient_steps(&self) -> u64 {
        self.gradient_steps
    }

    pub fn episodes(&self) -> u64 {
        self.episodes
    }

    pub fn memory(&self) -> &ReplayBuffer {
        &self.memory
    }

    pub fn value_network(&self) -> &QNetwork {
        &self.value
    }

    pub fn target_network(&self) -> &QNetwork {
        &self.target
    }

    pub fn q_values(&self, state: &State) -> Vec<f64> {
        let input = state.to_vector();
        self.value.forward(ArrayView1::from(&input[..])).to_vec()
    }

    /// Argmax of the value network; ties go to the lowest index.
    pub fn greedy_action(&self, state: &State) -> Result<Action, TrainerError> {
        let q = self.q_values(state);
        let mut best = 0;
        for (i, value) in q.iter().enumerate().skip(1) {
            if *value > q[best] {
                best = i;
            }
        }
        Ok(Action::from_index(best)?)
    }

    /// Epsilon-greedy selection.
    pub fn act(&mut self, state: &State) -> Result<Action, TrainerError> {
        if self.rng.gen::<f64>() < self.epsilon {
            let index = self.rng.gen_range(0..self.action_count);
            return Ok(Action::from_index(index)?);
        }
        self.greedy_action(state)
    }

    pub fn remember(&mut self, transition: Transition) {
        self.memory.push(transition);
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    /// One gradient step on a sampled batch. `Ok(None)` when the buffer holds
    /// fewer than `batch_size` transitions; parameters are then untouched.
    pub fn replay(&mut self, batch_size: usize) -> Result<Option<f64>, TrainerError> {
        if batch_size == 0 {
            return Err(TrainerError::ConfigurationError(
                "FAIL-CLOSED: replay batch size must be >= 1".to_string(),
            ));
        }
        let batch = match self.memory.sample(&mut self.rng, batch_size) {
            Some(batch) => batch,
            None => return Ok(None),
        };

        let mut inputs = Array2::<f64>::zeros((batch.len(), self.state_size));
        let mut actions = Vec::with_capacity(batch.len());
        let mut targets = Vec::with_capacity(batch.len());

        for (row, transition) in batch.iter().enumerate() {
            let state = transition.state.to_vector();
            inputs.row_mut(row).assign(&ArrayView1::from(&state[..]));
            actions.push(transition.action.index());

            let target = if transition.terminal {
                transition.reward
            } else {
                let next = transition.next_state.to_vector();
                let next_q = self.target.forward(ArrayView1::from(&next[..]));
                let max_next = next_q.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                transition.reward + self.config.gamma * max_next
            };
            targets.push(target);
        }

        let loss = train_step(&mut self.value, &mut self.optimizer, &inputs, &actions, &targets)?;
        self.gradient_steps += 1;

        if self.gradient_steps % self.config.sync_interval == 0 {
            self.sync_target();
        }
        debug!("Replay step {}: loss={:.6}", self.gradient_steps, loss);
        Ok(Some(loss))
    }

    /// Full copy of the value network into the target network.
    pub fn sync_target(&mut self) {
        self.target.copy_from(&self.value);
        debug!("Target network synchronized at gradient step {}", self.gradient_steps);
    }

    /// Per-episode epsilon decay, floored at `epsilon_min`. Never increases epsilon.
    pub fn end_episode(&mut self) {
        if self.epsilon > self.config.epsilon_min {
            self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
        }
        self.episodes += 1;
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            state_size: self.state_size,
            action_count: self.action_count,
            value: self.value.clone(),
            target: self.target.clone(),
            optimizer: self.optimizer.clone(),
            epsilon: self.epsilon,
            gradient_steps: self.gradient_steps,
            episodes: self.episodes,
        }
    }

    /// Replace learned state with `snapshot`. FAIL-CLOSED on any dimension mismatch.
    pub fn restore(&mut self, snapshot: AgentSnapshot) -> Result<(), TrainerError> {
        let expected = self.value.sizes();
        if snapshot.state_size != self.state_size || snapshot.action_count != self.action_count {
            return Err(TrainerError::ConfigurationError(format!(
                "FAIL-CLOSED: checkpoint dimensions {}x{} do not match agent {}x{}",
                snapshot.state_size, snapshot.action_count, self.state_size, self.action_count
            )));
        }
        for (name, network) in [("value", &snapshot.value), ("target", &snapshot.target)] {
            network.validate()?;
            if network.sizes() != expected {
                return Err(TrainerError::ConfigurationError(format!(
                    "FAIL-CLOSED: checkpoint {} network layout {:?} does not match {:?}",
                    name,
                    network.sizes(),
                    expected
                )));
            }
        }
        if !snapshot.optimizer.matches(&snapshot.value) {
            return Err(TrainerError::ConfigurationError(
                "FAIL-CLOSED: checkpoint optimizer state does not match network".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&snapshot.epsilon) {
            return Err(TrainerError::ConfigurationError(format!(
                "FAIL-CLOSED: checkpoint epsilon {} out of range",
                snapshot.epsilon
            )));
        }

        self.value = snapshot.value;
        self.target = snapshot.target;
        self.optimizer = snapshot.optimizer;
        self.epsilon = snapshot.epsilon;
        self.gradient_steps = snapshot.gradient_steps;
        self.episodes = snapshot.episodes;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<String, TrainerError> {
        store::save_checkpoint(path, &self.snapshot())
    }

    pub fn load(&mut self, path: &Path) -> Result<(), TrainerError> {
        let snapshot = store::load_checkpoint(path)?;
        self.restore(snapshot)?;
        info!(
            "Resumed agent from {}: epsilon={:.4} gradient_steps={} episodes={}",
            path.display(),
            self.epsilon,
            self.gradient_steps,
            self.episodes
        );
        Ok(())
    }
}
