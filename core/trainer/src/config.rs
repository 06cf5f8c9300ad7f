// Path and File Name : /home/decepticloud/core/trainer/src/config.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Agent hyperparameters and run configuration - environment-driven with fail-closed validation

use std::path::PathBuf;

use decepticloud_deception::config::env_u64;

use crate::errors::TrainerError;

/// DQN hyperparameters.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub gamma: f64,
    pub learning_rate: f64,
    pub epsilon_start: f64,
    pub epsilon_min: f64,
    pub epsilon_decay: f64,
    pub memory_size: usize,
    pub batch_size: usize,
    /// Gradient steps between target network syncs.
    pub sync_interval: u64,
    pub hidden_size: usize,
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            gamma: 0.95,
            learning_rate: 0.001,
            epsilon_start: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.995,
            memory_size: 2000,
            batch_size: 32,
            sync_interval: 100,
            hidden_size: 24,
            seed: None,
        }
    }
}

impl AgentConfig {
    pub fn from_env() -> Result<Self, TrainerError> {
        let defaults = Self::default();
        let config = Self {
            gamma: env_f64("DECEPTICLOUD_GAMMA", defaults.gamma)?,
            learning_rate: env_f64("DECEPTICLOUD_LEARNING_RATE", defaults.learning_rate)?,
            epsilon_start: env_f64("DECEPTICLOUD_EPSILON_START", defaults.epsilon_start)?,
            epsilon_min: env_f64("DECEPTICLOUD_EPSILON_MIN", defaults.epsilon_min)?,
            epsilon_decay: env_f64("DECEPTICLOUD_EPSILON_DECAY", defaults.epsilon_decay)?,
            memory_size: env_usize("DECEPTICLOUD_MEMORY_SIZE", defaults.memory_size)?,
            batch_size: env_usize("DECEPTICLOUD_BATCH_SIZE", defaults.batch_size)?,
            sync_interval: env_u64("DECEPTICLOUD_SYNC_INTERVAL", defaults.sync_interval)?,
            hidden_size: defaults.hidden_size,
            seed: env_optional_u64("DECEPTICLOUD_SEED")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// FAIL-CLOSED: every hyperparameter must be in range.
    pub fn validate(&self) -> Result<(), TrainerError> {
        let fail = |msg: String| Err(TrainerError::ConfigurationError(format!("FAIL-CLOSED: {}", msg)));

        if !(0.0..=1.0).contains(&self.gamma) {
            return fail(format!("gamma must be in [0, 1] (got {})", self.gamma));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return fail(format!("learning rate must be > 0 (got {})", self.learning_rate));
        }
        if !(0.0..=1.0).contains(&self.epsilon_start) || !(0.0..=1.0).contains(&self.epsilon_min) {
            return fail("epsilon values must be in [0, 1]".to_string());
        }
        if self.epsilon_min > self.epsilon_start {
            return fail(format!(
                "epsilon_min {} exceeds epsilon_start {}",
                self.epsilon_min, self.epsilon_start
            ));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return fail(format!("epsilon decay must be in (0, 1] (got {})", self.epsilon_decay));
        }
        if self.batch_size == 0 {
            return fail("batch size must be >= 1".to_string());
        }
        if self.memory_size < self.batch_size {
            return fail(format!(
                "memory size {} smaller than batch size {}",
                self.memory_size, self.batch_size
            ));
        }
        if self.sync_interval == 0 {
            return fail("sync interval must be >= 1".to_string());
        }
        if self.hidden_size == 0 {
            return fail("hidden layer size must be >= 1".to_string());
        }
        Ok(())
    }
}

/// Run length and output location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingConfig {
    pub episodes: usize,
    pub timesteps_per_episode: usize,
    pub results_dir: PathBuf,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 5,
            timesteps_per_episode: 24,
            results_dir: PathBuf::from("results"),
        }
    }
}

impl TrainingConfig {
    pub fn from_env() -> Result<Self, TrainerError> {
        let defaults = Self::default();
        let config = Self {
            episodes: env_usize("DECEPTICLOUD_EPISODES", defaults.episodes)?,
            timesteps_per_episode: env_usize("DECEPTICLOUD_TIMESTEPS", defaults.timesteps_per_episode)?,
            results_dir: std::env::var("DECEPTICLOUD_RESULTS_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.results_dir),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TrainerError> {
        if self.episodes == 0 || self.timesteps_per_episode == 0 {
            return Err(TrainerError::ConfigurationError(
                "FAIL-CLOSED: episodes and timesteps per episode must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_f64(name: &str, default: f64) -> Result<f64, TrainerError> {
    match std::env::var(name) {
        Ok(raw) => {
            let value = raw.trim().parse::<f64>().map_err(|e| {
                TrainerError::ConfigurationError(format!("FAIL-CLOSED: invalid {} '{}': {}", name, raw, e))
            })?;
            if !value.is_finite() {
                return Err(TrainerError::ConfigurationError(format!(
                    "FAIL-CLOSED: {} must be finite",
                    name
                )));
            }
            Ok(value)
        }
        Err(_) => Ok(default),
    }
}

fn env_usize(name: &str, default: usize) -> Result<usize, TrainerError> {
    let value = env_u64(name, default as u64)?;
    usize::try_from(value)
        .map_err(|_| TrainerError::ConfigurationError(format!("FAIL-CLOSED: {} out of range", name)))
}

fn env_optional_u64(name: &str) -> Result<Option<u64>, TrainerError> {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse::<u64>().map(Some).map_err(|e| {
            TrainerError::ConfigurationError(format!("FAIL-CLOSED: invalid {} '{}': {}", name, raw, e))
        }),
        _ => Ok(None),
    }
}
