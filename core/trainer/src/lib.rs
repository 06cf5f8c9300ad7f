// Path and File Name : /home/decepticloud/core/trainer/src/lib.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Library root - DQN agent, replay buffer, Q-network, policies, model store, metrics and the training loop

pub mod agent;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod network;
pub mod policy;
pub mod replay;
pub mod store;
pub mod training;

#[cfg(test)]
mod tests;

pub use agent::DqnAgent;
pub use config::{AgentConfig, TrainingConfig};
pub use errors::TrainerError;
pub use metrics::{CsvMetricsSink, EpisodeRecord, MemoryMetricsSink, MetricsSink, MultiSink, TimestepRecord, TracingMetricsSink};
pub use network::{AdamOptimizer, QNetwork};
pub use policy::{Policy, StaticPolicy};
pub use replay::{ReplayBuffer, SharedReplayBuffer, Transition};
pub use store::{load_checkpoint, save_checkpoint, AgentSnapshot, CHECKPOINT_FORMAT_VERSION};
pub use training::{LoopState, RunSummary, TrainingLoop};
