// Path and File Name : /home/decepticloud/core/trainer/src/training.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Training loop - episode/timestep state machine driving environment and policy, stop flag honoured between timesteps, metrics emission, run summary

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{error, warn, info, debug};
use uuid::Uuid;

use decepticloud_deception::Environment;

use crate::config::TrainingConfig;
use crate::errors::TrainerError;
use crate::metrics::{EpisodeRecord, MetricsSink, TimestepRecord};
use crate::policy::Policy;
use crate::replay::Transition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoopState {
    Init,
    Running,
    /// All episodes finished.
    Done,
    /// Stop flag observed between timesteps.
    Stopped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub policy: String,
    pub episodes_completed: usize,
    pub total_steps: usize,
    /// Total reward of each completed episode.
    pub episode_rewards: Vec<f64>,
    pub final_epsilon: f64,
    pub stopped_early: bool,
    /// Metrics records the sink failed to accept. Training continues past them.
    pub metrics_errors: usize,
}

pub struct TrainingLoop {
    config: TrainingConfig,
    run_id: String,
    stop: Arc<AtomicBool>,
    state: RwLock<LoopState>,
}

impl TrainingLoop {
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            run_id: Uuid::new_v4().to_string(),
            stop: Arc::new(AtomicBool::new(false)),
            state: RwLock::new(LoopState::Init),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn state(&self) -> LoopState {
        *self.state.read()
    }

    /// Setting the flag ends the run before the next timestep starts.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    fn set_state(&self, new_state: LoopState) {
        let mut state = self.state.write();
        info!("Training loop state transition: {:?} -> {:?}", *state, new_state);
        *state = new_state;
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn metrics_result(&self, result: Result<(), TrainerError>, what: &str, summary: &mut RunSummary) {
        if let Err(e) = result {
            summary.metrics_errors += 1;
            warn!("Run {}: metrics sink rejected {}, continuing: {}", self.run_id, what, e);
        }
    }

    pub async fn run<E, P, M>(&self, env: &mut E, policy: &mut P, sink: &mut M) -> Result<RunSummary, TrainerError>
    where
        E: Environment + ?Sized,
        P: Policy + ?Sized,
        M: MetricsSink + ?Sized,
    {
        match self.run_episodes(env, policy, sink).await {
            Ok(summary) => {
                self.set_state(if summary.stopped_early {
                    LoopState::Stopped
                } else {
                    LoopState::Done
                });
                Ok(summary)
            }
            Err(e) => {
                error!("Training run {} failed: {}", self.run_id, e);
                self.set_state(LoopState::Failed);
                Err(e)
            }
        }
    }

    async fn run_episodes<E, P, M>(&self, env: &mut E, policy: &mut P, sink: &mut M) -> Result<RunSummary, TrainerError>
    where
        E: Environment + ?Sized,
        P: Policy + ?Sized,
        M: MetricsSink + ?Sized,
    {
        self.config.validate()?;
        if env.state_size() != policy.state_size() || env.action_count() != policy.action_count() {
            return Err(TrainerError::ConfigurationError(format!(
                "FAIL-CLOSED: environment is {}x{} (state x actions) but policy expects {}x{}",
                env.state_size(),
                env.action_count(),
                policy.state_size(),
                policy.action_count()
            )));
        }

        self.set_state(LoopState::Running);
        info!(
            "Run {} started: policy={} episodes={} timesteps_per_episode={}",
            self.run_id,
            policy.name(),
            self.config.episodes,
            self.config.timesteps_per_episode
        );

        let mut summary = RunSummary {
            run_id: self.run_id.clone(),
            policy: policy.name(),
            episodes_completed: 0,
            total_steps: 0,
            episode_rewards: Vec::with_capacity(self.config.episodes),
            final_epsilon: policy.epsilon(),
            stopped_early: false,
            metrics_errors: 0,
        };

        'episodes: for episode in 1..=self.config.episodes {
            if self.stop_requested() {
                summary.stopped_early = true;
                break;
            }

            let mut state = env.reset().await;
            let mut total_reward = 0.0;
            let mut steps = 0;

            for timestep in 1..=self.config.timesteps_per_episode {
                if self.stop_requested() {
                    warn!(
                        "Stop requested, abandoning episode {} after {} timesteps",
                        episode, steps
                    );
                    summary.stopped_early = true;
                    break 'episodes;
                }

                let epsilon = policy.epsilon();
                let action = policy.act(&state)?;
                let outcome = env.step(action).await;
                let terminal = timestep == self.config.timesteps_per_episode;
                let reward = f64::from(outcome.reward);

                let loss = policy.observe(Transition::new(state, action, reward, outcome.next_state, terminal))?;

                total_reward += reward;
                steps += 1;
                summary.total_steps += 1;

                let recorded = sink.record_timestep(&TimestepRecord {
                    run_id: self.run_id.clone(),
                    episode,
                    timestep,
                    action: action.index(),
                    reward,
                    cumulative_reward: total_reward,
                    epsilon,
                    ssh_attack: u8::from(outcome.next_state.ssh_attack),
                    web_attack: u8::from(outcome.next_state.web_attack),
                    active_asset: outcome.next_state.active_asset.code(),
                    loss,
                    timestamp: Utc::now(),
                });
                self.metrics_result(recorded, "timestep record", &mut summary);

                debug!(
                    "Episode {} timestep {}: action={} reward={} state={}",
                    episode, timestep, action, reward, outcome.next_state
                );
                state = outcome.next_state;
            }

            policy.end_episode();
            let recorded = sink.record_episode(&EpisodeRecord {
                run_id: self.run_id.clone(),
                episode,
                total_reward,
                epsilon: policy.epsilon(),
                timesteps: steps,
                timestamp: Utc::now(),
            });
            self.metrics_result(recorded, "episode record", &mut summary);

            info!(
                "Episode {}/{}: total_reward={} epsilon={:.4}",
                episode,
                self.config.episodes,
                total_reward,
                policy.epsilon()
            );
            summary.episodes_completed += 1;
            summary.episode_rewards.push(total_reward);
        }

        let flushed = sink.flush();
        self.metrics_result(flushed, "flush", &mut summary);
        summary.final_epsilon = policy.epsilon();
        info!(
            "Run {} finished: {} episodes, {} timesteps, stopped_early={}, metrics_errors={}",
            self.run_id,
            summary.episodes_completed,
            summary.total_steps,
            summary.stopped_early,
            summary.metrics_errors
        );
        Ok(summary)
    }
}
