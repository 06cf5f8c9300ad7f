// Path and File Name : /home/decepticloud/core/trainer/src/metrics.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Training metrics - per-timestep and per-episode records, append-only sinks (CSV result files, structured tracing events, in-memory)

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use tracing::info;

use crate::errors::TrainerError;

pub const TIMESTEP_FILE: &str = "results_per_timestep.csv";
pub const SUMMARY_FILE: &str = "results_summary.csv";

/// One row per timestep. `episode` and `timestep` are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimestepRecord {
    pub run_id: String,
    pub episode: usize,
    pub timestep: usize,
    pub action: usize,
    pub reward: f64,
    pub cumulative_reward: f64,
    pub epsilon: f64,
    pub ssh_attack: u8,
    pub web_attack: u8,
    pub active_asset: u8,
    pub loss: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeRecord {
    pub run_id: String,
    pub episode: usize,
    pub total_reward: f64,
    pub epsilon: f64,
    pub timesteps: usize,
    pub timestamp: DateTime<Utc>,
}

pub trait MetricsSink: Send {
    fn record_timestep(&mut self, record: &TimestepRecord) -> Result<(), TrainerError>;

    fn record_episode(&mut self, record: &EpisodeRecord) -> Result<(), TrainerError>;

    fn flush(&mut self) -> Result<(), TrainerError> {
        Ok(())
    }
}

/// Appends to `results_per_timestep.csv` and `results_summary.csv` in a results
/// directory. Headers are written only when a file is created.
pub struct CsvMetricsSink {
    dir: PathBuf,
    timesteps: Writer<File>,
    summary: Writer<File>,
}

impl CsvMetricsSink {
    pub fn create(dir: &Path) -> Result<Self, TrainerError> {
        fs::create_dir_all(dir)?;
        let sink = Self {
            dir: dir.to_path_buf(),
            timesteps: Self::open(&dir.join(TIMESTEP_FILE))?,
            summary: Self::open(&dir.join(SUMMARY_FILE))?,
        };
        info!("Writing training metrics to {}", dir.display());
        Ok(sink)
    }

    fn open(path: &Path) -> Result<Writer<File>, TrainerError> {
        let is_new = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(WriterBuilder::new().has_headers(is_new).from_writer(file))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl MetricsSink for CsvMetricsSink {
    fn record_timestep(&mut self, record: &TimestepRecord) -> Result<(), TrainerError> {
        self.timesteps.serialize(record)?;
        self.timesteps.flush()?;
        Ok(())
    }

    fn record_episode(&mut self, record: &EpisodeRecord) -> Result<(), TrainerError> {
        self.summary.serialize(record)?;
        self.summary.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TrainerError> {
        self.timesteps.flush()?;
        self.summary.flush()?;
        Ok(())
    }
}

/// Emits every record as a structured `tracing` event.
#[derive(Debug, Default)]
pub struct TracingMetricsSink;

impl MetricsSink for TracingMetricsSink {
    fn record_timestep(&mut self, record: &TimestepRecord) -> Result<(), TrainerError> {
        info!(
            target: "decepticloud::metrics",
            run_id = %record.run_id,
            episode = record.episode,
            timestep = record.timestep,
            action = record.action,
            reward = record.reward,
            cumulative_reward = record.cumulative_reward,
            epsilon = record.epsilon,
            ssh_attack = record.ssh_attack,
            web_attack = record.web_attack,
            active_asset = record.active_asset,
            loss = ?record.loss,
            "timestep"
        );
        Ok(())
    }

    fn record_episode(&mut self, record: &EpisodeRecord) -> Result<(), TrainerError> {
        info!(
            target: "decepticloud::metrics",
            run_id = %record.run_id,
            episode = record.episode,
            total_reward = record.total_reward,
            epsilon = record.epsilon,
            timesteps = record.timesteps,
            "episode"
        );
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryMetricsSink {
    pub timesteps: Vec<TimestepRecord>,
    pub episodes: Vec<EpisodeRecord>,
}

impl MetricsSink for MemoryMetricsSink {
    fn record_timestep(&mut self, record: &TimestepRecord) -> Result<(), TrainerError> {
        self.timesteps.push(record.clone());
        Ok(())
    }

    fn record_episode(&mut self, record: &EpisodeRecord) -> Result<(), TrainerError> {
        self.episodes.push(record.clone());
        Ok(())
    }
}

/// Fans records out to several sinks.
#[derive(Default)]
pub struct MultiSink {
    sinks: Vec<Box<dyn MetricsSink>>,
}

impl MultiSink {
    pub fn new(sinks: Vec<Box<dyn MetricsSink>>) -> Self {
        Self { sinks }
    }
}

impl MetricsSink for MultiSink {
    fn record_timestep(&mut self, record: &TimestepRecord) -> Result<(), TrainerError> {
        for sink in self.sinks.iter_mut() {
            sink.record_timestep(record)?;
        }
        Ok(())
    }

    fn record_episode(&mut self, record: &EpisodeRecord) -> Result<(), TrainerError> {
        for sink in self.sinks.iter_mut() {
            sink.record_episode(record)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TrainerError> {
        for sink in self.sinks.iter_mut() {
            sink.flush()?;
        }
        Ok(())
    }
}
