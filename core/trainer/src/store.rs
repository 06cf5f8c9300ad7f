// Path and File Name : /home/decepticloud/core/trainer/src/store.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Model store - versioned JSON checkpoints with SHA-256 integrity digest, atomic write, fail-closed load

use std::fs;
use std::path::Path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{error, info};

use crate::errors::TrainerError;
use crate::network::{AdamOptimizer, QNetwork};

pub const CHECKPOINT_FORMAT_VERSION: u32 = 1;

/// Everything needed to resume training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub state_size: usize,
    pub action_count: usize,
    pub value: QNetwork,
    pub target: QNetwork,
    pub optimizer: AdamOptimizer,
    pub epsilon: f64,
    pub gradient_steps: u64,
    pub episodes: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct CheckpointFile {
    format_version: u32,
    created_at: DateTime<Utc>,
    /// Hex SHA-256 of `payload`.
    sha256: String,
    /// Serialized `AgentSnapshot`.
    payload: String,
}

fn digest(payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hex::encode(hasher.finalize())
}

/// Write `snapshot` to `path`, returning its digest.
pub fn save_checkpoint(path: &Path, snapshot: &AgentSnapshot) -> Result<String, TrainerError> {
    let payload = serde_json::to_string(snapshot)?;
    let sha256 = digest(&payload);
    let file = CheckpointFile {
        format_version: CHECKPOINT_FORMAT_VERSION,
        created_at: Utc::now(),
        sha256: sha256.clone(),
        payload,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(&file)?)?;
    fs::rename(&tmp, path)?;

    info!("Checkpoint written to {} (sha256={})", path.display(), sha256);
    Ok(sha256)
}

/// FAIL-CLOSED: unreadable, malformed, wrong-version or tampered files are rejected.
pub fn load_checkpoint(path: &Path) -> Result<AgentSnapshot, TrainerError> {
    let raw = fs::read(path).map_err(|e| {
        TrainerError::Checkpoint(format!("cannot read {}: {}", path.display(), e))
    })?;
    let file: CheckpointFile = serde_json::from_slice(&raw).map_err(|e| {
        TrainerError::Checkpoint(format!("malformed checkpoint {}: {}", path.display(), e))
    })?;

    if file.format_version != CHECKPOINT_FORMAT_VERSION {
        return Err(TrainerError::Checkpoint(format!(
            "unsupported checkpoint format version {} (expected {})",
            file.format_version, CHECKPOINT_FORMAT_VERSION
        )));
    }

    let actual = digest(&file.payload);
    if actual != file.sha256 {
        error!("Checkpoint digest mismatch for {}", path.display());
        return Err(TrainerError::Checkpoint(format!(
            "digest mismatch for {}: recorded {}, computed {}",
            path.display(),
            file.sha256,
            actual
        )));
    }

    let snapshot: AgentSnapshot = serde_json::from_str(&file.payload).map_err(|e| {
        TrainerError::Checkpoint(format!("malformed checkpoint payload {}: {}", path.display(), e))
    })?;
    snapshot.value.validate()?;
    snapshot.target.validate()?;
    Ok(snapshot)
}
