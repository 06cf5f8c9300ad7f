// Path and File Name : /home/decepticloud/core/deception/src/asset.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Deception asset model and the honeynet MDP vocabulary - asset kinds, active-asset selection, actions and the three-slot state vector

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::DeceptionError;

/// Number of slots in the state vector: `[ssh_attack, web_attack, active_asset]`.
pub const STATE_SIZE: usize = 3;

/// Number of discrete actions.
pub const ACTION_COUNT: usize = 3;

/// Honeypot type backing a deception asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Ssh,
    Web,
}

impl AssetKind {
    pub const ALL: [AssetKind; 2] = [AssetKind::Ssh, AssetKind::Web];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Ssh => "ssh",
            AssetKind::Web => "web",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which deception asset is currently running. Exactly one variant holds at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveAsset {
    #[default]
    None,
    Ssh,
    Web,
}

impl ActiveAsset {
    /// Encoding used in the state vector (0 = none, 1 = SSH, 2 = web).
    pub fn code(&self) -> u8 {
        match self {
            ActiveAsset::None => 0,
            ActiveAsset::Ssh => 1,
            ActiveAsset::Web => 2,
        }
    }

    pub fn kind(&self) -> Option<AssetKind> {
        match self {
            ActiveAsset::None => None,
            ActiveAsset::Ssh => Some(AssetKind::Ssh),
            ActiveAsset::Web => Some(AssetKind::Web),
        }
    }

    /// Whether the asset of `kind` should be running under this selection.
    pub fn wants(&self, kind: AssetKind) -> bool {
        self.kind() == Some(kind)
    }
}

impl From<AssetKind> for ActiveAsset {
    fn from(kind: AssetKind) -> Self {
        match kind {
            AssetKind::Ssh => ActiveAsset::Ssh,
            AssetKind::Web => ActiveAsset::Web,
        }
    }
}

impl fmt::Display for ActiveAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveAsset::None => f.write_str("none"),
            ActiveAsset::Ssh => f.write_str("ssh"),
            ActiveAsset::Web => f.write_str("web"),
        }
    }
}

/// Per-timestep decision of the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    None,
    DeploySsh,
    DeployWeb,
}

impl Action {
    pub const ALL: [Action; ACTION_COUNT] = [Action::None, Action::DeploySsh, Action::DeployWeb];

    pub fn index(&self) -> usize {
        match self {
            Action::None => 0,
            Action::DeploySsh => 1,
            Action::DeployWeb => 2,
        }
    }

    pub fn from_index(index: usize) -> Result<Self, DeceptionError> {
        Action::ALL
            .get(index)
            .copied()
            .ok_or(DeceptionError::InvalidAction(index))
    }

    /// Asset selection this action deploys. Deterministic.
    pub fn target(&self) -> ActiveAsset {
        match self {
            Action::None => ActiveAsset::None,
            Action::DeploySsh => ActiveAsset::Ssh,
            Action::DeployWeb => ActiveAsset::Web,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::None => f.write_str("none"),
            Action::DeploySsh => f.write_str("deploy_ssh"),
            Action::DeployWeb => f.write_str("deploy_web"),
        }
    }
}

/// Observed environment state. Attack flags cover the latest timestep window only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct State {
    pub ssh_attack: bool,
    pub web_attack: bool,
    pub active_asset: ActiveAsset,
}

impl State {
    pub fn new(ssh_attack: bool, web_attack: bool, active_asset: ActiveAsset) -> Self {
        Self {
            ssh_attack,
            web_attack,
            active_asset,
        }
    }

    /// `[0, 0, 0]`: no attacks observed, nothing deployed.
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn to_vector(&self) -> [f64; STATE_SIZE] {
        [
            if self.ssh_attack { 1.0 } else { 0.0 },
            if self.web_attack { 1.0 } else { 0.0 },
            f64::from(self.active_asset.code()),
        ]
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}]",
            u8::from(self.ssh_attack),
            u8::from(self.web_attack),
            self.active_asset.code()
        )
    }
}
