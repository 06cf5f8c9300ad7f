// Path and File Name : /home/decepticloud/core/deception/src/reward.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Honeynet reward policy - six independent rules (capture bonus, idle cost, missed-attack penalty per asset kind)

use crate::asset::ActiveAsset;
use crate::signals::AttackSignals;

pub const CAPTURE_REWARD: i32 = 10;
pub const IDLE_COST: i32 = -1;
pub const MISSED_ATTACK_PENALTY: i32 = -2;

/// Reward for one timestep. The rules are not mutually exclusive: an SSH
/// capture during a web attack scores `10 - 2 = 8`.
pub fn compute_reward(signals: AttackSignals, active: ActiveAsset) -> i32 {
    let ssh = signals.ssh_attack;
    let web = signals.web_attack;
    let mut reward = 0;

    if ssh && active == ActiveAsset::Ssh {
        reward += CAPTURE_REWARD;
    }
    if web && active == ActiveAsset::Web {
        reward += CAPTURE_REWARD;
    }
    if active == ActiveAsset::Ssh && !ssh {
        reward += IDLE_COST;
    }
    if active == ActiveAsset::Web && !web {
        reward += IDLE_COST;
    }
    if ssh && active != ActiveAsset::Ssh {
        reward += MISSED_ATTACK_PENALTY;
    }
    if web && active != ActiveAsset::Web {
        reward += MISSED_ATTACK_PENALTY;
    }

    reward
}
