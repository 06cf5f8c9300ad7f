// Path and File Name : /home/decepticloud/core/deception/src/lib.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Library root - exports the honeynet environment: asset model, registry, lifecycle runtime, deployment controller, signal extraction, reward and teardown

pub mod asset;
pub mod config;
pub mod deployer;
pub mod environment;
pub mod errors;
pub mod registry;
pub mod reward;
pub mod runtime;
pub mod signals;
pub mod teardown;

#[cfg(test)]
mod tests;

pub use asset::{Action, ActiveAsset, AssetKind, State, ACTION_COUNT, STATE_SIZE};
pub use config::{EnvironmentConfig, DRY_RUN_TARGET};
pub use deployer::{DeploymentController, DeploymentState, DeploymentStatus};
pub use environment::{Environment, HoneynetEnvironment, StepOutcome};
pub use errors::DeceptionError;
pub use registry::{AssetDefinition, HoneypotRegistry};
pub use reward::compute_reward;
pub use runtime::{runtime_for_target, AssetRuntime, DockerEngineRuntime, DryRunRuntime, RuntimeCall};
pub use signals::{AttackSignals, LogSignalExtractor, RecordFormat, ScriptedSignals, SignalExtractor};
pub use teardown::{TeardownEngine, TeardownResult, TeardownStatus};
