// Path and File Name : /home/decepticloud/core/trainer/src/main.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Main entrypoint for decepticloud-train - configuration, fail-closed preflight reset, training run, shutdown teardown, model save

use std::path::PathBuf;
use std::process;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use anyhow::Context;
use clap::{Parser, ValueEnum};
use tokio::signal;
use tracing::{error, warn, info};
use tracing_subscriber::EnvFilter;

use decepticloud_deception::{
    runtime_for_target, Action, DeploymentController, EnvironmentConfig, HoneynetEnvironment, HoneypotRegistry,
    LogSignalExtractor, TeardownEngine, TeardownStatus, ACTION_COUNT, STATE_SIZE,
};
use decepticloud_trainer::{
    AgentConfig, CsvMetricsSink, DqnAgent, MetricsSink, MultiSink, RunSummary, StaticPolicy, TracingMetricsSink,
    TrainerError, TrainingConfig, TrainingLoop,
};

const DEFAULT_MODEL_FILE: &str = "dqn_model.json";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StaticAction {
    None,
    Ssh,
    Web,
}

impl From<StaticAction> for Action {
    fn from(value: StaticAction) -> Self {
        match value {
            StaticAction::None => Action::None,
            StaticAction::Ssh => Action::DeploySsh,
            StaticAction::Web => Action::DeployWeb,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "decepticloud-train")]
#[command(about = "DeceptiCloud adaptive honeypot selection - DQN training loop")]
struct Cli {
    /// Number of episodes
    #[arg(long)]
    episodes: Option<usize>,
    /// Timesteps per episode
    #[arg(long)]
    timesteps: Option<usize>,
    /// Deployment target: `dry-run` or a Docker Engine URL
    #[arg(long)]
    target: Option<String>,
    /// Resume the agent from a checkpoint
    #[arg(long)]
    resume: Option<PathBuf>,
    /// Checkpoint path written after the run
    #[arg(long)]
    save: Option<PathBuf>,
    /// Directory for CSV results and the default checkpoint
    #[arg(long)]
    results_dir: Option<PathBuf>,
    /// Honeypot asset registry (YAML)
    #[arg(long)]
    assets: Option<PathBuf>,
    /// Run a fixed-action baseline instead of the learning agent
    #[arg(long, value_enum, conflicts_with_all = ["resume", "save"])]
    static_action: Option<StaticAction>,
    /// Seed for exploration, sampling and weight initialization
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    info!("DeceptiCloud trainer starting...");

    match run(cli).await {
        Ok(summary) => {
            info!(
                "Training complete: episodes={} steps={} rewards={:?} final_epsilon={:.4} stopped_early={}",
                summary.episodes_completed,
                summary.total_steps,
                summary.episode_rewards,
                summary.final_epsilon,
                summary.stopped_early
            );
            process::exit(0);
        }
        Err(e) => {
            error!("Trainer error: {:#}", e);
            error!("FAIL-CLOSED: training aborted");
            process::exit(1);
        }
    }
}

enum Runner {
    Learning(DqnAgent),
    Baseline(StaticPolicy),
}

/// Builds the learning agent, resuming from `--resume` when given. Runs before any
/// deployment target or results file is touched.
fn build_agent(cli: &Cli) -> anyhow::Result<DqnAgent> {
    let mut agent_config = AgentConfig::from_env().context("agent configuration")?;
    if cli.seed.is_some() {
        agent_config.seed = cli.seed;
    }
    let mut agent = DqnAgent::new(STATE_SIZE, ACTION_COUNT, agent_config)?;
    if let Some(path) = &cli.resume {
        agent.load(path).context("resume checkpoint")?;
    }
    Ok(agent)
}

async fn run(cli: Cli) -> anyhow::Result<RunSummary> {
    let mut env_config = EnvironmentConfig::from_env().context("environment configuration")?;
    if let Some(target) = &cli.target {
        env_config.target = target.clone();
    }

    let mut training_config = TrainingConfig::from_env().context("training configuration")?;
    if let Some(episodes) = cli.episodes {
        training_config.episodes = episodes;
    }
    if let Some(timesteps) = cli.timesteps {
        training_config.timesteps_per_episode = timesteps;
    }
    if let Some(dir) = &cli.results_dir {
        training_config.results_dir = dir.clone();
    }
    training_config.validate()?;

    let mut runner = match cli.static_action {
        Some(action) => Runner::Baseline(StaticPolicy::new(action.into())),
        None => Runner::Learning(build_agent(&cli)?),
    };
    let save_path = cli
        .save
        .clone()
        .unwrap_or_else(|| training_config.results_dir.join(DEFAULT_MODEL_FILE));

    let registry = Arc::new(match &cli.assets {
        Some(path) => HoneypotRegistry::load(path),
        None => HoneypotRegistry::from_env(),
    }
    .context("asset registry")?);

    let runtime = runtime_for_target(&env_config.target, env_config.deploy_timeout).context("deployment target")?;
    let controller = Arc::new(DeploymentController::new(
        runtime,
        registry.clone(),
        env_config.deploy_timeout,
    ));
    let teardown = TeardownEngine::new(controller.clone(), env_config.reset_retries, env_config.reset_backoff);
    teardown.preflight().await.context("preflight reset")?;

    let signals = LogSignalExtractor::from_registry(&registry, env_config.poll_timeout);
    let mut env = HoneynetEnvironment::new(
        controller,
        Box::new(signals),
        env_config.step_settle,
        env_config.poll_timeout,
    );

    let mut sink = MultiSink::new(vec![
        Box::new(CsvMetricsSink::create(&training_config.results_dir)?) as Box<dyn MetricsSink>,
        Box::new(TracingMetricsSink),
    ]);

    let training = TrainingLoop::new(training_config);
    let stop = training.stop_flag();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current timestep");
            stop.store(true, Ordering::SeqCst);
        }
    });

    let result = match &mut runner {
        Runner::Learning(agent) => {
            let result = training.run(&mut env, agent, &mut sink).await;
            match &result {
                Err(e) if e.is_numerical() => {
                    warn!("Numerical failure, checkpoint not written: {}", e);
                }
                _ => {
                    if let Err(e) = agent.save(&save_path) {
                        error!("Checkpoint save to {} failed: {}", save_path.display(), e);
                        if result.is_ok() {
                            return finish(&teardown, Err(e)).await;
                        }
                    }
                }
            }
            result
        }
        Runner::Baseline(policy) => training.run(&mut env, policy, &mut sink).await,
    };

    finish(&teardown, result).await
}

async fn finish(teardown: &TeardownEngine, result: Result<RunSummary, TrainerError>) -> anyhow::Result<RunSummary> {
    let cleanup = teardown.teardown_all().await;
    if cleanup.status != TeardownStatus::Completed {
        warn!("Shutdown teardown incomplete: {}", cleanup.errors.join("; "));
    }
    Ok(result?)
}
