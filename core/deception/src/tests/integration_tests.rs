// Path and File Name : /home/decepticloud/core/deception/src/tests/integration_tests.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Integration tests - honeynet environment reset/step against the dry-run runtime with scripted and file-backed signals

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::asset::{Action, ActiveAsset, State};
    use crate::config::{EnvironmentConfig, DRY_RUN_TARGET};
    use crate::deployer::DeploymentController;
    use crate::environment::{Environment, HoneynetEnvironment};
    use crate::errors::DeceptionError;
    use crate::registry::HoneypotRegistry;
    use crate::runtime::{runtime_for_target, AssetRuntime, DryRunRuntime};
    use crate::signals::{AttackSignals, ScriptedSignals, SignalExtractor};

    fn environment(script: ScriptedSignals) -> (Arc<DryRunRuntime>, HoneynetEnvironment) {
        let runtime = Arc::new(DryRunRuntime::new());
        let dyn_runtime: Arc<dyn AssetRuntime> = runtime.clone();
        let controller = Arc::new(DeploymentController::new(
            dyn_runtime,
            Arc::new(HoneypotRegistry::with_defaults()),
            Duration::from_secs(5),
        ));
        let env = HoneynetEnvironment::new(controller, Box::new(script), Duration::ZERO, Duration::from_secs(1));
        (runtime, env)
    }

    /// Two sources, each read taking longer than one poll timeout but within its own bound.
    struct SlowSources {
        per_source: Duration,
    }

    #[async_trait]
    impl SignalExtractor for SlowSources {
        async fn poll(&mut self) -> Result<AttackSignals, DeceptionError> {
            tokio::time::sleep(self.per_source).await;
            tokio::time::sleep(self.per_source).await;
            Ok(AttackSignals::new(true, false))
        }

        fn source_count(&self) -> usize {
            2
        }

        async fn clear(&mut self) -> Result<(), DeceptionError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_reset_returns_initial_state() {
        let (runtime, mut env) = environment(ScriptedSignals::default());
        runtime.set_running("web_honeypot", true);

        let state = env.reset().await;

        assert_eq!(state, State::initial());
        assert_eq!(state.to_vector(), [0.0, 0.0, 0.0]);
        assert!(!runtime.running("web_honeypot"));
        assert_eq!(env.state_size(), 3);
        assert_eq!(env.action_count(), 3);
    }

    #[tokio::test]
    async fn test_step_captures_attack() {
        let (_runtime, mut env) = environment(ScriptedSignals::new(vec![AttackSignals::new(true, false)]));
        env.reset().await;

        let outcome = env.step(Action::DeploySsh).await;

        assert!(outcome.deployment_ok);
        assert_eq!(outcome.reward, 10);
        assert_eq!(outcome.next_state, State::new(true, false, ActiveAsset::Ssh));
        assert_eq!(outcome.next_state.to_vector(), [1.0, 0.0, 1.0]);
    }

    #[tokio::test]
    async fn test_signal_outage_means_no_attack() {
        let mut script = ScriptedSignals::default();
        script.push_outage();
        let (_runtime, mut env) = environment(script);
        env.reset().await;

        let outcome = env.step(Action::DeployWeb).await;

        assert_eq!(outcome.signals, AttackSignals::none());
        assert_eq!(outcome.reward, -1);
        assert_eq!(outcome.next_state, State::new(false, false, ActiveAsset::Web));
    }

    #[tokio::test]
    async fn test_failed_deployment_rewards_reality() {
        let (runtime, mut env) = environment(ScriptedSignals::new(vec![
            AttackSignals::none(),
            AttackSignals::new(false, true),
        ]));
        env.reset().await;
        env.step(Action::DeploySsh).await;
        runtime.fail_start("web_honeypot", true);

        let outcome = env.step(Action::DeployWeb).await;

        // ssh stopped, web never started: nothing active, web attack missed
        assert!(!outcome.deployment_ok);
        assert_eq!(outcome.next_state.active_asset, ActiveAsset::None);
        assert_eq!(outcome.reward, -2);
    }

    #[tokio::test]
    async fn test_unreachable_runtime_continues_with_last_known() {
        let (runtime, mut env) = environment(ScriptedSignals::new(vec![
            AttackSignals::none(),
            AttackSignals::new(true, false),
        ]));
        env.reset().await;
        env.step(Action::DeploySsh).await;
        runtime.set_unreachable(true);

        let outcome = env.step(Action::None).await;

        assert!(!outcome.deployment_ok);
        assert_eq!(outcome.next_state.active_asset, ActiveAsset::Ssh);
        assert_eq!(outcome.reward, 10);
    }

    #[tokio::test]
    async fn test_static_ssh_episode() {
        let script = ScriptedSignals::new(vec![
            AttackSignals::none(),
            AttackSignals::none(),
            AttackSignals::new(true, false),
            AttackSignals::none(),
            AttackSignals::none(),
        ]);
        let (runtime, mut env) = environment(script);
        env.reset().await;

        let mut total = 0;
        for _ in 0..5 {
            total += env.step(Action::DeploySsh).await.reward;
        }

        assert_eq!(total, 6);
        assert_eq!(runtime.mutations().len(), 1);
    }

    #[test]
    fn test_dry_run_target_resolution() {
        let config = EnvironmentConfig::default();
        assert!(config.is_dry_run());

        let runtime = runtime_for_target(DRY_RUN_TARGET, config.deploy_timeout).unwrap();
        assert_eq!(runtime.describe(), "dry-run");

        let docker = runtime_for_target("http://127.0.0.1:2375", config.deploy_timeout).unwrap();
        assert_eq!(docker.describe(), "docker-engine:http://127.0.0.1:2375");

        assert!(runtime_for_target("unix-socket", config.deploy_timeout).is_err());
    }

    #[tokio::test]
    async fn test_poll_deadline_covers_every_source() {
        let runtime: Arc<dyn AssetRuntime> = Arc::new(DryRunRuntime::new());
        let controller = Arc::new(DeploymentController::new(
            runtime,
            Arc::new(HoneypotRegistry::with_defaults()),
            Duration::from_secs(5),
        ));
        let mut env = HoneynetEnvironment::new(
            controller,
            Box::new(SlowSources {
                per_source: Duration::from_millis(40),
            }),
            Duration::ZERO,
            Duration::from_millis(50),
        );

        let outcome = env.step(Action::DeploySsh).await;

        assert!(outcome.signals.ssh_attack);
        assert_eq!(outcome.reward, 10);
    }
}
