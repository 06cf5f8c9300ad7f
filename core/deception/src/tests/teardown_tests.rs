// Path and File Name : /home/decepticloud/core/deception/src/tests/teardown_tests.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Tests for the teardown engine - retried shutdown cleanup and the fail-closed startup preflight

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::asset::ActiveAsset;
    use crate::deployer::DeploymentController;
    use crate::errors::DeceptionError;
    use crate::registry::HoneypotRegistry;
    use crate::runtime::{AssetRuntime, DryRunRuntime};
    use crate::teardown::{TeardownEngine, TeardownStatus};

    fn engine(runtime: Arc<DryRunRuntime>) -> (Arc<DeploymentController>, TeardownEngine) {
        let dyn_runtime: Arc<dyn AssetRuntime> = runtime;
        let controller = Arc::new(DeploymentController::new(
            dyn_runtime,
            Arc::new(HoneypotRegistry::with_defaults()),
            Duration::from_secs(5),
        ));
        let engine = TeardownEngine::new(controller.clone(), 3, Duration::ZERO);
        (controller, engine)
    }

    #[tokio::test]
    async fn test_preflight_stops_leftover_assets() {
        let runtime = Arc::new(DryRunRuntime::new());
        runtime.set_running("cowrie_honeypot", true);
        let (controller, engine) = engine(runtime.clone());

        let result = engine.preflight().await.unwrap();

        assert_eq!(result.status, TeardownStatus::Completed);
        assert_eq!(result.attempts, 1);
        assert!(!runtime.running("cowrie_honeypot"));
        assert_eq!(controller.current(), ActiveAsset::None);
    }

    #[tokio::test]
    async fn test_preflight_fails_closed_when_unreachable() {
        let runtime = Arc::new(DryRunRuntime::new());
        runtime.set_unreachable(true);
        let (_controller, engine) = engine(runtime);

        let result = engine.preflight().await;

        assert!(matches!(result, Err(DeceptionError::TeardownFailed(_))));
    }

    #[tokio::test]
    async fn test_teardown_retries_then_reports_failure() {
        let runtime = Arc::new(DryRunRuntime::new());
        runtime.set_running("web_honeypot", true);
        runtime.fail_stop("web_honeypot", true);
        let (controller, engine) = engine(runtime.clone());

        let result = engine.teardown_all().await;

        assert_eq!(result.status, TeardownStatus::Failed);
        assert_eq!(result.attempts, 3);
        assert_eq!(result.errors.len(), 3);
        assert_eq!(controller.current(), ActiveAsset::Web);
    }

    #[tokio::test]
    async fn test_teardown_recovers_on_retry() {
        let runtime = Arc::new(DryRunRuntime::new());
        runtime.set_running("web_honeypot", true);
        runtime.fail_stop("web_honeypot", true);
        let (_controller, engine) = engine(runtime.clone());

        let first = engine.teardown_all().await;
        assert_eq!(first.status, TeardownStatus::Failed);

        runtime.fail_stop("web_honeypot", false);
        let second = engine.teardown_all().await;
        assert_eq!(second.status, TeardownStatus::Completed);
        assert!(!runtime.running("web_honeypot"));
    }
}
