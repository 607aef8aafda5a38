use crate::context::ExecutionContext;
use crate::error::Result;
use crate::plugin::{PluginRegistry, RunnerPlugin, SetupPlugin};
use crate::setup::run_setup_phase;
use std::time::Instant;
use tracing::{error, info};

/// Sequential two-phase pipeline: setup plugins provision the
/// environment, runner plugins execute the script job and attach
/// results. Every plugin call is awaited in order; nothing runs
/// concurrently.
pub struct PipelineOrchestrator {
    setup_plugins: Vec<Box<dyn SetupPlugin>>,
    runner_plugins: Vec<Box<dyn RunnerPlugin>>,
}

impl PipelineOrchestrator {
    pub fn new(
        setup_plugins: Vec<Box<dyn SetupPlugin>>,
        runner_plugins: Vec<Box<dyn RunnerPlugin>>,
    ) -> Self {
        Self {
            setup_plugins,
            runner_plugins,
        }
    }

    /// Instantiate every registered plugin, in registration order.
    pub fn from_registry(registry: &PluginRegistry) -> Self {
        Self {
            setup_plugins: registry.build_setup(),
            runner_plugins: registry.build_runners(),
        }
    }

    /// Execute one full run over a fresh context.
    ///
    /// A setup failure rolls back the completed setup plugins before the
    /// error is returned. A runner failure does not: the provisioned
    /// environment stays up so a failed run can be inspected. After a
    /// successful run, hosts that want teardown call
    /// [`run_rollback_phase`](crate::setup::run_rollback_phase) with the
    /// returned context.
    pub async fn run(&self) -> Result<ExecutionContext> {
        let mut ctx = ExecutionContext::new();
        let started = Instant::now();

        info!(
            "Starting pipeline run {} ({} setup plugins, {} runner plugins)",
            ctx.run_id,
            self.setup_plugins.len(),
            self.runner_plugins.len()
        );

        if let Err(e) = run_setup_phase(&self.setup_plugins, &mut ctx).await {
            error!("Run {} aborted during setup: {}", ctx.run_id, e);
            return Err(e);
        }

        for plugin in &self.runner_plugins {
            info!("Run {}: executing runner plugin '{}'", ctx.run_id, plugin.name());
            if let Err(e) = plugin.execute(&mut ctx).await {
                error!(
                    "Run {}: runner plugin '{}' failed: {}",
                    ctx.run_id,
                    plugin.name(),
                    e
                );
                return Err(e);
            }
        }

        info!(
            "Run {} finished in {}ms: {} records, passed = {}",
            ctx.run_id,
            started.elapsed().as_millis(),
            ctx.results.len(),
            ctx.passed
        );
        Ok(ctx)
    }
}
