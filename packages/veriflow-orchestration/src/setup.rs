use crate::context::ExecutionContext;
use crate::error::{PipelineError, Result};
use crate::plugin::SetupPlugin;
use tracing::{error, info};

/// Run every setup plugin in order. On the first failure the plugins
/// that had already completed are rolled back in reverse order, then the
/// original execute error is surfaced wrapped with the failing plugin's
/// name. Rollback failures never replace that error.
pub async fn run_setup_phase(
    plugins: &[Box<dyn SetupPlugin>],
    ctx: &mut ExecutionContext,
) -> Result<()> {
    for (idx, plugin) in plugins.iter().enumerate() {
        info!(
            "Running setup plugin {}/{}: {}",
            idx + 1,
            plugins.len(),
            plugin.name()
        );
        if let Err(cause) = plugin.execute(ctx).await {
            error!("Setup plugin '{}' failed: {}", plugin.name(), cause);
            rollback_completed(&plugins[..idx], ctx).await;
            return Err(PipelineError::setup_execute(plugin.name(), cause));
        }
    }
    Ok(())
}

/// Roll back every plugin in reverse registration order. Best-effort
/// teardown for hosts that want the environment gone after a run.
pub async fn run_rollback_phase(plugins: &[Box<dyn SetupPlugin>], ctx: &mut ExecutionContext) {
    rollback_completed(plugins, ctx).await;
}

/// Reverse-order compensation over a slice of completed plugins. Each
/// failure is logged and discarded so the remaining rollbacks still run.
async fn rollback_completed(completed: &[Box<dyn SetupPlugin>], ctx: &mut ExecutionContext) {
    for plugin in completed.iter().rev() {
        info!("Rolling back setup plugin: {}", plugin.name());
        if let Err(cause) = plugin.rollback(ctx).await {
            let err = PipelineError::rollback(plugin.name(), cause);
            error!("Continuing rollback after failure: {}", err);
        }
    }
}
