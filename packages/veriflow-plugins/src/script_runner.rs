use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;
use veriflow_orchestration::{
    fetch_results, run_scripts, ExecutionContext, Result, RunnerPlugin, ScriptJobConfig,
};

/// Generic script job runner: loads a job config, executes its scripts
/// in listed order, then collects the result table into the context.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    config_path: PathBuf,
}

impl ScriptRunner {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }
}

#[async_trait(?Send)]
impl RunnerPlugin for ScriptRunner {
    fn name(&self) -> &str {
        "script-runner"
    }

    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<()> {
        // 1. Resolve the job configuration
        info!("Loading script job config: {}", self.config_path.display());
        let config = ScriptJobConfig::load(&self.config_path)?;

        // 2. Execute every script, in listed order
        run_scripts(&config).await?;

        // 3. Collect the result table
        let records = fetch_results(&config).await?;
        info!(
            "Script job produced {} records from '{}'",
            records.len(),
            config.result_table
        );

        // 4. Attach results, then mark the run as passed
        ctx.results = records;
        ctx.passed = true;
        Ok(())
    }
}
