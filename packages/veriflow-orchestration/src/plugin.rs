use crate::context::ExecutionContext;
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Setup capability: provision environment state on execute, undo it on
/// rollback. Rollback must be guarded on the context's tracked resources
/// so that a second invocation is a no-op.
#[async_trait(?Send)]
pub trait SetupPlugin: Send + Sync {
    fn name(&self) -> &str;

    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<()>;

    async fn rollback(&self, ctx: &mut ExecutionContext) -> Result<()>;
}

/// Runner capability: execute the script job and attach its results to
/// the context.
#[async_trait(?Send)]
pub trait RunnerPlugin: Send + Sync {
    fn name(&self) -> &str;

    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<()>;
}

/// Plugin metadata as registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSpec {
    pub name: String,
    pub version: String,
}

type SetupCtor = Box<dyn Fn() -> Box<dyn SetupPlugin> + Send + Sync>;
type RunnerCtor = Box<dyn Fn() -> Box<dyn RunnerPlugin> + Send + Sync>;

/// Explicit plugin registry. Registration happens in code at startup;
/// there is no discovery. Instantiation order is registration order,
/// which is also the pipeline's execution order.
#[derive(Default)]
pub struct PluginRegistry {
    setup: Vec<(PluginSpec, SetupCtor)>,
    runners: Vec<(PluginSpec, RunnerCtor)>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a setup plugin constructor. Names are unique per
    /// capability; a duplicate is rejected rather than shadowed.
    pub fn register_setup<F>(&mut self, name: &str, version: &str, ctor: F) -> Result<()>
    where
        F: Fn() -> Box<dyn SetupPlugin> + Send + Sync + 'static,
    {
        if self.setup.iter().any(|(spec, _)| spec.name == name) {
            return Err(PipelineError::DuplicatePlugin(name.to_string()));
        }
        self.setup.push((
            PluginSpec {
                name: name.to_string(),
                version: version.to_string(),
            },
            Box::new(ctor),
        ));
        Ok(())
    }

    /// Register a runner plugin constructor. Same uniqueness rule as
    /// `register_setup`, scoped to the runner capability.
    pub fn register_runner<F>(&mut self, name: &str, version: &str, ctor: F) -> Result<()>
    where
        F: Fn() -> Box<dyn RunnerPlugin> + Send + Sync + 'static,
    {
        if self.runners.iter().any(|(spec, _)| spec.name == name) {
            return Err(PipelineError::DuplicatePlugin(name.to_string()));
        }
        self.runners.push((
            PluginSpec {
                name: name.to_string(),
                version: version.to_string(),
            },
            Box::new(ctor),
        ));
        Ok(())
    }

    /// Instantiate every setup plugin, in registration order.
    pub fn build_setup(&self) -> Vec<Box<dyn SetupPlugin>> {
        self.setup.iter().map(|(_, ctor)| ctor()).collect()
    }

    /// Instantiate every runner plugin, in registration order.
    pub fn build_runners(&self) -> Vec<Box<dyn RunnerPlugin>> {
        self.runners.iter().map(|(_, ctor)| ctor()).collect()
    }

    pub fn setup_specs(&self) -> Vec<PluginSpec> {
        self.setup.iter().map(|(spec, _)| spec.clone()).collect()
    }

    pub fn runner_specs(&self) -> Vec<PluginSpec> {
        self.runners.iter().map(|(spec, _)| spec.clone()).collect()
    }
}
