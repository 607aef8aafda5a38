/*
 * Veriflow Plugins - Builtin setup and runner plugins
 *
 * Concrete plugins for standard verification jobs:
 * - TableSetup: provision a table, drop it on rollback
 * - SeedData: insert fixture rows, remove them on rollback
 * - ScriptRunner: execute a script job config and collect results
 */

// Public modules
pub mod script_runner;
pub mod seed_data;
pub mod table_setup;

// Re-exports
pub use script_runner::ScriptRunner;
pub use seed_data::SeedData;
pub use table_setup::TableSetup;

use std::path::PathBuf;
use veriflow_orchestration::{PluginRegistry, Result, RunnerPlugin, SetupPlugin};

const BUILTIN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// One table to provision before the scripts run.
#[derive(Debug, Clone)]
pub struct TableSpec {
    pub name: String,
    /// Column list for the CREATE TABLE statement.
    pub schema: String,
}

/// Fixture rows to seed into an already-provisioned table.
#[derive(Debug, Clone)]
pub struct SeedSpec {
    pub table: String,
    /// SQL value tuples, inserted in order.
    pub rows: Vec<String>,
}

/// Everything the builtin plugins need for one verification job.
#[derive(Debug, Clone)]
pub struct BuiltinJob {
    pub connection_string: String,
    pub tables: Vec<TableSpec>,
    pub seeds: Vec<SeedSpec>,
    pub script_config: PathBuf,
}

/// Wire the builtin plugins into a registry: one `TableSetup` per table,
/// one `SeedData` per seed set, then the `ScriptRunner`. Registration
/// order is execution order, so tables are provisioned before seeds.
pub fn register_builtins(registry: &mut PluginRegistry, job: &BuiltinJob) -> Result<()> {
    for table in &job.tables {
        let plugin = TableSetup::new(&job.connection_string, &table.name, &table.schema);
        let name = SetupPlugin::name(&plugin).to_string();
        registry.register_setup(&name, BUILTIN_VERSION, move || Box::new(plugin.clone()))?;
    }

    for seed in &job.seeds {
        let plugin = SeedData::new(&job.connection_string, &seed.table, seed.rows.clone());
        let name = SetupPlugin::name(&plugin).to_string();
        registry.register_setup(&name, BUILTIN_VERSION, move || Box::new(plugin.clone()))?;
    }

    let runner = ScriptRunner::new(&job.script_config);
    let name = RunnerPlugin::name(&runner).to_string();
    registry.register_runner(&name, BUILTIN_VERSION, move || Box::new(runner.clone()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_job() -> BuiltinJob {
        BuiltinJob {
            connection_string: "sqlite://job.db".to_string(),
            tables: vec![
                TableSpec {
                    name: "staging".to_string(),
                    schema: "id INTEGER".to_string(),
                },
                TableSpec {
                    name: "verification_results".to_string(),
                    schema: "id INTEGER, ok BOOLEAN".to_string(),
                },
            ],
            seeds: vec![SeedSpec {
                table: "staging".to_string(),
                rows: vec!["(1)".to_string()],
            }],
            script_config: PathBuf::from("job_config.json"),
        }
    }

    #[test]
    fn test_register_builtins_orders_tables_before_seeds() {
        let mut registry = PluginRegistry::new();
        register_builtins(&mut registry, &sample_job()).unwrap();

        let setup_names: Vec<String> = registry
            .setup_specs()
            .into_iter()
            .map(|spec| spec.name)
            .collect();
        assert_eq!(
            setup_names,
            vec![
                "table-setup:staging",
                "table-setup:verification_results",
                "seed-data:staging"
            ]
        );

        let runner_names: Vec<String> = registry
            .runner_specs()
            .into_iter()
            .map(|spec| spec.name)
            .collect();
        assert_eq!(runner_names, vec!["script-runner"]);
    }

    #[test]
    fn test_duplicate_table_spec_is_rejected() {
        let mut job = sample_job();
        job.tables.push(TableSpec {
            name: "staging".to_string(),
            schema: "id INTEGER".to_string(),
        });

        let mut registry = PluginRegistry::new();
        assert!(register_builtins(&mut registry, &job).is_err());
    }
}
