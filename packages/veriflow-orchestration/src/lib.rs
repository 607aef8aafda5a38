/*
 * Veriflow Orchestration - Staged Data-Pipeline Contract
 *
 * Sequential two-phase pipeline for database verification jobs.
 *
 * Architecture:
 * - Execution Context (resource tracking, results, verdict)
 * - Setup/Rollback Coordinator (reverse-order compensation)
 * - Script Executor (ordered SQL files, script-scoped connections)
 * - Result Collector (dynamically typed records)
 * - Plugin Registry (explicit, code-registered)
 */

// Public modules
pub mod collector;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod plugin;
pub mod record;
pub mod setup;

// Re-exports
pub use collector::fetch_results;
pub use config::{ScriptJobConfig, DEFAULT_SCRIPT_TIMEOUT_MS};
pub use context::ExecutionContext;
pub use error::{PipelineError, Result};
pub use executor::run_scripts;
pub use orchestrator::PipelineOrchestrator;
pub use plugin::{PluginRegistry, PluginSpec, RunnerPlugin, SetupPlugin};
pub use record::{CellValue, Record};
pub use setup::{run_rollback_phase, run_setup_phase};
