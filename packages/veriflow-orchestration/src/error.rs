use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Config file not found: {}", .path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to parse config {}: {message}", .path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error("Script file not found: {}", .path.display())]
    ScriptNotFound { path: PathBuf },

    #[error("Script {} failed: {cause}", .path.display())]
    ScriptExecution {
        path: PathBuf,
        #[source]
        cause: sqlx::Error,
    },

    #[error("Script {} timed out after {timeout_ms}ms", .path.display())]
    ScriptTimeout { path: PathBuf, timeout_ms: u64 },

    #[error("Result query on '{table}' failed: {cause}")]
    Query {
        table: String,
        #[source]
        cause: sqlx::Error,
    },

    #[error("Result query on '{table}' timed out after {timeout_ms}ms")]
    QueryTimeout { table: String, timeout_ms: u64 },

    #[error("Setup plugin '{plugin}' failed: {cause}")]
    SetupExecute {
        plugin: String,
        #[source]
        cause: Box<PipelineError>,
    },

    #[error("Rollback of plugin '{plugin}' failed: {cause}")]
    Rollback {
        plugin: String,
        #[source]
        cause: Box<PipelineError>,
    },

    #[error("Plugin already registered: {0}")]
    DuplicatePlugin(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    pub fn setup_execute(plugin: impl Into<String>, cause: PipelineError) -> Self {
        Self::SetupExecute {
            plugin: plugin.into(),
            cause: Box::new(cause),
        }
    }

    pub fn rollback(plugin: impl Into<String>, cause: PipelineError) -> Self {
        Self::Rollback {
            plugin: plugin.into(),
            cause: Box::new(cause),
        }
    }
}
