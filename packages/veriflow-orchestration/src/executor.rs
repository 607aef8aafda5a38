use crate::config::ScriptJobConfig;
use crate::error::{PipelineError, Result};
use sqlx::{Connection, SqliteConnection};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{info, warn};

/// Execute every script listed in the config, in listed order. Each
/// script runs on its own connection; connections are never shared
/// across scripts. The first missing or failing script aborts the
/// remainder, leaving earlier scripts' side effects in place.
pub async fn run_scripts(config: &ScriptJobConfig) -> Result<()> {
    let deadline = config.timeout();
    for path in &config.sql_files {
        run_one_script(config, path, deadline).await?;
    }
    Ok(())
}

async fn run_one_script(
    config: &ScriptJobConfig,
    path: &Path,
    deadline: Option<Duration>,
) -> Result<()> {
    let sql = match std::fs::read_to_string(path) {
        Ok(sql) => sql,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PipelineError::ScriptNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    info!("Executing script: {}", path.display());
    let started = Instant::now();

    let options = config.connect_options()?;
    let mut conn = SqliteConnection::connect_with(&options)
        .await
        .map_err(|cause| PipelineError::ScriptExecution {
            path: path.to_path_buf(),
            cause,
        })?;

    // The whole file executes as one batch; scripts may contain any
    // number of statements.
    let outcome = match deadline {
        Some(limit) => match timeout(limit, sqlx::raw_sql(&sql).execute(&mut conn)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                // The driver may still be mid-statement; drop the
                // connection instead of waiting on a graceful close.
                drop(conn);
                return Err(PipelineError::ScriptTimeout {
                    path: path.to_path_buf(),
                    timeout_ms: limit.as_millis() as u64,
                });
            }
        },
        None => sqlx::raw_sql(&sql).execute(&mut conn).await,
    };

    if let Err(e) = conn.close().await {
        warn!("Failed to close connection for {}: {}", path.display(), e);
    }

    let result = outcome.map_err(|cause| PipelineError::ScriptExecution {
        path: path.to_path_buf(),
        cause,
    })?;

    info!(
        "Script {} done: {} rows affected in {}ms",
        path.display(),
        result.rows_affected(),
        started.elapsed().as_millis()
    );
    Ok(())
}
