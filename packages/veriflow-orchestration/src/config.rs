use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteConnectOptions;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default per-script and per-query deadline when the config omits
/// `scriptTimeoutMs`. Unbounded execution requires an explicit `0`.
pub const DEFAULT_SCRIPT_TIMEOUT_MS: u64 = 300_000;

/// Script job configuration. Wire format is a JSON document with
/// camelCase keys:
///
/// ```json
/// {
///   "connectionString": "sqlite://./job.db",
///   "sqlFiles": ["01_schema.sql", "02_seed.sql"],
///   "resultTable": "verification_results",
///   "scriptTimeoutMs": 300000
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptJobConfig {
    pub connection_string: String,
    /// Scripts execute in exactly this order.
    pub sql_files: Vec<PathBuf>,
    pub result_table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_timeout_ms: Option<u64>,
}

impl ScriptJobConfig {
    /// Load and validate a config file. Relative `sqlFiles` entries are
    /// resolved against the config file's directory so a job directory
    /// can be moved as a unit.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PipelineError::ConfigNotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        let mut config: ScriptJobConfig =
            serde_json::from_str(&raw).map_err(|e| PipelineError::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if let Err(message) = config.validate() {
            return Err(PipelineError::ConfigParse {
                path: path.to_path_buf(),
                message,
            });
        }

        if let Some(dir) = path.parent() {
            for file in &mut config.sql_files {
                if file.is_relative() {
                    let resolved = dir.join(&*file);
                    *file = resolved;
                }
            }
        }

        Ok(config)
    }

    /// SQLite connect options for this job. Creates the database file on
    /// first connect.
    pub fn connect_options(&self) -> Result<SqliteConnectOptions> {
        let options =
            SqliteConnectOptions::from_str(&self.connection_string)?.create_if_missing(true);
        Ok(options)
    }

    /// Deadline applied to each script and to the result query.
    /// `scriptTimeoutMs = 0` disables the deadline entirely.
    pub fn timeout(&self) -> Option<Duration> {
        match self.script_timeout_ms {
            Some(0) => None,
            Some(ms) => Some(Duration::from_millis(ms)),
            None => Some(Duration::from_millis(DEFAULT_SCRIPT_TIMEOUT_MS)),
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.result_table.trim().is_empty() {
            return Err("resultTable must not be empty".to_string());
        }
        if let Err(e) = SqliteConnectOptions::from_str(&self.connection_string) {
            return Err(format!("invalid connectionString: {}", e));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("job_config.json");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_load_camel_case_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{
                "connectionString": "sqlite://./job.db",
                "sqlFiles": ["01_schema.sql", "02_seed.sql"],
                "resultTable": "verification_results"
            }"#,
        );

        let config = ScriptJobConfig::load(&path).unwrap();
        assert_eq!(config.connection_string, "sqlite://./job.db");
        assert_eq!(config.result_table, "verification_results");
        assert_eq!(config.sql_files.len(), 2);
    }

    #[test]
    fn test_relative_scripts_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{
                "connectionString": "sqlite://./job.db",
                "sqlFiles": ["scripts/01_schema.sql"],
                "resultTable": "t"
            }"#,
        );

        let config = ScriptJobConfig::load(&path).unwrap();
        assert_eq!(config.sql_files[0], dir.path().join("scripts/01_schema.sql"));
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScriptJobConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "{ not json");
        let err = ScriptJobConfig::load(&path).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigParse { .. }));
    }

    #[test]
    fn test_empty_result_table_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{"connectionString": "sqlite://x.db", "sqlFiles": [], "resultTable": "  "}"#,
        );
        let err = ScriptJobConfig::load(&path).unwrap_err();
        match err {
            PipelineError::ConfigParse { message, .. } => {
                assert!(message.contains("resultTable"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_timeout_defaults_when_absent() {
        let config = ScriptJobConfig {
            connection_string: "sqlite://x.db".to_string(),
            sql_files: vec![],
            result_table: "t".to_string(),
            script_timeout_ms: None,
        };
        assert_eq!(
            config.timeout(),
            Some(Duration::from_millis(DEFAULT_SCRIPT_TIMEOUT_MS))
        );
    }

    #[test]
    fn test_timeout_zero_means_unbounded() {
        let config = ScriptJobConfig {
            connection_string: "sqlite://x.db".to_string(),
            sql_files: vec![],
            result_table: "t".to_string(),
            script_timeout_ms: Some(0),
        };
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_timeout_explicit_value() {
        let config = ScriptJobConfig {
            connection_string: "sqlite://x.db".to_string(),
            sql_files: vec![],
            result_table: "t".to_string(),
            script_timeout_ms: Some(1500),
        };
        assert_eq!(config.timeout(), Some(Duration::from_millis(1500)));
    }
}
