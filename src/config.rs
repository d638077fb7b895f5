use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::schema::SchemaKind;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "EVALREPORT_CONFIG";

/// Config file looked up in the current directory when `EVALREPORT_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "evalreport.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub evalreport: EvalreportConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// General settings
#[derive(Debug, Clone, Deserialize)]
pub struct EvalreportConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for EvalreportConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Paths of the external evaluators
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolsConfig {
    /// trec_eval binary
    #[serde(default)]
    pub trec_eval: Option<PathBuf>,
    /// gdeval script
    #[serde(default)]
    pub gdeval: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration
    ///
    /// Loads environment variables from .env file (if present) first.
    /// Looks for the config file in this order:
    /// 1. Path specified in EVALREPORT_CONFIG (must exist)
    /// 2. ./evalreport.toml in current directory (optional)
    ///
    /// Falls back to defaults when no file is found.
    pub fn load() -> Result<Self> {
        // Load .env file if it exists (ignore errors - file is optional)
        let _ = dotenv::dotenv();

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }

        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(local);
        }

        Ok(Self::default())
    }

    /// Load and validate a specific config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        let level = self.evalreport.log_level.to_lowercase();
        if !matches!(level.as_str(), "error" | "warn" | "info" | "debug" | "trace") {
            anyhow::bail!(
                "evalreport.log_level must be one of error, warn, info, debug, trace (got {})",
                self.evalreport.log_level
            );
        }
        Ok(())
    }

    /// Configured evaluator path for a schema, if any
    pub fn tool_path(&self, kind: SchemaKind) -> Option<&Path> {
        match kind {
            SchemaKind::TrecEval => self.tools.trec_eval.as_deref(),
            SchemaKind::GdEval => self.tools.gdeval.as_deref(),
        }
    }

    pub fn log_level(&self) -> &str {
        &self.evalreport.log_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn with_config_env(value: Option<&str>, f: impl FnOnce()) {
        let original = std::env::var(CONFIG_ENV).ok();
        match value {
            Some(v) => std::env::set_var(CONFIG_ENV, v),
            None => std::env::remove_var(CONFIG_ENV),
        }
        f();
        std::env::remove_var(CONFIG_ENV);
        if let Some(v) = original {
            std::env::set_var(CONFIG_ENV, v);
        }
    }

    #[test]
    fn test_config_load_from_env_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("custom.toml");
        fs::write(
            &config_path,
            r#"
[evalreport]
log_level = "debug"

[tools]
trec_eval = "/opt/trec_eval/trec_eval"
"#,
        )
        .unwrap();

        with_config_env(config_path.to_str(), || {
            let config = Config::load();
            assert!(config.is_ok(), "Config::load() failed: {:?}", config.err());
            let config = config.unwrap();
            assert_eq!(config.log_level(), "debug");
            assert_eq!(
                config.tool_path(SchemaKind::TrecEval),
                Some(Path::new("/opt/trec_eval/trec_eval"))
            );
            assert_eq!(config.tool_path(SchemaKind::GdEval), None);
        });
    }

    #[test]
    fn test_config_env_path_must_exist() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        with_config_env(Some("nonexistent-evalreport.toml"), || {
            let config = Config::load();
            assert!(config.is_err());
        });
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.log_level(), "info");
        assert!(config.tool_path(SchemaKind::TrecEval).is_none());
    }

    #[test]
    fn test_config_empty_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("empty.toml");
        fs::write(&config_path, "").unwrap();
        let config = Config::from_file(&config_path).unwrap();
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn test_config_rejects_bad_log_level() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.toml");
        fs::write(&config_path, "[evalreport]\nlog_level = \"loud\"\n").unwrap();
        let err = Config::from_file(&config_path).unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }
}
