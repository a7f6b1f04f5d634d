//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::api::ApiConfig;
use crate::storage::{Backend, SyncMode};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageSection,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// History store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSection {
    #[serde(default)]
    pub backend: Backend,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default)]
    pub sync: SyncMode,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("imulog").to_string_lossy().to_string())
        .unwrap_or_else(|| "./imulog_data".to_string())
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            data_dir: default_data_dir(),
            sync: SyncMode::default(),
        }
    }
}

impl StorageSection {
    /// Engine settings for this section
    pub fn to_storage_config(&self) -> crate::storage::StorageConfig {
        let mut config = crate::storage::StorageConfig::new(expand_home(&self.data_dir))
            .backend(self.backend);
        config.sync_mode = self.sync;
        config
    }
}

/// `~/x` → `$HOME/x`
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load an explicit file, or fall back to the default locations
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_with_env(path),
            None => Ok(Self::load_default()),
        }
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("imulog").join("config.toml")),
            Some(PathBuf::from("/etc/imulog/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Storage overrides
        if let Some(backend) = lookup("IMULOG_BACKEND") {
            match backend.parse() {
                Ok(b) => self.storage.backend = b,
                Err(e) => tracing::warn!("Ignoring IMULOG_BACKEND: {}", e),
            }
        }
        if let Some(data_dir) = lookup("IMULOG_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        // API overrides
        if let Some(host) = lookup("IMULOG_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("IMULOG_PORT") {
            match port.parse() {
                Ok(p) => self.api.port = p,
                Err(e) => tracing::warn!("Ignoring IMULOG_PORT '{}': {}", port, e),
            }
        }

        // Logging overrides
        if let Some(level) = lookup("IMULOG_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("IMULOG_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# imulog Configuration
#
# Environment variables override these settings:
# - IMULOG_BACKEND
# - IMULOG_DATA_DIR
# - IMULOG_HOST
# - IMULOG_PORT
# - IMULOG_LOG_LEVEL
# - IMULOG_LOG_FORMAT

[storage]
# History backend: "csv" (append-only log file) or "sqlite"
backend = "csv"

# Directory holding imu_data_history.csv / imu_history.db
data_dir = "~/.local/share/imulog"

# Durability of each append: "flush" or "fsync" (csv backend only)
sync = "flush"

[api]
# Server host
host = "0.0.0.0"

# Server port; the device connects to ws://<host>:<port>/
port = 5000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::bootstrap_to;
    use crate::logging::tests::Captured;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage.backend, Backend::Csv);
        assert_eq!(config.storage.sync, SyncMode::Flush);
        assert_eq!(config.api.port, 5000);
        assert_eq!(config.api.host, "0.0.0.0");
        assert!(!config.logging.is_json());
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.storage.backend, Backend::Csv);
        assert_eq!(config.api.port, 5000);
        assert_eq!(config.logging.level, "info");

        if dirs::home_dir().is_some() {
            let storage = config.storage.to_storage_config();
            assert!(!storage.data_dir.starts_with("~"));
        }
    }

    #[test]
    fn test_partial_file() {
        let config = Config::parse("[storage]\nbackend = \"sqlite\"\n").unwrap();
        assert_eq!(config.storage.backend, Backend::Sqlite);
        assert_eq!(config.api.port, 5000);

        assert!(Config::parse("[storage]\nbackend = \"mongo\"\n").is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("IMULOG_BACKEND", "sqlite"),
            ("IMULOG_DATA_DIR", "/tmp/imu"),
            ("IMULOG_PORT", "8080"),
            ("IMULOG_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.storage.backend, Backend::Sqlite);
        assert_eq!(config.storage.data_dir, "/tmp/imu");
        assert_eq!(config.api.port, 8080);
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_bad_override_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "IMULOG_PORT" => Some("http".to_string()),
            "IMULOG_BACKEND" => Some("mongo".to_string()),
            _ => None,
        });
        assert_eq!(config.api.port, 5000);
        assert_eq!(config.storage.backend, Backend::Csv);
    }

    #[test]
    fn test_ignored_override_warning_reaches_bootstrap_log() {
        let sink = Captured::default();
        let config = bootstrap_to("warn", sink.writer(), || {
            let mut config = Config::default();
            config.apply_overrides(|key| match key {
                "IMULOG_PORT" => Some("http".to_string()),
                _ => None,
            });
            config
        });

        assert_eq!(config.api.port, 5000);
        let logged = sink.text();
        assert!(logged.contains("WARN"));
        assert!(logged.contains("Ignoring IMULOG_PORT 'http'"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/imulog.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
