//! Configuration management for the rollcall controller
//!
//! Settings are resolved in three layers:
//! 1. Environment variables (highest priority)
//! 2. Configuration file (TOML format)
//! 3. Default values (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Cluster connection
    pub cluster: ClusterConfig,
    /// Readiness polling used by `rollcall wait`
    pub polling: PollingConfig,
    /// Logging
    pub logging: LoggingConfig,
}

/// Cluster connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Kubeconfig file; the usual inference applies when unset
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context to use instead of the current one
    pub context: Option<String>,
    /// Use the pod's service account instead of a kubeconfig
    pub in_cluster: bool,
    /// Namespace every resource lives in
    pub namespace: String,
}

/// Polling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between two status checks of the same resource
    pub interval_secs: u64,
    /// Seconds to wait for a resource before giving up
    pub timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    pub level: String,
    /// Directory for daily rolling log files; console only when unset
    pub log_dir: Option<PathBuf>,
    /// Emit JSON on the console as well as in files
    pub json: bool,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            context: None,
            in_cluster: false,
            namespace: "default".to_string(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: 2,
            timeout_secs: 300,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            json: false,
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ControllerConfig {
    /// Load configuration from the environment and an optional config file
    ///
    /// `explicit` takes precedence over the standard locations. A file that
    /// exists but cannot be read or parsed is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_config_file(),
        };

        let mut config = match path {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_path_buf(), e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            std::env::var("ROLLCALL_CONFIG").ok().map(PathBuf::from),
            Some(PathBuf::from("/etc/rollcall/config.toml")),
            Some(PathBuf::from("./rollcall.toml")),
        ];

        paths.into_iter().flatten().find(|p| p.exists())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply `ROLLCALL_*` overrides looked up through `var`
    ///
    /// Values that fail to parse are ignored.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Cluster
        if let Some(path) = var("ROLLCALL_KUBECONFIG") {
            self.cluster.kubeconfig = Some(PathBuf::from(path));
        }
        if let Some(context) = var("ROLLCALL_CONTEXT") {
            self.cluster.context = Some(context);
        }
        if let Some(Ok(in_cluster)) = var("ROLLCALL_IN_CLUSTER").map(|v| v.parse()) {
            self.cluster.in_cluster = in_cluster;
        }
        if let Some(namespace) = var("ROLLCALL_NAMESPACE") {
            self.cluster.namespace = namespace;
        }

        // Polling
        if let Some(Ok(secs)) = var("ROLLCALL_POLL_INTERVAL_SECS").map(|v| v.parse()) {
            self.polling.interval_secs = secs;
        }
        if let Some(Ok(secs)) = var("ROLLCALL_TIMEOUT_SECS").map(|v| v.parse()) {
            self.polling.timeout_secs = secs;
        }

        // Logging
        if let Some(level) = var("ROLLCALL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(path) = var("ROLLCALL_LOG_DIR") {
            self.logging.log_dir = Some(PathBuf::from(path));
        }
        if let Some(Ok(json)) = var("ROLLCALL_LOG_JSON").map(|v| v.parse()) {
            self.logging.json = json;
        }
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cluster.namespace.trim().is_empty() {
            return Err(ConfigError::Validation("Namespace cannot be empty".to_string()));
        }

        if self.cluster.in_cluster
            && (self.cluster.kubeconfig.is_some() || self.cluster.context.is_some())
        {
            return Err(ConfigError::Validation(
                "in_cluster cannot be combined with a kubeconfig or context".to_string(),
            ));
        }

        if self.polling.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "Polling interval must be at least one second".to_string(),
            ));
        }

        if self.polling.timeout_secs < self.polling.interval_secs {
            return Err(ConfigError::Validation(format!(
                "Timeout ({}s) is shorter than the polling interval ({}s)",
                self.polling.timeout_secs, self.polling.interval_secs
            )));
        }

        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0:?}: {1}")]
    FileRead(PathBuf, String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Config validation failed: {0}")]
    Validation(String),
}
