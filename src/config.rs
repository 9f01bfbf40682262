//! Configuration System
//!
//! Handles loading configuration for the command-line client from files and
//! environment variables. Supports TOML config files and environment
//! variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::DEFAULT_API_ROOT;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Origin of the dashboard backend
    #[serde(default = "default_api_url")]
    pub url: String,

    /// Root every REST path hangs off
    #[serde(default = "default_api_root")]
    pub root: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_api_root() -> String {
    DEFAULT_API_ROOT.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            root: default_api_root(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Request timeout, `None` when disabled with `0`
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
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
    "warn".to_string()
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

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
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

    /// Load from default locations or environment
    pub fn load_default() -> Discovered {
        Self::discover(default_paths().iter().flatten())
    }

    /// First of `paths` that exists and loads wins; env overrides on top
    fn discover<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) -> Discovered {
        let mut rejected = Vec::new();
        for path in paths {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        return Discovered {
                            config,
                            source: Some(path.clone()),
                            rejected,
                        }
                    }
                    Err(e) => rejected.push(e),
                }
            }
        }

        Discovered {
            config: Self::from_env(),
            source: None,
            rejected,
        }
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `KILIMANJARO_*` overrides from `lookup`
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(url) = lookup("KILIMANJARO_API_URL") {
            self.api.url = url;
        }
        if let Some(root) = lookup("KILIMANJARO_API_ROOT") {
            self.api.root = root;
        }
        if let Some(timeout) = lookup("KILIMANJARO_REQUEST_TIMEOUT") {
            match timeout.parse() {
                Ok(secs) => self.api.request_timeout_secs = secs,
                Err(_) => tracing::warn!(value = %timeout, "Ignoring invalid KILIMANJARO_REQUEST_TIMEOUT"),
            }
        }

        // Logging overrides
        if let Some(level) = lookup("KILIMANJARO_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("KILIMANJARO_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

fn default_paths() -> [Option<PathBuf>; 3] {
    [
        dirs::config_dir().map(|p| p.join("kilimanjaro").join("config.toml")),
        Some(PathBuf::from("/etc/kilimanjaro/config.toml")),
        Some(PathBuf::from("./kilimanjaro.toml")),
    ]
}

/// Result of searching the default config locations
///
/// Nothing is logged while searching since the subscriber depends on the
/// config being found; call [`Discovered::log`] once it is installed.
#[derive(Debug)]
pub struct Discovered {
    pub config: Config,
    /// File the config came from, `None` for defaults plus environment
    pub source: Option<PathBuf>,
    /// Files that exist but failed to load
    pub rejected: Vec<ConfigError>,
}

impl Discovered {
    /// Wrap a config loaded from an explicit path
    pub fn explicit(config: Config, path: &Path) -> Self {
        Self {
            config,
            source: Some(path.to_path_buf()),
            rejected: Vec::new(),
        }
    }

    pub fn log(&self) {
        for e in &self.rejected {
            tracing::warn!("{}", e);
        }
        match &self.source {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::debug!("Using default config with environment overrides"),
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
    r#"# Kilimanjaro Configuration
#
# Environment variables override these settings:
# - KILIMANJARO_API_URL
# - KILIMANJARO_API_ROOT
# - KILIMANJARO_REQUEST_TIMEOUT
# - KILIMANJARO_LOG_LEVEL
# - KILIMANJARO_LOG_FORMAT

[api]
# Origin of the dashboard backend
url = "http://localhost:8000"

# Root every REST path hangs off
root = "/api"

# Request timeout in seconds (0 disables)
request_timeout_secs = 30

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
