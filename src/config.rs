//! Client configuration: API endpoint, data directory, logging.
//!
//! Priority (highest to lowest):
//!   1. CLI / env, passed as `Some(value)` from clap
//!   2. TOML file at `{data_dir}/config.toml`
//!   3. Built-in defaults

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::error;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Optional overrides read from `{data_dir}/config.toml`. Every field may
/// be omitted; absent fields fall through to the defaults.
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    /// Base URL of the task-management API, including the `/api` prefix.
    api_url: Option<String>,
    /// Log level filter (trace, debug, info, warn, error).
    log: Option<String>,
    /// Log output format: "compact" (default, human-readable) | "json".
    log_format: Option<String>,
    /// Per-request HTTP timeout in seconds (default: 10).
    timeout_secs: Option<u64>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config.toml, using defaults");
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// API root every endpoint path is joined onto. No trailing slash.
    pub api_url: String,
    /// Holds the session file, config.toml, and the log directory.
    pub data_dir: PathBuf,
    pub log: String,
    pub log_format: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Build config from CLI/env args plus the optional TOML file.
    pub fn new(api_url: Option<String>, data_dir: Option<PathBuf>, log: Option<String>) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);

        // Load TOML as the lowest-priority override layer
        let toml = load_toml(&data_dir).unwrap_or_default();

        let api_url = api_url
            .or(toml.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = api_url.trim_end_matches('/').to_string();

        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());

        let log_format = std::env::var("TASKDECK_LOG_FORMAT")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.log_format)
            .unwrap_or_else(|| "compact".to_string());

        let timeout_secs = toml.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            api_url,
            data_dir,
            log,
            log_format,
            timeout_secs,
        }
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/taskdeck
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("taskdeck");
        }
    }
    #[cfg(target_os = "linux")]
    {
        // $XDG_DATA_HOME/taskdeck or ~/.local/share/taskdeck
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("taskdeck");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("taskdeck");
        }
    }
    #[cfg(target_os = "windows")]
    {
        // %APPDATA%\taskdeck
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("taskdeck");
        }
    }
    // Fallback
    PathBuf::from(".taskdeck")
}
