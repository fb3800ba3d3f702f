//! Runtime configuration loaded from `~/.config/clearfetch/config.toml`.
//!
//! Every key is optional; a missing file means all defaults. Set
//! `CLEARFETCH_CONFIG` to load a different file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{FetchError, Result};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "CLEARFETCH_CONFIG";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Capture file produced by the cookie-prep step
    pub cookie_file: PathBuf,
    /// Directory the artifacts are written to
    pub output_dir: PathBuf,
    /// Whole-request deadline, body included
    pub timeout_secs: u64,
    /// Cookie the target requires before a request is worth sending
    pub clearance_cookie: String,
    /// Session cookie reported after the request (informational)
    pub session_cookie: String,
    pub artifacts: ArtifactNames,
    pub pool: PoolConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cookie_file: PathBuf::from("shared/scripts/captured_cookies.json"),
            output_dir: PathBuf::from("shared/scripts"),
            timeout_secs: 60,
            clearance_cookie: "cf_clearance".to_string(),
            session_cookie: "ASP.NET_SessionId".to_string(),
            artifacts: ArtifactNames::default(),
            pool: PoolConfig::default(),
        }
    }
}

/// File names of the three artifacts, relative to `output_dir`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactNames {
    pub body: PathBuf,
    pub redirects: PathBuf,
    pub cookies: PathBuf,
}

impl Default for ArtifactNames {
    fn default() -> Self {
        Self {
            body: PathBuf::from("final_page.html"),
            redirects: PathBuf::from("redirect_history.json"),
            cookies: PathBuf::from("captured_purchase_cookies.json"),
        }
    }
}

/// Connection pool tuning
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    pub max_idle_per_host: usize,
    pub idle_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 100,
            idle_timeout_secs: 90,
            connect_timeout_secs: 10,
        }
    }
}

impl PoolConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Resolved artifact locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub body: PathBuf,
    pub redirects: PathBuf,
    pub cookies: PathBuf,
}

impl Config {
    /// Load from `$CLEARFETCH_CONFIG` or the user config directory.
    ///
    /// Returns defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV).map_or_else(default_path, PathBuf::from);
        Self::from_path(&path)
    }

    /// Load from an explicit path; a missing file yields defaults
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| FetchError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| FetchError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if config.timeout_secs == 0 {
            return Err(FetchError::Config {
                path: path.to_path_buf(),
                reason: "timeout_secs must be greater than zero".to_string(),
            });
        }

        debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            body: self.output_dir.join(&self.artifacts.body),
            redirects: self.output_dir.join(&self.artifacts.redirects),
            cookies: self.output_dir.join(&self.artifacts.cookies),
        }
    }
}

/// Return the path to the default config file.
fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("clearfetch")
        .join("config.toml")
}
