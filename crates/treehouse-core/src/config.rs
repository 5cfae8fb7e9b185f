//! Configuration handling for treehouse
//!
//! Every field has a default, so a missing or partial `config.toml` is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TreehouseError;

/// Treehouse configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Scan settings
    #[serde(default)]
    pub scan: ScanConfig,

    /// Sidecar file names and markers
    #[serde(default)]
    pub sidecar: SidecarConfig,

    /// GitHub lookups
    #[serde(default)]
    pub github: GitHubConfig,
}

/// Scan settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Directory whose immediate children are scanned (`~` is expanded)
    #[serde(default = "default_scan_directory")]
    pub directory: String,

    /// Upper bound for any single git/gh invocation
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,

    /// Number of candidates processed at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Interval between scans in watch mode
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

/// Sidecar files written into worktrees by an external agent process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidecarConfig {
    #[serde(default = "default_origin_file")]
    pub origin_file: String,

    /// `origin` value that marks an automated worktree
    #[serde(default = "default_automated_marker")]
    pub automated_marker: String,

    #[serde(default = "default_status_file")]
    pub status_file: String,

    /// `status` value that marks a running agent
    #[serde(default = "default_active_marker")]
    pub active_marker: String,

    /// Heartbeat freshness window
    #[serde(default = "default_freshness_secs")]
    pub freshness_secs: u64,
}

/// GitHub lookups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Query `gh` for PR state during scans
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_scan_directory() -> String {
    "~/Projects".to_string()
}

fn default_command_timeout_secs() -> u64 {
    10
}

fn default_max_concurrency() -> usize {
    8
}

fn default_refresh_interval_secs() -> u64 {
    30
}

fn default_origin_file() -> String {
    ".claude-surf-meta.json".to_string()
}

fn default_automated_marker() -> String {
    "robot-surf".to_string()
}

fn default_status_file() -> String {
    ".claude-surf-status.json".to_string()
}

fn default_active_marker() -> String {
    "active".to_string()
}

fn default_freshness_secs() -> u64 {
    5 * 60
}

fn default_true() -> bool {
    true
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            directory: default_scan_directory(),
            command_timeout_secs: default_command_timeout_secs(),
            max_concurrency: default_max_concurrency(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

impl Default for SidecarConfig {
    fn default() -> Self {
        Self {
            origin_file: default_origin_file(),
            automated_marker: default_automated_marker(),
            status_file: default_status_file(),
            active_marker: default_active_marker(),
            freshness_secs: default_freshness_secs(),
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl ScanConfig {
    /// Per-command timeout, never shorter than one second
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.max(1))
    }

    /// Scan directory with `~` expanded
    pub fn scan_dir(&self) -> PathBuf {
        expand_home(&self.directory)
    }
}

impl Config {
    /// Default location: `<config dir>/treehouse/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("treehouse").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// tried and a missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, TreehouseError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(default) if default.is_file() => Self::from_file(&default),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, TreehouseError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TreehouseError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
            .map_err(|e| TreehouseError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self, TreehouseError> {
        toml::from_str(content).map_err(|e| TreehouseError::Config(e.to_string()))
    }
}

/// Expand a leading `~` to the user's home directory.
///
/// Paths without the shorthand, or environments without a home directory,
/// are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = if path == "~" {
        Some("")
    } else {
        path.strip_prefix("~/")
    };

    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
