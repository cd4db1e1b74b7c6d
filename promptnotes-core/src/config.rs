//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/promptnotes/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/promptnotes/` (~/.config/promptnotes/)
//! - State/Logs: `$XDG_STATE_HOME/promptnotes/` (~/.local/state/promptnotes/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Notes storage configuration
    #[serde(default)]
    pub notes: NotesConfig,

    /// Replication configuration
    #[serde(default)]
    pub replicate: ReplicateConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where annotations land in the repository
#[derive(Debug, Deserialize, Clone)]
pub struct NotesConfig {
    /// Ref name under refs/notes/ that notes are attached to
    #[serde(rename = "ref", default = "default_notes_ref")]
    pub ref_name: String,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            ref_name: default_notes_ref(),
        }
    }
}

fn default_notes_ref() -> String {
    "prompts".to_string()
}

/// Best-effort push of the notes ref after each attach
#[derive(Debug, Deserialize, Clone)]
pub struct ReplicateConfig {
    /// Enable/disable the push
    #[serde(default = "default_replicate_enabled")]
    pub enabled: bool,

    /// Remote to push the notes ref to
    #[serde(default = "default_remote")]
    pub remote: String,
}

impl Default for ReplicateConfig {
    fn default() -> Self {
        Self {
            enabled: default_replicate_enabled(),
            remote: default_remote(),
        }
    }
}

fn default_replicate_enabled() -> bool {
    true
}

fn default_remote() -> String {
    "origin".to_string()
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/promptnotes/config.toml` (~/.config/promptnotes/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("promptnotes").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/promptnotes/` (~/.local/state/promptnotes/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("promptnotes")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/promptnotes/promptnotes.log` (~/.local/state/promptnotes/promptnotes.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("promptnotes.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path behavior
    /// before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.notes.ref_name, "prompts");
        assert!(config.replicate.enabled);
        assert_eq!(config.replicate.remote, "origin");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[notes]
ref = "session-prompts"

[replicate]
enabled = false
remote = "backup"

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.notes.ref_name, "session-prompts");
        assert!(!config.replicate.enabled);
        assert_eq!(config.replicate.remote, "backup");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let toml = r#"
[replicate]
enabled = false
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.notes.ref_name, "prompts");
        assert!(!config.replicate.enabled);
        assert_eq!(config.replicate.remote, "origin");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_unparseable_config_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is not toml [[[").unwrap();

        let result = Config::load_from(&path);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
