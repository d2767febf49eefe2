//! Configuration file support.
//!
//! Loads ${MCTAIL_HOME}/config.toml with sensible defaults; every key can
//! be overridden on the command line.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::sink::ColorMode;

pub mod paths {
    //! Path resolution for the config directory.
    //!
    //! MCTAIL_HOME resolution order:
    //! 1. MCTAIL_HOME environment variable (if set)
    //! 2. ~/.config/mctail (default)

    use std::path::PathBuf;

    /// Returns the mctail home directory.
    pub fn mctail_home() -> PathBuf {
        if let Some(home) = std::env::var_os("MCTAIL_HOME") {
            return PathBuf::from(home);
        }
        std::env::var_os("HOME")
            .map(|h| PathBuf::from(h).join(".config").join("mctail"))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        mctail_home().join("config.toml")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory containing the debug fifos.
    pub fifo_root: PathBuf,

    /// Do not display message values.
    pub quiet: bool,

    /// When to colorize output.
    pub color: ColorMode,
}

impl Config {
    const DEFAULT_FIFO_ROOT: &str = "/var/mcrouter/fifos";

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fifo_root: PathBuf::from(Self::DEFAULT_FIFO_ROOT),
            quiet: false,
            color: ColorMode::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    /// Config loading: missing file returns defaults.
    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.fifo_root, PathBuf::from("/var/mcrouter/fifos"));
        assert!(!config.quiet);
        assert_eq!(config.color, ColorMode::Auto);
    }

    /// Config loading: partial config merges with defaults.
    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "quiet = true\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert!(config.quiet);
        assert_eq!(config.fifo_root, PathBuf::from("/var/mcrouter/fifos"));
    }

    /// Color mode parses from its lowercase spelling.
    #[test]
    fn test_load_color_mode() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "color = \"never\"\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.color, ColorMode::Never);
    }

    /// Malformed config is an error, not a silent default.
    #[test]
    fn test_load_malformed_config_fails() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "quiet = \"very\"\n").unwrap();

        assert!(Config::load_from(&config_path).is_err());
    }
}
