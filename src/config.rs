//! Engine configuration loading and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "SETTINGS_TREE_CONFIG_PATH";

/// Environment variable overriding `paths.config_dir`.
pub const CONFIG_DIR_ENV: &str = "SETTINGS_TREE_CONFIG_DIR";

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "settings-tree.yaml";

/// Engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub presets: PresetsConfig,

    #[serde(default)]
    pub guids: GuidsConfig,
}

/// Where store files live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding `<guid>.config` and `<guid>_presets/`.
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
        }
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("settings-tree"))
        .unwrap_or_else(|| PathBuf::from(".settings-tree"))
}

/// Preset manager behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetsConfig {
    /// Adopt unindexed preset files when a configurator opens.
    #[serde(default = "default_discover_on_open")]
    pub discover_on_open: bool,

    /// Words in generated preset file ids.
    #[serde(default = "default_id_words")]
    pub id_words: u8,
}

impl Default for PresetsConfig {
    fn default() -> Self {
        Self {
            discover_on_open: default_discover_on_open(),
            id_words: default_id_words(),
        }
    }
}

fn default_discover_on_open() -> bool {
    true
}

fn default_id_words() -> u8 {
    2
}

/// Guid uniqueness handling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuidsConfig {
    #[serde(default)]
    pub policy: GuidPolicy,
}

/// What to do when two strict fields share a guid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidPolicy {
    /// Log a warning; the later registration wins.
    #[default]
    Diagnostic,
    /// Refuse the second registration.
    Reject,
}

impl EngineConfig {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: EngineConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        debug!(path = %path.display(), "Loaded engine config");
        Ok(config)
    }

    /// Load from an explicit path, `SETTINGS_TREE_CONFIG_PATH`, or
    /// `./settings-tree.yaml`, falling back to defaults. Environment
    /// overrides apply last.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match std::env::var_os(CONFIG_PATH_ENV) {
                Some(path) => Self::load(PathBuf::from(path))?,
                None => Self::load_or_default(),
            },
        };
        config.apply_env();
        Ok(config)
    }

    /// Load `./settings-tree.yaml` if present, otherwise defaults.
    pub fn load_or_default() -> Self {
        if Path::new(DEFAULT_CONFIG_FILE).exists()
            && let Ok(config) = Self::load(DEFAULT_CONFIG_FILE)
        {
            return config;
        }
        Self::default()
    }

    /// Apply environment overrides.
    pub fn apply_env(&mut self) {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            self.paths.config_dir = PathBuf::from(dir);
        }
    }

    /// Defaults rooted at `dir`. Used by tests and embedded hosts.
    pub fn with_config_dir(dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.paths.config_dir = dir.into();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.presets.discover_on_open);
        assert_eq!(config.presets.id_words, 2);
        assert_eq!(config.guids.policy, GuidPolicy::Diagnostic);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: EngineConfig = serde_yaml::from_str(
            "presets:\n  discover_on_open: false\nguids:\n  policy: reject\n",
        )
        .unwrap();
        assert!(!config.presets.discover_on_open);
        assert_eq!(config.presets.id_words, 2);
        assert_eq!(config.guids.policy, GuidPolicy::Reject);
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("engine.yaml");
        std::fs::write(&path, "paths:\n  config_dir: /tmp/st\n").unwrap();
        let config = EngineConfig::resolve(Some(&path)).unwrap();
        // env override may be set by the caller's environment
        if std::env::var_os(CONFIG_DIR_ENV).is_none() {
            assert_eq!(config.paths.config_dir, PathBuf::from("/tmp/st"));
        }
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let temp = TempDir::new().unwrap();
        assert!(EngineConfig::resolve(Some(&temp.path().join("nope.yaml"))).is_err());
    }
}
