pub mod validator;

use crate::tracking::RegistryOptions;
use crate::utils::permissions::CopyOptions;
use crate::{METADATA_DIR, REGISTRY_FILE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub core: CoreConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CoreConfig {
    /// Directory used when no `--dir` is given (falls back to the current directory)
    #[serde(default)]
    pub default_directory: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingConfig {
    #[serde(default = "default_metadata_dir")]
    pub metadata_dir: String,
    #[serde(default = "default_registry_file")]
    pub registry_file: String,
    #[serde(default = "default_true")]
    pub preserve_permissions: bool,
    #[serde(default = "default_true")]
    pub preserve_mtime: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            metadata_dir: default_metadata_dir(),
            registry_file: default_registry_file(),
            preserve_permissions: true,
            preserve_mtime: true,
        }
    }
}

impl TrackingConfig {
    /// Registry layout and copy behaviour described by this section
    #[must_use]
    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions {
            metadata_dir: self.metadata_dir.clone(),
            registry_file: self.registry_file.clone(),
            copy: CopyOptions {
                preserve_permissions: self.preserve_permissions,
                preserve_mtime: self.preserve_mtime,
            },
        }
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot read or parse the configuration file
    /// - Configuration file contains invalid TOML or invalid values
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            // Create default config if it doesn't exist
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a value is invalid.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML config")?;
        validator::validate_values(&config)?;
        Ok(config)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }

    /// Get a configuration value by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let (section, name) = key.split_once('.')?;

        match (section, name) {
            ("core", "default_directory") => self
                .core
                .default_directory
                .as_ref()
                .map(|p| p.display().to_string()),
            ("tracking", "metadata_dir") => Some(self.tracking.metadata_dir.clone()),
            ("tracking", "registry_file") => Some(self.tracking.registry_file.clone()),
            ("tracking", "preserve_permissions") => {
                Some(self.tracking.preserve_permissions.to_string())
            }
            ("tracking", "preserve_mtime") => Some(self.tracking.preserve_mtime.to_string()),
            _ => None,
        }
    }

    /// Set a configuration value by key
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The key format is invalid (must be section.key)
    /// - The key is unknown
    /// - The value is invalid for the key
    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        let Some((section, name)) = key.split_once('.') else {
            anyhow::bail!("Invalid configuration key: {key}");
        };

        let mut updated = self.clone();
        match (section, name) {
            ("core", "default_directory") => {
                updated.core.default_directory = Some(crate::utils::expand_tilde(&value)?);
            }
            ("tracking", "metadata_dir") => updated.tracking.metadata_dir = value,
            ("tracking", "registry_file") => updated.tracking.registry_file = value,
            ("tracking", "preserve_permissions") => {
                updated.tracking.preserve_permissions = value
                    .parse()
                    .with_context(|| format!("Invalid boolean: {value}"))?;
            }
            ("tracking", "preserve_mtime") => {
                updated.tracking.preserve_mtime = value
                    .parse()
                    .with_context(|| format!("Invalid boolean: {value}"))?;
            }
            _ => anyhow::bail!("Unknown configuration key: {key}"),
        }

        validator::validate_values(&updated)?;
        *self = updated;
        Ok(())
    }

    /// Unset a configuration value by key
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or cannot be unset.
    pub fn unset(&mut self, key: &str) -> Result<()> {
        match key {
            "core.default_directory" => self.core.default_directory = None,
            _ => anyhow::bail!("Cannot unset configuration key: {key}"),
        }
        Ok(())
    }

    /// All settable keys with their current values, in display order
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        validator::KNOWN_KEYS
            .iter()
            .map(|key| (*key, self.get(key).unwrap_or_default()))
            .collect()
    }
}

// Default functions for serde
fn default_metadata_dir() -> String {
    METADATA_DIR.to_string()
}

fn default_registry_file() -> String {
    REGISTRY_FILE.to_string()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_creates_default() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("retrace").join("config.toml");

        let config = Config::load(&path)?;
        assert!(path.exists());
        assert_eq!(config, Config::default());
        assert_eq!(config.tracking.metadata_dir, ".tracking");
        assert_eq!(config.tracking.registry_file, "tracking_files.json");
        Ok(())
    }

    #[test]
    fn test_save_load_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.set("tracking.preserve_mtime", "false".to_string())?;
        config.set("core.default_directory", "/srv/notes".to_string())?;
        config.save(&path)?;

        let loaded = Config::load(&path)?;
        assert_eq!(loaded, config);
        assert!(!loaded.tracking.preserve_mtime);
        Ok(())
    }

    #[test]
    fn test_partial_file_uses_defaults() -> Result<()> {
        let config = Config::parse("[tracking]\npreserve_permissions = false\n")?;
        assert!(!config.tracking.preserve_permissions);
        assert!(config.tracking.preserve_mtime);
        assert_eq!(config.tracking.metadata_dir, METADATA_DIR);
        Ok(())
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("tracking.preserve_mtime", "maybe".to_string()).is_err());
        assert!(config.set("tracking.metadata_dir", "a/b".to_string()).is_err());
        assert!(config.set("nosection", "x".to_string()).is_err());
        assert!(config.set("core.unknown", "x".to_string()).is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_get_and_unset() -> Result<()> {
        let mut config = Config::default();
        assert_eq!(config.get("core.default_directory"), None);
        assert_eq!(config.get("tracking.preserve_permissions").as_deref(), Some("true"));

        config.set("core.default_directory", "/data".to_string())?;
        assert_eq!(config.get("core.default_directory").as_deref(), Some("/data"));
        config.unset("core.default_directory")?;
        assert_eq!(config.get("core.default_directory"), None);
        assert!(config.unset("tracking.metadata_dir").is_err());
        Ok(())
    }

    #[test]
    fn test_registry_options_follow_config() {
        let mut config = Config::default();
        config.tracking.preserve_permissions = false;
        let options = config.tracking.registry_options();
        assert!(!options.copy.preserve_permissions);
        assert!(options.copy.preserve_mtime);
        assert_eq!(options.metadata_dir, METADATA_DIR);
    }
}
