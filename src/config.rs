//! Configuration management for the dutil command line
//!
//! Settings come from a TOML file (`dutil.toml` by default), then from
//! `DUTIL_*` environment variables, and are validated before use.

use std::path::Path;

use anyhow::{bail, Context, Result};
use dutil_core::ToolkitConfig;
use serde::{Deserialize, Serialize};

/// Config file read by [`AppConfig::load`] when present
pub const DEFAULT_CONFIG_FILE: &str = "dutil.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Container tuning passed to the toolkit
    pub toolkit: ToolkitConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load `dutil.toml` if it exists, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if Path::new(DEFAULT_CONFIG_FILE).exists() {
            Self::read_toml(DEFAULT_CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::read_toml(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn read_toml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Apply `DUTIL_LOG_LEVEL`, `DUTIL_POOL_FENCE` and `DUTIL_BLOCK_SIZE`
    /// as resolved by `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(level) = lookup("DUTIL_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(fence) = lookup("DUTIL_POOL_FENCE") {
            self.toolkit.pool.fence = match fence.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => bail!("Invalid DUTIL_POOL_FENCE value: {}", other),
            };
        }

        if let Some(size) = lookup("DUTIL_BLOCK_SIZE") {
            self.toolkit.pool.default_block_size = size
                .parse()
                .with_context(|| format!("Invalid DUTIL_BLOCK_SIZE value: {}", size))?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => bail!("Invalid log level: {}", other),
        }
        self.toolkit.validate().context("Invalid toolkit configuration")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn reads_sections_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[logging]\nlevel = \"debug\"\n\n[toolkit.pool]\nfence = true\n\n[toolkit.table]\ninitial_buckets = 64"
        )
        .unwrap();

        let config = AppConfig::read_toml(file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.toolkit.pool.fence);
        assert_eq!(config.toolkit.table.initial_buckets, 64);
        assert_eq!(config.toolkit.serialize, Default::default());
        config.validate().unwrap();
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(env(&[
                ("DUTIL_LOG_LEVEL", "warn"),
                ("DUTIL_POOL_FENCE", "on"),
                ("DUTIL_BLOCK_SIZE", "4096"),
            ]))
            .unwrap();
        assert_eq!(config.logging.level, "warn");
        assert!(config.toolkit.pool.fence);
        assert_eq!(config.toolkit.pool.default_block_size, 4096);
    }

    #[test]
    fn bad_overrides_are_rejected() {
        let mut config = AppConfig::default();
        assert!(config.apply_overrides(env(&[("DUTIL_POOL_FENCE", "maybe")])).is_err());
        assert!(config.apply_overrides(env(&[("DUTIL_BLOCK_SIZE", "big")])).is_err());
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut config = AppConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.toolkit.pool.default_block_size = 0;
        assert!(config.validate().is_err());
    }
}
