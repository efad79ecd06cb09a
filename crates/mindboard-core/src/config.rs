//! Dashboard configuration
//!
//! Loaded from `<config_dir>/mindboard/config.toml` (or an explicit path).
//! Every field has a default, so a missing file or a partial file both work.

use crate::error::CoreError;
use crate::models::ViewMode;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration for loading and presenting the survey
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Youngest age kept at load time
    pub min_age: u8,

    /// Oldest age kept at load time
    pub max_age: u8,

    /// Stress/depression/anxiety scores at or above this count as elevated
    pub severity_threshold: u8,

    /// Heat map cells change colour every `heat_bucket_size` respondents
    pub heat_bucket_size: u32,

    /// Dots per line in the dot matrix
    pub dots_per_line: usize,

    /// View shown at startup
    pub default_view_mode: ViewMode,

    /// Capacity of the broadcast mirror of the event bus
    pub bus_capacity: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            min_age: 18,
            max_age: 24,
            severity_threshold: 3,
            heat_bucket_size: 50,
            dots_per_line: 112,
            default_view_mode: ViewMode::Listed,
            bus_capacity: 256,
        }
    }
}

impl DashboardConfig {
    /// Ages kept at load time (and shown on the heat map axis)
    pub fn age_range(&self) -> RangeInclusive<u8> {
        self.min_age..=self.max_age
    }

    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("mindboard").join("config.toml"))
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(CoreError::FileRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: Self = toml::from_str(&content).map_err(|source| CoreError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Load from the explicit path if given, else from the default location
    pub fn discover(explicit: Option<&Path>) -> Result<Self, CoreError> {
        match explicit.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.min_age > self.max_age {
            return Err(CoreError::InvalidConfig {
                message: format!(
                    "min_age ({}) is greater than max_age ({})",
                    self.min_age, self.max_age
                ),
            });
        }
        if self.heat_bucket_size == 0 {
            return Err(CoreError::InvalidConfig {
                message: "heat_bucket_size must be positive".to_string(),
            });
        }
        if self.dots_per_line == 0 {
            return Err(CoreError::InvalidConfig {
                message: "dots_per_line must be positive".to_string(),
            });
        }
        if self.bus_capacity == 0 {
            return Err(CoreError::InvalidConfig {
                message: "bus_capacity must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = DashboardConfig::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.age_range(), 18..=24);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "severity_threshold = 4\ndefault_view_mode = \"overall\"\n").unwrap();

        let config = DashboardConfig::load(&path).unwrap();
        assert_eq!(config.severity_threshold, 4);
        assert_eq!(config.default_view_mode, ViewMode::Overall);
        assert_eq!(config.heat_bucket_size, 50);
    }

    #[test]
    fn test_invalid_age_range_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "min_age = 30\nmax_age = 20\n").unwrap();

        let err = DashboardConfig::load(&path).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { .. }));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "min_age = \"eighteen\"").unwrap();

        let err = DashboardConfig::load(&path).unwrap_err();
        assert!(matches!(err, CoreError::ConfigParse { .. }));
    }
}
