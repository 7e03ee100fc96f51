//! Configuration file support.
//!
//! ```toml
//! [service]
//! environment = "production"
//! base_url = "https://predict.example.org"
//! timeout_secs = 15
//!
//! [form]
//! enforce_ranges = true
//! reset_policy = "keep-edits"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use super::{AppConfig, ConfigError};

/// Locations searched by [`AppConfig::from_default_location`], in order.
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["cardio.toml", "config/cardio.toml"];

impl AppConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Load the first config file found in [`DEFAULT_CONFIG_PATHS`].
    ///
    /// Returns `Ok(None)` when none exists.
    pub fn from_default_location() -> Result<Option<Self>, ConfigError> {
        Self::search(DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from))
    }

    fn search<I>(paths: I) -> Result<Option<Self>, ConfigError>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        for path in paths {
            if path.exists() {
                log::debug!("Loading configuration from {}", path.display());
                return Self::from_file(&path).map(Some);
            }
        }
        Ok(None)
    }

    /// Resolve the configuration used by front ends: an explicit file (or the
    /// default location), then the process environment on top.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    fn load_with<F>(explicit: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => Self::from_default_location()?.unwrap_or_default(),
        };
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }
}
