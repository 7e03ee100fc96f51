//! Application configuration.
//!
//! Values are layered, lowest precedence first: built-in defaults, a TOML
//! file (see [`file`]), environment variables, then whatever the caller
//! (usually the CLI) applies on top as [`ConfigOverrides`]. The merged result
//! is checked with [`AppConfig::validate`].
//!
//! # Environment Variables
//! - `CARDIO_ENV`: `development` | `production`, selects the default base URL
//! - `CARDIO_API_URL`: explicit base URL of the prediction service
//! - `CARDIO_TIMEOUT_SECS`: request timeout in seconds
//! - `CARDIO_ENFORCE_RANGES`: `true` to block out-of-range submissions

pub mod file;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEVELOPMENT_URL: &str = "http://localhost:5000";
pub const PRODUCTION_URL: &str = "https://cardio-disease-detection.vercel.app/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse config file: {0}")]
    Parse(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Deployment environment, used only to pick a default base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn default_base_url(self) -> &'static str {
        match self {
            Environment::Development => DEVELOPMENT_URL,
            Environment::Production => PRODUCTION_URL,
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::InvalidValue {
                key: "environment".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Production => f.write_str("production"),
        }
    }
}

/// Where and how to reach the prediction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub environment: Environment,
    /// Overrides the environment's default URL when set.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ServiceConfig {
    /// Configuration pointing at an explicit URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Default::default()
        }
    }

    /// Base URL actually used for requests.
    pub fn resolved_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.default_base_url())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// What "Start New Analysis" does to the form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResetPolicy {
    /// Re-create the form with its default values.
    #[default]
    RestoreDefaults,
    /// Keep the values that produced the last result.
    KeepEdits,
}

impl FromStr for ResetPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "restore-defaults" | "defaults" => Ok(ResetPolicy::RestoreDefaults),
            "keep-edits" | "keep" => Ok(ResetPolicy::KeepEdits),
            other => Err(ConfigError::InvalidValue {
                key: "reset_policy".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Form behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FormConfig {
    /// Block submission when a field is outside its advisory range.
    #[serde(default)]
    pub enforce_ranges: bool,
    #[serde(default)]
    pub reset_policy: ResetPolicy,
}

/// Full application configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub form: FormConfig,
}

impl AppConfig {
    /// Overlay environment values read through `lookup`.
    ///
    /// Unset or empty variables leave the current value untouched.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(value) = get("CARDIO_ENV") {
            self.service.environment = value.parse()?;
        }
        if let Some(value) = get("CARDIO_API_URL") {
            self.service.base_url = Some(value.trim().to_string());
        }
        if let Some(value) = get("CARDIO_TIMEOUT_SECS") {
            self.service.timeout_secs =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: "CARDIO_TIMEOUT_SECS".to_string(),
                        value: value.clone(),
                    })?;
        }
        if let Some(value) = get("CARDIO_ENFORCE_RANGES") {
            self.form.enforce_ranges = parse_bool(&value).ok_or_else(|| {
                ConfigError::InvalidValue {
                    key: "CARDIO_ENFORCE_RANGES".to_string(),
                    value: value.clone(),
                }
            })?;
        }
        Ok(())
    }

    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_secs".to_string(),
                value: "0 (must be at least 1 second)".to_string(),
            });
        }
        if let Some(url) = &self.service.base_url {
            if url.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "base_url".to_string(),
                    value: "(empty)".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Explicit settings applied last, above file and environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub environment: Option<Environment>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Only ever switches enforcement on.
    pub enforce_ranges: bool,
    pub reset_policy: Option<ResetPolicy>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(environment) = self.environment {
            config.service.environment = environment;
        }
        if let Some(url) = &self.base_url {
            config.service.base_url = Some(url.clone());
        }
        if let Some(timeout) = self.timeout_secs {
            config.service.timeout_secs = timeout;
        }
        if self.enforce_ranges {
            config.form.enforce_ranges = true;
        }
        if let Some(policy) = self.reset_policy {
            config.form.reset_policy = policy;
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
