//! Configuration management for Blitz.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/blitz/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Browser launch settings
    pub browser: BrowserConfig,
    /// Form automation timings and heuristics
    pub automation: AutomationConfig,
    /// Batch application settings
    pub batch: BatchConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file path.
    ///
    /// Unlike [`AppConfig::load`], a missing file is an error here.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `BLITZ_HEADLESS`: Override browser headless mode (true/false)
    /// - `BLITZ_NAVIGATION_TIMEOUT_SECS`: Override the navigation timeout
    /// - `BLITZ_MAX_CONCURRENT`: Override the batch concurrency limit
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup function.
    ///
    /// Values that fail to parse are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("BLITZ_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Some(val) = lookup("BLITZ_NAVIGATION_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.browser.navigation_timeout_secs = secs;
                tracing::debug!("Override browser.navigation_timeout_secs from env: {}", secs);
            }
        }

        if let Some(val) = lookup("BLITZ_MAX_CONCURRENT") {
            if let Ok(max) = val.parse() {
                self.batch.max_concurrent = max;
                tracing::debug!("Override batch.max_concurrent from env: {}", max);
            }
        }
    }

    /// Check value constraints that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.browser.navigation_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "browser.navigation_timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.batch.max_concurrent == 0 {
            return Err(ConfigError::InvalidValue {
                field: "batch.max_concurrent".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/blitz/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "blitz", "blitz").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Browser launch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Navigation timeout in seconds
    pub navigation_timeout_secs: u64,
    /// Pick a random desktop user agent for each launch
    pub randomize_fingerprint: bool,
}

impl BrowserConfig {
    /// Navigation timeout as a `Duration`.
    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1280,
            window_height: 720,
            navigation_timeout_secs: 30,
            randomize_fingerprint: true,
        }
    }
}

/// Which radio controls a radio field may select from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadioScope {
    /// Radios sharing the field's `name`, falling back to the whole page
    #[default]
    Group,
    /// Every radio on the page
    Page,
}

/// Settle delays and detection heuristics for form automation.
///
/// The delays are debounce waits for DOM settlement, not correctness barriers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    /// Wait after navigation before extracting anything, in milliseconds
    pub post_navigation_settle_ms: u64,
    /// Wait after a probing click on a custom widget, in milliseconds
    pub probe_settle_ms: u64,
    /// Wait after clicking a submit control, in milliseconds
    pub submit_settle_ms: u64,
    /// Wait before tearing the browser down, in milliseconds
    pub teardown_grace_ms: u64,
    /// Allow clicking custom widgets to classify them
    pub interactive_probing: bool,
    /// Candidate set for radio fields
    pub radio_scope: RadioScope,
}

impl AutomationConfig {
    /// Configuration with every settle delay set to zero.
    #[must_use]
    pub fn without_delays() -> Self {
        Self {
            post_navigation_settle_ms: 0,
            probe_settle_ms: 0,
            submit_settle_ms: 0,
            teardown_grace_ms: 0,
            ..Self::default()
        }
    }
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            post_navigation_settle_ms: 2000,
            probe_settle_ms: 500,
            submit_settle_ms: 2000,
            teardown_grace_ms: 3000,
            interactive_probing: true,
            radio_scope: RadioScope::Group,
        }
    }
}

/// Batch application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum number of applications running at once
    pub max_concurrent: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { max_concurrent: 3 }
    }
}
