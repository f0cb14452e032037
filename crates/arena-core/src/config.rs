//! Configuration loading and typed config structures for the Arena
//! platform.
//!
//! The canonical configuration lives in `arena-config.yaml` next to the
//! engine binary. This module defines strongly-typed structs that mirror the
//! YAML structure and a loader that reads the file. Every field has a
//! default, so an empty file (or no file) is a valid configuration.

use std::path::Path;

use serde::Deserialize;

/// Ticks of inactivity before a player is disqualified when the inactivity
/// policy is enabled: 30 minutes at the default one tick per second.
pub const DEFAULT_MAX_IDLE_TICKS: u64 = 60 * 30;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level platform configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArenaConfig {
    /// Tick driver settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Inactivity disqualification policy.
    #[serde(default)]
    pub inactivity: InactivityConfig,
}

impl ArenaConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `ARENA_TICK_INTERVAL_MS` overrides `engine.tick_interval_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.engine.apply_env_overrides();
        Ok(config)
    }
}

/// Tick driver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Real-time milliseconds between tick passes.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Stop after this many passes (0 = run until stopped).
    #[serde(default)]
    pub max_ticks: u64,
}

impl EngineConfig {
    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Some(ms) = std::env::var("ARENA_TICK_INTERVAL_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
        {
            self.tick_interval_ms = ms;
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: 0,
        }
    }
}

/// Inactivity disqualification policy.
///
/// Off by default. When enabled, every tick pass unbinds players the
/// statistics collector reports as idle for at least `max_idle_ticks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct InactivityConfig {
    /// Whether idle players are removed.
    #[serde(default)]
    pub enabled: bool,

    /// Idle ticks that trigger removal.
    #[serde(default = "default_max_idle_ticks")]
    pub max_idle_ticks: u64,
}

impl Default for InactivityConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_idle_ticks: default_max_idle_ticks(),
        }
    }
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

const fn default_max_idle_ticks() -> u64 {
    DEFAULT_MAX_IDLE_TICKS
}
