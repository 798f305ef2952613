//! Configuration file loading with precedence handling.

use crate::engine::{AutoScrollConfig, EngineConfig};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "DRAGORDER_CONFIG";
/// Environment override for the auto-scroll base speed.
pub const AUTOSCROLL_SPEED_ENV: &str = "DRAGORDER_AUTOSCROLL_SPEED";
/// Environment override for the activation delay in milliseconds.
pub const ACTIVATION_DELAY_ENV: &str = "DRAGORDER_ACTIVATION_DELAY_MS";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/dragorder/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Hold time before a press on a drag handle starts a drag.
    #[serde(default)]
    pub activation_delay_ms: Option<u64>,

    /// Depth of the auto-scroll edge zones in px.
    #[serde(default)]
    pub autoscroll_threshold: Option<f32>,

    /// Auto-scroll distance per tick at full zone depth.
    #[serde(default)]
    pub autoscroll_speed: Option<f32>,

    /// Minimum auto-scroll distance per tick inside a zone.
    #[serde(default)]
    pub autoscroll_min_speed: Option<f32>,

    /// Auto-scroll timer period.
    #[serde(default)]
    pub autoscroll_tick_ms: Option<u64>,

    /// Height assumed for rows that have not been measured.
    #[serde(default)]
    pub default_item_height: Option<f32>,

    /// Length of the release animation; 0 commits on release.
    #[serde(default)]
    pub settle_duration_ms: Option<u64>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Activation delay in milliseconds.
    pub activation_delay_ms: u64,
    /// Edge zone depth.
    pub autoscroll_threshold: f32,
    /// Full-depth scroll speed per tick.
    pub autoscroll_speed: f32,
    /// Minimum scroll speed per tick.
    pub autoscroll_min_speed: f32,
    /// Timer period in milliseconds.
    pub autoscroll_tick_ms: u64,
    /// Fallback row height.
    pub default_item_height: f32,
    /// Release animation length in milliseconds.
    pub settle_duration_ms: u64,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            activation_delay_ms: 200,
            autoscroll_threshold: 80.0,
            autoscroll_speed: 10.0,
            autoscroll_min_speed: 1.0,
            autoscroll_tick_ms: 16,
            default_item_height: 50.0,
            settle_duration_ms: 150,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Engine tuning for these settings.
    ///
    /// A zero tick would spin the timer thread, so it is raised to 1 ms.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            activation_delay: Duration::from_millis(self.activation_delay_ms),
            autoscroll: AutoScrollConfig {
                threshold: self.autoscroll_threshold,
                speed: self.autoscroll_speed,
                min_speed: self.autoscroll_min_speed,
                tick: Duration::from_millis(self.autoscroll_tick_ms.max(1)),
            },
            default_item_height: self.default_item_height,
            settle_duration: Duration::from_millis(self.settle_duration_ms),
            ..EngineConfig::default()
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/dragorder/dragorder.log` on Linux, or the
/// platform's state directory elsewhere.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("dragorder").join("dragorder.log")
    } else {
        PathBuf::from("dragorder.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/dragorder/config.toml` on Linux, appropriate path on
/// other platforms. Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dragorder").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `DRAGORDER_CONFIG` environment variable
/// 3. Default path `~/.config/dragorder/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    match std::env::var(CONFIG_ENV) {
        Ok(env_path) if env_path.is_empty() => {
            return Err(ConfigError::InvalidPath(format!("{CONFIG_ENV} is set but empty")));
        }
        Ok(env_path) => return load_config_file(PathBuf::from(env_path)),
        Err(std::env::VarError::NotUnicode(raw)) => {
            return Err(ConfigError::InvalidPath(raw.to_string_lossy().into_owned()));
        }
        Err(std::env::VarError::NotPresent) => {}
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `DRAGORDER_AUTOSCROLL_SPEED`: auto-scroll base speed
/// - `DRAGORDER_ACTIVATION_DELAY_MS`: activation delay
///
/// Values that do not parse are logged and ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(raw) = std::env::var(AUTOSCROLL_SPEED_ENV) {
        match raw.trim().parse::<f32>() {
            Ok(speed) if is_positive(speed) => config.autoscroll_speed = speed,
            _ => warn!(value = %raw, "Ignoring invalid {AUTOSCROLL_SPEED_ENV}"),
        }
    }

    if let Ok(raw) = std::env::var(ACTIVATION_DELAY_ENV) {
        match raw.trim().parse::<u64>() {
            Ok(delay) => config.activation_delay_ms = delay,
            Err(_) => warn!(value = %raw, "Ignoring invalid {ACTIVATION_DELAY_ENV}"),
        }
    }

    config
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// `value` if it is finite and above zero, otherwise `default`.
///
/// Rejected values are logged under `field`.
fn positive_or(field: &str, value: Option<f32>, default: f32) -> f32 {
    match value {
        Some(value) if is_positive(value) => value,
        Some(value) => {
            warn!(field, value, default, "Ignoring non-positive config value");
            default
        }
        None => default,
    }
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
/// Speeds, the zone depth and the fallback row height must be finite and
/// above zero; anything else falls back to the default with a warning.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        activation_delay_ms: config
            .activation_delay_ms
            .unwrap_or(defaults.activation_delay_ms),
        autoscroll_threshold: positive_or(
            "autoscroll_threshold",
            config.autoscroll_threshold,
            defaults.autoscroll_threshold,
        ),
        autoscroll_speed: positive_or(
            "autoscroll_speed",
            config.autoscroll_speed,
            defaults.autoscroll_speed,
        ),
        autoscroll_min_speed: positive_or(
            "autoscroll_min_speed",
            config.autoscroll_min_speed,
            defaults.autoscroll_min_speed,
        ),
        autoscroll_tick_ms: config
            .autoscroll_tick_ms
            .unwrap_or(defaults.autoscroll_tick_ms),
        default_item_height: positive_or(
            "default_item_height",
            config.default_item_height,
            defaults.default_item_height,
        ),
        settle_duration_ms: config
            .settle_duration_ms
            .unwrap_or(defaults.settle_duration_ms),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
/// A speed that is not finite and above zero is logged and ignored.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    activation_delay_override: Option<u64>,
    autoscroll_speed_override: Option<f32>,
) -> ResolvedConfig {
    if let Some(delay) = activation_delay_override {
        config.activation_delay_ms = delay;
    }

    config.autoscroll_speed = positive_or(
        "autoscroll_speed",
        autoscroll_speed_override,
        config.autoscroll_speed,
    );

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
