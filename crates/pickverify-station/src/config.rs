//! Station configuration management.
//!
//! Configuration is read from TOML. Every section and key is optional; a
//! missing value takes the built-in default, so an empty file is a valid
//! configuration.
//!
//! ```toml
//! [workflow]
//! identity_code = "5QCPCM0QW"
//! box_label_code = "123456"
//!
//! [input]
//! idle_timeout_ms = 1000
//!
//! [device]
//! attached = true
//! deny_claim = false
//! name = "Mock Scanner"
//!
//! [station]
//! log_level = "info"
//! event_capacity = 64
//! feedback_capacity = 16
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use pickverify_core::constants::{
    BOX_LABEL_CODE, CODE_SEPARATOR, DEFAULT_EVENT_CHANNEL_CAPACITY,
    DEFAULT_FEEDBACK_CHANNEL_CAPACITY, DEFAULT_IDLE_TIMEOUT_MS, IDENTITY_CODE, NUL,
    SEPARATOR_CONTROL,
};
use serde::{Deserialize, Serialize};

use crate::state_machine::ExpectedCodes;

/// Log levels accepted in `[station] log_level`.
const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    pub workflow: WorkflowSettings,
    pub input: InputSettings,
    pub device: DeviceSettings,
    pub station: StationSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowSettings {
    /// Stage-1 code.
    pub identity_code: String,
    /// Stage-2 code.
    pub box_label_code: String,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            identity_code: IDENTITY_CODE.to_string(),
            box_label_code: BOX_LABEL_CODE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Idle interval after which a partial scan is discarded.
    pub idle_timeout_ms: u64,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// Simulate an attached scanner.
    pub attached: bool,
    /// Simulate another process holding the scanner.
    pub deny_claim: bool,
    /// Name of the simulated scanner.
    pub name: String,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            attached: true,
            deny_claim: false,
            name: "Mock Scanner".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationSettings {
    pub log_level: String,
    /// Capacity of the serialized input channel.
    pub event_capacity: usize,
    /// Capacity of the feedback broadcast channel.
    pub feedback_capacity: usize,
}

impl Default for StationSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            event_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            feedback_capacity: DEFAULT_FEEDBACK_CHANNEL_CAPACITY,
        }
    }
}

impl StationConfig {
    /// Load configuration from `path`, or from the default location.
    ///
    /// Without an explicit path a missing file at [`default_path`](Self::default_path)
    /// means built-in defaults. A file that exists but cannot be read, parsed
    /// or validated is an error either way.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_at(&path, true),
            None => Self::load_at(&Self::default_path(), false),
        }
    }

    fn load_at(path: &Path, required: bool) -> Result<Self> {
        if !required && !path.exists() {
            tracing::debug!("No configuration file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        tracing::info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: StationConfig = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the specified path
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("pickverify").join("station.toml")
        } else {
            PathBuf::from(".config/pickverify/station.toml")
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        validate_code("identity_code", &self.workflow.identity_code)?;
        validate_code("box_label_code", &self.workflow.box_label_code)?;

        if self.input.idle_timeout_ms == 0 {
            return Err(anyhow!("idle_timeout_ms must be greater than zero"));
        }

        if !VALID_LOG_LEVELS.contains(&self.station.log_level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}', must be one of: {}",
                self.station.log_level,
                VALID_LOG_LEVELS.join(", ")
            ));
        }

        if self.station.event_capacity == 0 || self.station.feedback_capacity == 0 {
            return Err(anyhow!("Channel capacities must be greater than zero"));
        }

        Ok(())
    }

    /// Codes the workflow verifies against.
    pub fn expected_codes(&self) -> ExpectedCodes {
        ExpectedCodes::new(
            self.workflow.identity_code.clone(),
            self.workflow.box_label_code.clone(),
        )
    }

    /// Idle interval of the scan buffer.
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.input.idle_timeout_ms)
    }
}

/// A code must be something the extractor can produce.
fn validate_code(key: &str, code: &str) -> Result<()> {
    if code.trim().is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }

    if code.contains([CODE_SEPARATOR, NUL, SEPARATOR_CONTROL]) {
        return Err(anyhow!(
            "{key} '{}' contains a character that never survives extraction",
            code.escape_debug()
        ));
    }

    Ok(())
}
