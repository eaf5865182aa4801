//! Settings and the optional TOML configuration file
//!
//! A missing file degrades to defaults. A present but malformed file is an error,
//! and so is a layout that leaves out any of its eight buttons.
//!
//! ```toml
//! [settings]
//! tick_interval_ms = 16
//! coalesce_window_ms = 80
//!
//! [[mappings]]
//! device_id = "8BitDo Pro 2 (STANDARD GAMEPAD Vendor: 2dc8 Product: 6003)"
//! A = "APAD_right"
//! B = "APAD_down"
//! X = "APAD_up"
//! Y = "APAD_left"
//! L1 = "L1"
//! L2 = "L2"
//! R1 = "R1"
//! R2 = "R2"
//! ```

use crate::mapping::ControllerMapping;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_TICK_INTERVAL_MS: u64 = 16;
pub const DEFAULT_COALESCE_WINDOW_MS: u32 = 80;

const CONFIG_DIR_NAME: &str = "padcanon";
const CONFIG_FILE_NAME: &str = "controller.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("No user configuration directory available on this platform")]
    NoConfigDir,

    #[error("Invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ControllerSettings {
    /// Host tick period used when this crate drives the tick itself
    pub tick_interval_ms: u64,
    /// Window for [`crate::ControllerHandle::throttled_events`]
    pub coalesce_window_ms: u32,
    /// A polled gamepad button counts as pressed when its magnitude exceeds this
    pub button_threshold: f32,
}

impl ControllerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.button_threshold.is_finite() || self.button_threshold < 0.0 {
            return Err(ConfigError::InvalidSetting {
                name: "button_threshold",
                reason: format!(
                    "expected a non-negative number, got {}",
                    self.button_threshold
                ),
            });
        }
        Ok(())
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            coalesce_window_ms: DEFAULT_COALESCE_WINDOW_MS,
            button_threshold: 0.0,
        }
    }
}

/// A layout together with the identity string it applies to
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct MappingEntry {
    pub device_id: String,
    #[serde(flatten)]
    pub mapping: ControllerMapping,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct ControllerConfig {
    pub settings: ControllerSettings,
    pub mappings: Vec<MappingEntry>,
}

impl ControllerConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: ControllerConfig = toml::from_str(source)?;
        config.settings.validate()?;
        debug!(
            "Parsed controller config with {} extra mappings",
            config.mappings.len()
        );
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading controller config from {}", path.display());
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Loads `path`, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(
                "No controller config at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// `<user config dir>/padcanon/controller.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }
}
