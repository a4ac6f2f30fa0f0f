use crate::error::{InkpadError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::num::ParseIntError;
use std::path::Path;
use std::time::Duration;

const CONFIG_FILENAME: &str = "config.json";

/// Editor configuration, stored as `config.json` in the config directory.
///
/// Every field has a default, so a partial file only overrides what it names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undo snapshots kept
    pub history_limit: usize,

    /// Characters typed since the last capture that trigger a new one
    pub capture_char_threshold: usize,

    /// Milliseconds since the last capture after which any input triggers one
    pub capture_interval_ms: u64,

    /// Delay before a requested capture runs
    pub capture_debounce_ms: u64,

    /// Delay between the last edit and the autosave
    pub autosave_delay_ms: u64,

    /// How long transient status messages stay up
    pub status_revert_ms: u64,

    pub rtf: RtfConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RtfConfig {
    /// Embedded pictures wider than this are scaled down
    pub max_image_width_px: u32,

    /// Hex digits per line inside a `\pict` group
    pub hex_line_width: usize,

    /// Images whose decoded payload exceeds this are left out
    pub max_image_bytes: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 30,
            capture_char_threshold: 5,
            capture_interval_ms: 2000,
            capture_debounce_ms: 50,
            autosave_delay_ms: 1000,
            status_revert_ms: 1500,
            rtf: RtfConfig::default(),
        }
    }
}

impl Default for RtfConfig {
    fn default() -> Self {
        Self {
            max_image_width_px: 500,
            hex_line_width: 128,
            max_image_bytes: 8 * 1024 * 1024,
        }
    }
}

impl EditorConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: EditorConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        fs::create_dir_all(config_dir)?;

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.history_limit == 0 {
            return Err(InkpadError::Config("history_limit must be at least 1".into()));
        }
        if self.capture_char_threshold == 0 {
            return Err(InkpadError::Config(
                "capture_char_threshold must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Value of a dotted key (`history_limit`, `rtf.hex_line_width`, ...), formatted for display.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "history_limit" => self.history_limit.to_string(),
            "capture_char_threshold" => self.capture_char_threshold.to_string(),
            "capture_interval_ms" => self.capture_interval_ms.to_string(),
            "capture_debounce_ms" => self.capture_debounce_ms.to_string(),
            "autosave_delay_ms" => self.autosave_delay_ms.to_string(),
            "status_revert_ms" => self.status_revert_ms.to_string(),
            "rtf.max_image_width_px" => self.rtf.max_image_width_px.to_string(),
            "rtf.hex_line_width" => self.rtf.hex_line_width.to_string(),
            "rtf.max_image_bytes" => self.rtf.max_image_bytes.to_string(),
            _ => return None,
        };
        Some(value)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid =
            |_: ParseIntError| InkpadError::Config(format!("Invalid value for {}: {}", key, value));
        match key {
            "history_limit" => self.history_limit = value.parse().map_err(invalid)?,
            "capture_char_threshold" => {
                self.capture_char_threshold = value.parse().map_err(invalid)?
            }
            "capture_interval_ms" => self.capture_interval_ms = value.parse().map_err(invalid)?,
            "capture_debounce_ms" => self.capture_debounce_ms = value.parse().map_err(invalid)?,
            "autosave_delay_ms" => self.autosave_delay_ms = value.parse().map_err(invalid)?,
            "status_revert_ms" => self.status_revert_ms = value.parse().map_err(invalid)?,
            "rtf.max_image_width_px" => {
                self.rtf.max_image_width_px = value.parse().map_err(invalid)?
            }
            "rtf.hex_line_width" => self.rtf.hex_line_width = value.parse().map_err(invalid)?,
            "rtf.max_image_bytes" => self.rtf.max_image_bytes = value.parse().map_err(invalid)?,
            _ => return Err(InkpadError::Config(format!("Unknown config key: {}", key))),
        }
        self.validate()
    }

    pub fn capture_interval(&self) -> Duration {
        Duration::from_millis(self.capture_interval_ms)
    }

    pub fn capture_debounce(&self) -> Duration {
        Duration::from_millis(self.capture_debounce_ms)
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn status_revert(&self) -> Duration {
        Duration::from_millis(self.status_revert_ms)
    }
}
