//! Daemon configuration
//!
//! Loaded from a TOML file. Every field has a default, so an empty file
//! describes the reference setup: ECU on `/dev/ttyUSB0` at 115200 baud,
//! relay sink on `/dev/serial0` at 38400 baud.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ecu_conv::{ChannelDescriptor, ChannelTable, ConvError};
use ecu_link::{EcuLinkConfig, SerialConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("channel table: {0}")]
    Channels(#[from] ConvError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Which consumer receives decoded frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Forward every cycle as a text record to the relay sink
    #[default]
    Relay,
    /// Show one channel at a time, cycled with a button
    Interactive,
}

/// Complete daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashConfig {
    #[serde(default)]
    pub mode: Mode,

    /// Upstream ECU link
    #[serde(default)]
    pub ecu: EcuLinkConfig,

    #[serde(default)]
    pub relay: RelayConfig,

    #[serde(default)]
    pub interactive: InteractiveConfig,

    #[serde(default)]
    pub startup: StartupConfig,

    /// YAML channel file; takes precedence over inline channels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_file: Option<PathBuf>,

    /// Inline channel table; the reference table is used when empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<ChannelDescriptor>,
}

// =============================================================================
// Relay Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Downstream display device
    #[serde(default = "default_relay_port")]
    pub port: String,

    #[serde(default = "default_relay_baud")]
    pub baud_rate: u32,

    /// Cycle period in milliseconds
    #[serde(default = "default_relay_interval_ms")]
    pub interval_ms: u64,

    /// Channels in record order
    #[serde(default = "default_relay_channels")]
    pub channels: Vec<String>,
}

fn default_relay_port() -> String {
    "/dev/serial0".to_string()
}

fn default_relay_baud() -> u32 {
    38400
}

fn default_relay_interval_ms() -> u64 {
    200
}

fn default_relay_channels() -> Vec<String> {
    ["afr1", "mat", "coolant", "map"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: default_relay_port(),
            baud_rate: default_relay_baud(),
            interval_ms: default_relay_interval_ms(),
            channels: default_relay_channels(),
        }
    }
}

impl RelayConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn serial(&self) -> SerialConfig {
        SerialConfig {
            port: self.port.clone(),
            baud_rate: self.baud_rate,
            timeout_ms: 1000,
        }
    }
}

// =============================================================================
// Interactive Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractiveConfig {
    /// Acquisition cycle period in milliseconds
    #[serde(default = "default_interactive_interval_ms")]
    pub interval_ms: u64,

    /// Button sampling period in milliseconds
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,

    /// Minimum time between accepted button transitions
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default)]
    pub renderer: RendererKind,

    #[serde(default)]
    pub button: ButtonConfig,
}

fn default_interactive_interval_ms() -> u64 {
    50
}

fn default_sample_interval_ms() -> u64 {
    20
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for InteractiveConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interactive_interval_ms(),
            sample_interval_ms: default_sample_interval_ms(),
            debounce_ms: default_debounce_ms(),
            renderer: RendererKind::default(),
            button: ButtonConfig::default(),
        }
    }
}

impl InteractiveConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Where the selected channel is shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// `name: value` lines on stdout
    #[default]
    Text,
    /// tracing events
    Log,
}

/// Channel-cycle button
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonConfig {
    /// GPIO value file (e.g., "/sys/class/gpio/gpio17/value"); no button when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Pressed reads as "0"
    #[serde(default = "default_active_low")]
    pub active_low: bool,
}

fn default_active_low() -> bool {
    true
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            path: None,
            active_low: default_active_low(),
        }
    }
}

// =============================================================================
// Startup Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupConfig {
    /// Wait for serial device paths to exist before opening them
    #[serde(default = "default_wait_for_devices")]
    pub wait_for_devices: bool,

    #[serde(default = "default_device_poll_ms")]
    pub device_poll_ms: u64,
}

fn default_wait_for_devices() -> bool {
    true
}

fn default_device_poll_ms() -> u64 {
    1000
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            wait_for_devices: default_wait_for_devices(),
            device_poll_ms: default_device_poll_ms(),
        }
    }
}

impl StartupConfig {
    pub fn device_poll(&self) -> Duration {
        Duration::from_millis(self.device_poll_ms)
    }
}

// =============================================================================
// Loading and validation
// =============================================================================

impl DashConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Build the channel table this configuration describes
    pub fn channel_table(&self) -> Result<ChannelTable, ConfigError> {
        if let Some(path) = &self.channel_file {
            return Ok(ChannelTable::from_file(path)?);
        }
        if self.channels.is_empty() {
            return Ok(ChannelTable::reference());
        }
        Ok(ChannelTable::new(self.channels.clone())?)
    }

    /// Check the configuration against the channel table it will run with
    pub fn validate(&self, table: &ChannelTable) -> Result<(), ConfigError> {
        let min_len = self.ecu.min_frame_len.unwrap_or_else(|| table.min_frame_len());
        if min_len < table.min_frame_len() {
            return Err(ConfigError::Invalid(format!(
                "ecu.min_frame_len {} is shorter than the channel table needs ({})",
                min_len,
                table.min_frame_len()
            )));
        }
        if self.ecu.max_read < min_len {
            return Err(ConfigError::Invalid(format!(
                "ecu.max_read {} is below the minimum frame length {}",
                self.ecu.max_read, min_len
            )));
        }
        if self.ecu.request.is_empty() {
            return Err(ConfigError::Invalid("ecu.request must not be empty".to_string()));
        }

        let intervals = [
            ("relay.interval_ms", self.relay.interval_ms),
            ("interactive.interval_ms", self.interactive.interval_ms),
            ("interactive.sample_interval_ms", self.interactive.sample_interval_ms),
            ("startup.device_poll_ms", self.startup.device_poll_ms),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, ms)| *ms == 0) {
            return Err(ConfigError::Invalid(format!("{} must be non-zero", name)));
        }

        if self.mode == Mode::Relay {
            if self.relay.channels.is_empty() {
                return Err(ConfigError::Invalid(
                    "relay.channels must name at least one channel".to_string(),
                ));
            }
            for name in &self.relay.channels {
                table.index_of(name)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_empty_config_is_reference_setup() {
        let config = DashConfig::from_toml("").unwrap();

        assert_eq!(config.mode, Mode::Relay);
        assert_eq!(config.ecu, EcuLinkConfig::default());
        assert_eq!(config.relay.port, "/dev/serial0");
        assert_eq!(config.relay.baud_rate, 38400);
        assert_eq!(config.relay.interval(), Duration::from_millis(200));
        assert_eq!(config.relay.channels, vec!["afr1", "mat", "coolant", "map"]);
        assert_eq!(config.interactive.interval(), Duration::from_millis(50));
        assert_eq!(config.interactive.debounce(), Duration::from_millis(300));
        assert!(config.interactive.button.active_low);
        assert!(config.startup.wait_for_devices);

        let table = config.channel_table().unwrap();
        assert_eq!(table, ChannelTable::reference());
        config.validate(&table).unwrap();
    }

    #[test]
    fn test_interactive_config() {
        let config = DashConfig::from_toml(
            r#"
mode = "interactive"

[ecu]
port = "/dev/ttyACM0"
min_frame_len = 32

[interactive]
debounce_ms = 250
renderer = "log"

[interactive.button]
path = "/sys/class/gpio/gpio17/value"
"#,
        )
        .unwrap();

        assert_eq!(config.mode, Mode::Interactive);
        assert_eq!(config.ecu.port, "/dev/ttyACM0");
        assert_eq!(config.ecu.baud_rate, 115200);
        assert_eq!(config.ecu.min_frame_len, Some(32));
        assert_eq!(config.interactive.debounce(), Duration::from_millis(250));
        assert_eq!(config.interactive.renderer, RendererKind::Log);
        assert_eq!(
            config.interactive.button.path,
            Some(PathBuf::from("/sys/class/gpio/gpio17/value"))
        );
    }

    #[test]
    fn test_inline_channels() {
        let config = DashConfig::from_toml(
            r#"
[relay]
channels = ["rpm"]

[[channels]]
name = "rpm"
offset = 14

[[channels]]
name = "tps"
offset = 24
scale = 0.5
"#,
        )
        .unwrap();

        let table = config.channel_table().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.by_name("tps").unwrap().scale, 0.5);
        config.validate(&table).unwrap();
    }

    #[test]
    fn test_channel_file_takes_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "channels:\n  - name: afr1\n    offset: 28\n    scale: 0.1").unwrap();

        let config = DashConfig {
            channel_file: Some(file.path().to_path_buf()),
            channels: vec![ChannelDescriptor::new("ignored", 0, 1.0, 0.0)],
            ..Default::default()
        };

        let table = config.channel_table().unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.by_name("afr1").is_some());
    }

    #[test]
    fn test_channel_file_with_overflowing_offset_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "channels:\n  - name: bogus\n    offset: {}", usize::MAX).unwrap();

        let config = DashConfig {
            channel_file: Some(file.path().to_path_buf()),
            ..Default::default()
        };

        assert!(matches!(
            config.channel_table(),
            Err(ConfigError::Channels(ConvError::OffsetOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_relay_channel() {
        let mut config = DashConfig::default();
        config.relay.channels.push("egt".to_string());

        let result = config.validate(&ChannelTable::reference());
        assert!(matches!(
            result,
            Err(ConfigError::Channels(ConvError::UnknownChannel(name))) if name == "egt"
        ));
    }

    #[test]
    fn test_validate_rejects_small_max_read() {
        let mut config = DashConfig::default();
        config.ecu.max_read = 16;
        assert!(matches!(
            config.validate(&ChannelTable::reference()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = DashConfig::default();
        config.interactive.sample_interval_ms = 0;
        let err = config.validate(&ChannelTable::reference()).unwrap_err();
        assert!(err.to_string().contains("interactive.sample_interval_ms"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = DashConfig::load("/nonexistent/ecu-dash.toml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mode = \"interactive\"\n[relay]\ninterval_ms = 500").unwrap();

        let config = DashConfig::load(file.path()).unwrap();
        assert_eq!(config.mode, Mode::Interactive);
        assert_eq!(config.relay.interval_ms, 500);
    }

    #[test]
    fn test_duplicate_inline_channels() {
        let config = DashConfig::from_toml(
            "[[channels]]\nname = \"a\"\noffset = 0\n[[channels]]\nname = \"a\"\noffset = 2",
        )
        .unwrap();
        assert!(matches!(
            config.channel_table(),
            Err(ConfigError::Channels(ConvError::DuplicateChannel(_)))
        ));
    }
}
