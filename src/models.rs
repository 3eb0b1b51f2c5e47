//! Configuration model for the icon lamp daemon

use std::net::Ipv4Addr;
use std::path::PathBuf;

use parse_display::Display;
use serde_derive::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::color::RgbwColor;

fn default_true() -> bool {
    true
}

/// Identifies one of the four physical pixel groups
///
/// Groups are statically enumerated: none are created or destroyed at
/// runtime, they only differ in their configured pixel count and color.
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupId {
    #[display("Square")]
    Square,
    #[display("Circle")]
    Circle,
    #[display("Cross")]
    Cross,
    #[display("Triangle")]
    Triangle,
}

impl GroupId {
    pub const ALL: [GroupId; 4] = [
        GroupId::Square,
        GroupId::Circle,
        GroupId::Cross,
        GroupId::Triangle,
    ];

    /// Byte selecting this group in a command frame
    pub fn command_byte(self) -> u8 {
        match self {
            GroupId::Square => b's',
            GroupId::Circle => b'c',
            GroupId::Cross => b'x',
            GroupId::Triangle => b't',
        }
    }

    /// Letter prefixing this group's page template tokens
    pub fn token_prefix(self) -> char {
        match self {
            GroupId::Square => 'S',
            GroupId::Circle => 'C',
            GroupId::Cross => 'X',
            GroupId::Triangle => 'T',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DummyDeviceMode {
    Text,
    Ansi,
}

impl Default for DummyDeviceMode {
    fn default() -> Self {
        Self::Text
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Dummy {
    pub mode: DummyDeviceMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct File {
    pub output: PathBuf,
    pub print_time_stamp: bool,
}

impl Default for File {
    fn default() -> Self {
        Self {
            output: PathBuf::from("leds.txt"),
            print_time_stamp: false,
        }
    }
}

/// Physical output attached to one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type", deny_unknown_fields)]
pub enum Device {
    Dummy(Dummy),
    File(File),
}

impl Default for Device {
    fn default() -> Self {
        Self::Dummy(Dummy::default())
    }
}

/// Static description of one pixel group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GroupConfig {
    pub id: GroupId,
    /// Number of individually addressable pixels behind this icon
    #[validate(range(min = 1, max = 64))]
    pub pixel_count: usize,
    /// Target color displayed after the startup fade-in
    #[serde(default)]
    pub color: RgbwColor,
    #[serde(default)]
    pub device: Device,
}

impl GroupConfig {
    fn new(id: GroupId, pixel_count: usize, color: RgbwColor) -> Self {
        Self {
            id,
            pixel_count,
            color,
            device: Device::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct WebConfig {
    #[validate(range(min = 1))]
    pub port: u16,
    pub document_root: String,
}

impl WebConfig {
    pub const DEFAULT_DOCUMENT_ROOT: &'static str = "web";
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: 80,
            document_root: Self::DEFAULT_DOCUMENT_ROOT.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct DnsConfig {
    #[serde(default = "default_true")]
    pub enable: bool,
    #[validate(range(min = 1))]
    pub port: u16,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            enable: true,
            port: 53,
        }
    }
}

/// Wireless access point parameters
///
/// Bring-up itself is handled outside this process; the daemon only needs
/// the advertised address (captive DNS answers) and the SSID for logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct AccessPointConfig {
    pub ssid: String,
    pub address: Ipv4Addr,
}

impl Default for AccessPointConfig {
    fn default() -> Self {
        Self {
            ssid: "Icon Lamp".to_owned(),
            address: Ipv4Addr::new(192, 168, 1, 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct AmbientConfig {
    /// Lightness of randomly drawn hues, 0.0 to 1.0
    #[validate(range(min = 0.0, max = 1.0))]
    pub brightness: f32,
    /// Lower bound (inclusive) of random transition durations
    #[validate(range(min = 1))]
    pub min_duration_ms: u32,
    /// Upper bound (exclusive) of random transition durations
    pub max_duration_ms: u32,
    /// Scheduler tick period
    #[validate(range(min = 1))]
    pub tick_ms: u64,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            brightness: 0.5,
            min_duration_ms: 1000,
            max_duration_ms: 2000,
            tick_ms: 20,
        }
    }
}

/// Auxiliary single-line output used as an operational signal
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct StatusLineConfig {
    /// Sink for the duty value; duty changes are only logged when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl StatusLineConfig {
    pub const STARTUP_DUTY: u8 = 64;
    pub const SHUTDOWN_DUTY: u8 = 192;
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct GlobalConfig {
    #[validate(nested)]
    pub web: WebConfig,
    #[validate(nested)]
    pub dns: DnsConfig,
    pub access_point: AccessPointConfig,
    #[validate(nested)]
    pub ambient: AmbientConfig,
    pub status_line: StatusLineConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    #[validate(nested)]
    pub groups: Vec<GroupConfig>,
    #[validate(nested)]
    pub global: GlobalConfig,
}

impl Default for Config {
    fn default() -> Self {
        // Pixel counts and boot colors of the physical build
        Self {
            groups: vec![
                GroupConfig::new(GroupId::Square, 4, RgbwColor::new(255, 0, 255, 64)),
                GroupConfig::new(GroupId::Circle, 4, RgbwColor::new(255, 0, 0, 32)),
                GroupConfig::new(GroupId::Cross, 4, RgbwColor::new(0, 0, 255, 32)),
                GroupConfig::new(GroupId::Triangle, 3, RgbwColor::new(0, 255, 0, 32)),
            ],
            global: GlobalConfig::default(),
        }
    }
}

impl Config {
    pub async fn load_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        use tokio::io::AsyncReadExt;

        let mut file = tokio::fs::File::open(path).await?;
        let mut full = String::new();
        file.read_to_string(&mut full).await?;

        let config: Config = toml::from_str(&full)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn group(&self, id: GroupId) -> Option<&GroupConfig> {
        self.groups.iter().find(|group| group.id == id)
    }
}
