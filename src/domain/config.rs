use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::error::QuadbotError;

/// Quadbot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuadbotConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
    /// Robot link configuration
    #[serde(default)]
    pub link: LinkConfig,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Idle sleep between serial status polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Upper bound on concurrently running HTTP commands
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

/// Which channel carries commands for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    #[default]
    Serial,
    Wireless,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportMode::Serial => write!(f, "serial"),
            TransportMode::Wireless => write!(f, "wireless"),
        }
    }
}

impl FromStr for TransportMode {
    type Err = QuadbotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serial" => Ok(TransportMode::Serial),
            "wireless" | "http" | "wifi" => Ok(TransportMode::Wireless),
            other => Err(QuadbotError::InvalidInput(format!(
                "Unknown transport mode '{}'",
                other
            ))),
        }
    }
}

/// Link configuration: the selected mode plus settings for both channels
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkConfig {
    #[serde(default)]
    pub mode: TransportMode,
    #[serde(default)]
    pub serial: SerialSettings,
    #[serde(default)]
    pub wireless: WirelessSettings,
}

/// Serial endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialSettings {
    #[serde(default = "default_serial_port")]
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,
    #[serde(default = "default_stop_bits")]
    pub stop_bits: u8,
    #[serde(default)]
    pub parity: ParityConfig,
    #[serde(default)]
    pub flow_control: FlowControlConfig,
    /// Bounded wait for a single read
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,
    /// Delay after opening while the board resets
    #[serde(default = "default_settle")]
    pub settle_ms: u64,
}

/// HTTP endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WirelessSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub port: u16,
    #[serde(default = "default_http_timeout")]
    pub timeout_ms: u64,
}

/// Parity configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParityConfig {
    #[default]
    None,
    Odd,
    Even,
}

/// Flow control configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControlConfig {
    #[default]
    None,
    Hardware,
    Software,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_poll_interval() -> u64 {
    10
}

fn default_max_in_flight() -> usize {
    4
}

fn default_serial_port() -> String {
    "/dev/ttyACM0".to_string()
}

fn default_baud_rate() -> u32 {
    115_200
}

fn default_data_bits() -> u8 {
    8
}

fn default_stop_bits() -> u8 {
    1
}

fn default_read_timeout() -> u64 {
    10
}

fn default_settle() -> u64 {
    2000
}

fn default_host() -> String {
    "192.168.3.1".to_string()
}

fn default_http_port() -> u16 {
    80
}

fn default_http_timeout() -> u64 {
    5000
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            poll_interval_ms: default_poll_interval(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

impl GlobalConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            data_bits: default_data_bits(),
            stop_bits: default_stop_bits(),
            parity: ParityConfig::default(),
            flow_control: FlowControlConfig::default(),
            read_timeout_ms: default_read_timeout(),
            settle_ms: default_settle(),
        }
    }
}

impl Default for WirelessSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_http_port(),
            timeout_ms: default_http_timeout(),
        }
    }
}

impl WirelessSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Base URL commands are appended to as a path segment
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
