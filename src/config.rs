//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

use crate::error::{DsLinkError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Network / protocol endpoint configuration
#[derive(Debug, Deserialize, Clone)]
pub struct NetworkConfig {
    /// Team number; drives the 10.TE.AM.2 robot address derivation.
    #[serde(default)]
    pub team_number: u16,

    /// Explicit robot address; overrides the team-number derivation when set.
    #[serde(default)]
    pub robot_ip: String,

    #[serde(default = "default_ds_port")]
    pub ds_port: u16,

    #[serde(default = "default_robot_port")]
    pub robot_port: u16,

    /// Reserved stream port; not used by the datagram core.
    #[serde(default = "default_stream_port")]
    pub stream_port: u16,

    #[serde(default = "default_send_rate_hz")]
    pub send_rate_hz: u64,

    #[serde(default = "default_heartbeat_rate_hz")]
    pub heartbeat_rate_hz: u64,
}

/// Gamepad input configuration
#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    #[serde(default = "default_poll_rate_hz")]
    pub poll_rate_hz: u64,

    #[serde(default = "default_deadzone")]
    pub deadzone: f32,

    /// Start with polling suspended; resumed via the poller handle.
    #[serde(default)]
    pub start_paused: bool,
}

/// Telemetry logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,
}

// Default value functions
fn default_ds_port() -> u16 { crate::proto::protocol::DS_BIND_PORT }
fn default_robot_port() -> u16 { crate::proto::protocol::ROBOT_PORT }
fn default_stream_port() -> u16 { crate::proto::protocol::STREAM_PORT }
fn default_send_rate_hz() -> u64 { 50 }
fn default_heartbeat_rate_hz() -> u64 { 1 }

fn default_poll_rate_hz() -> u64 { 50 }
fn default_deadzone() -> f32 { 0.1 }

fn default_telemetry_enabled() -> bool { true }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            team_number: 0,
            robot_ip: String::new(),
            ds_port: default_ds_port(),
            robot_port: default_robot_port(),
            stream_port: default_stream_port(),
            send_rate_hz: default_send_rate_hz(),
            heartbeat_rate_hz: default_heartbeat_rate_hz(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            poll_rate_hz: default_poll_rate_hz(),
            deadzone: default_deadzone(),
            start_paused: false,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_telemetry_enabled(),
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            input: InputConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl NetworkConfig {
    /// Resolve the robot address: the explicit `robot_ip` override when set,
    /// otherwise 10.TE.AM.2 derived from the team number.
    ///
    /// # Examples
    ///
    /// ```
    /// use ds_link::config::NetworkConfig;
    ///
    /// let config = NetworkConfig {
    ///     team_number: 254,
    ///     ..Default::default()
    /// };
    /// assert_eq!(config.robot_address().unwrap().to_string(), "10.2.54.2");
    /// ```
    pub fn robot_address(&self) -> Result<IpAddr> {
        if !self.robot_ip.is_empty() {
            return self.robot_ip.parse().map_err(|_| {
                DsLinkError::InvalidConfig(format!("invalid robot_ip: {}", self.robot_ip))
            });
        }
        Ok(IpAddr::V4(team_address(self.team_number)))
    }
}

/// Derive the conventional robot address 10.TE.AM.2 from a team number.
pub fn team_address(team_number: u16) -> Ipv4Addr {
    Ipv4Addr::new(10, (team_number / 100) as u8, (team_number % 100) as u8, 2)
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, falling back to built-in defaults
    /// when the file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.network.team_number > 9999 {
            return Err(DsLinkError::InvalidConfig(format!(
                "team_number {} out of range (0-9999)",
                self.network.team_number
            )));
        }
        if !self.network.robot_ip.is_empty() && self.network.robot_ip.parse::<IpAddr>().is_err() {
            return Err(DsLinkError::InvalidConfig(format!(
                "invalid robot_ip: {}",
                self.network.robot_ip
            )));
        }
        if self.network.robot_port == 0 || self.network.stream_port == 0 {
            return Err(DsLinkError::InvalidConfig(
                "robot_port and stream_port must be nonzero".to_string(),
            ));
        }
        if self.network.send_rate_hz == 0 || self.network.send_rate_hz > 1000 {
            return Err(DsLinkError::InvalidConfig(format!(
                "send_rate_hz {} out of range (1-1000)",
                self.network.send_rate_hz
            )));
        }
        if self.network.heartbeat_rate_hz == 0 || self.network.heartbeat_rate_hz > 1000 {
            return Err(DsLinkError::InvalidConfig(format!(
                "heartbeat_rate_hz {} out of range (1-1000)",
                self.network.heartbeat_rate_hz
            )));
        }
        if self.input.poll_rate_hz == 0 || self.input.poll_rate_hz > 1000 {
            return Err(DsLinkError::InvalidConfig(format!(
                "poll_rate_hz {} out of range (1-1000)",
                self.input.poll_rate_hz
            )));
        }
        if !(0.0..=1.0).contains(&self.input.deadzone) {
            return Err(DsLinkError::InvalidConfig(format!(
                "deadzone {} out of range (0.0-1.0)",
                self.input.deadzone
            )));
        }
        if self.telemetry.max_records_per_file == 0 || self.telemetry.max_files_to_keep == 0 {
            return Err(DsLinkError::InvalidConfig(
                "telemetry limits must be nonzero".to_string(),
            ));
        }
        Ok(())
    }
}
