//! # Protocol Constants and Types
//!
//! Core definitions for the driver-station ↔ robot datagram protocol.
//!
//! The driver station binds UDP port 1150 and fires control frames at the
//! robot's port 1110. The robot answers with status frames carrying
//! telemetry. Both directions are fire-and-forget: no delivery guarantee,
//! no authentication, no version negotiation.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::DsLinkError;

/// Local UDP port the driver station binds (robot → DS direction).
pub const DS_BIND_PORT: u16 = 1150;

/// Remote UDP port control frames are sent to (DS → robot direction).
pub const ROBOT_PORT: u16 = 1110;

/// TCP stream port reserved in configuration; unused by the datagram core.
pub const STREAM_PORT: u16 = 1740;

/// Maximum datagram size. Outbound frames use only a prefix of this.
pub const PACKET_SIZE: usize = 1024;

/// Communication protocol revision tag (sent, never negotiated).
pub const COMM_VERSION: u8 = 0x01;

/// Constant request byte at offset 4 of every control frame.
pub const CONTROL_REQUEST_BYTE: u8 = 0x01;

/// Control byte: robot enabled.
pub const CONTROL_ENABLED: u8 = 0x04;
/// Control byte: autonomous mode.
pub const CONTROL_AUTO: u8 = 0x02;
/// Control byte: test mode.
pub const CONTROL_TEST: u8 = 0x01;
/// Control byte: emergency stop.
pub const CONTROL_ESTOP: u8 = 0x80;

/// Status byte: robot is browned out.
pub const STATUS_BROWNOUT: u8 = 0x10;
/// Status byte: system watchdog is feeding.
pub const STATUS_WATCHDOG: u8 = 0x02;

/// Number of joystick slots in every control frame, connected or not.
pub const MAX_JOYSTICKS: usize = 6;

/// Axes carried per joystick slot.
pub const AXES_PER_JOYSTICK: usize = 12;

/// Buttons carried per joystick slot (one bit each).
pub const MAX_BUTTONS: usize = 32;

/// Encoded size of one joystick block: 12 axes + u32 buttons + i16 POV.
pub const JOYSTICK_BLOCK_LEN: usize = AXES_PER_JOYSTICK + 4 + 2;

/// Maximum game data length in bytes.
pub const GAME_DATA_MAX: usize = 32;

/// Length of each null-padded version string in status frames.
pub const VERSION_FIELD_LEN: usize = 8;

/// Meaningful length of an encoded control frame:
/// 9-byte header + 6 joystick blocks + length byte + 32-byte game data.
pub const CONTROL_FRAME_LEN: usize = 9 + MAX_JOYSTICKS * JOYSTICK_BLOCK_LEN + 1 + GAME_DATA_MAX;

/// Shortest status frame that will be decoded at all.
pub const STATUS_MIN_LEN: usize = 8;

/// POV value meaning centered / no direction pressed.
pub const POV_CENTERED: i16 = -1;

/// Driver station software revision reported until the robot says otherwise.
pub const DS_VERSION: &str = "24.0.1";

/// Robot operating mode commanded by the driver station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RobotMode {
    /// Operator-controlled period.
    #[default]
    Teleop,
    /// Autonomous period.
    Auto,
    /// Test mode (per-mechanism checkout).
    Test,
}

impl FromStr for RobotMode {
    type Err = DsLinkError;

    /// Parses the wire-level mode names `teleop`, `auto`, and `test`.
    /// Anything else is rejected so stale UI strings never change the
    /// commanded mode.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "teleop" => Ok(RobotMode::Teleop),
            "auto" => Ok(RobotMode::Auto),
            "test" => Ok(RobotMode::Test),
            other => Err(DsLinkError::Protocol(format!("unknown robot mode: {other}"))),
        }
    }
}

impl fmt::Display for RobotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RobotMode::Teleop => write!(f, "teleop"),
            RobotMode::Auto => write!(f, "auto"),
            RobotMode::Test => write!(f, "test"),
        }
    }
}

/// Competition side assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alliance {
    #[default]
    Red,
    Blue,
}

impl FromStr for Alliance {
    type Err = DsLinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "red" => Ok(Alliance::Red),
            "blue" => Ok(Alliance::Blue),
            other => Err(DsLinkError::Protocol(format!("unknown alliance: {other}"))),
        }
    }
}

impl fmt::Display for Alliance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alliance::Red => write!(f, "red"),
            Alliance::Blue => write!(f, "blue"),
        }
    }
}

/// One of the six joystick slots packed into every control frame.
///
/// Unused slots keep their last-set values (zeroed at session start), so the
/// frame layout never changes with the number of attached devices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoystickSlot {
    /// Normalized axis values, -1.0 to 1.0.
    pub axes: [f32; AXES_PER_JOYSTICK],
    /// Button bitmask, bit i = button i held.
    pub buttons: u32,
    /// D-pad angle in degrees, -1 = centered.
    pub pov: i16,
}

impl Default for JoystickSlot {
    fn default() -> Self {
        Self {
            axes: [0.0; AXES_PER_JOYSTICK],
            buttons: 0,
            pov: POV_CENTERED,
        }
    }
}

/// Live robot telemetry plus the commanded enable/mode/e-stop flags that
/// feed the control byte.
///
/// Status frames merge into this progressively: a field missing from a
/// given frame keeps its previous value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RobotState {
    /// Commanded: robot outputs enabled.
    pub enabled: bool,
    /// Commanded operating mode.
    pub mode: RobotMode,
    /// Commanded emergency stop.
    pub emergency_stop: bool,
    /// Robot reports a voltage brownout.
    pub browned_out: bool,
    /// Robot system watchdog is feeding.
    pub system_watchdog: bool,
    /// Battery voltage in volts.
    pub battery_voltage: f32,
    /// CAN bus utilization in percent.
    pub can_utilization: f32,
    /// Radio signal strength in dB.
    pub wifi_db: i8,
    /// Radio bandwidth usage in Mb/s.
    pub wifi_mb: f32,
    /// Driver station software version.
    pub ds_version: String,
    /// Pneumatics controller firmware version.
    pub pcm_version: String,
    /// Power distribution firmware version.
    pub pdp_version: String,
    /// Radio firmware version.
    pub radio_version: String,
}

impl Default for RobotState {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: RobotMode::Teleop,
            emergency_stop: false,
            browned_out: false,
            system_watchdog: false,
            battery_voltage: 0.0,
            can_utilization: 0.0,
            wifi_db: 0,
            wifi_mb: 0.0,
            ds_version: DS_VERSION.to_string(),
            pcm_version: String::new(),
            pdp_version: String::new(),
            radio_version: String::new(),
        }
    }
}

/// Operator intent serialized into every outbound control frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlState {
    /// Wrapping frame counter; advances once per send attempt.
    pub sequence_number: u16,
    /// Alliance side for this match.
    pub alliance: Alliance,
    /// Driver station position, 1-3.
    pub position: u8,
    /// Remaining match time field.
    pub match_time: u16,
    /// Game-specific data, at most 32 bytes of UTF-8.
    pub game_data: String,
    /// The six joystick slots.
    pub joysticks: [JoystickSlot; MAX_JOYSTICKS],
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            sequence_number: 0,
            alliance: Alliance::Red,
            position: 1,
            match_time: 0,
            game_data: String::new(),
            joysticks: [JoystickSlot::default(); MAX_JOYSTICKS],
        }
    }
}

impl ControlState {
    /// Advances the sequence number by one, wrapping 65535 → 0.
    pub fn advance_sequence(&mut self) {
        self.sequence_number = self.sequence_number.wrapping_add(1);
    }
}
