//! # Control Frame Encoder
//!
//! Encodes the commanded state into the fixed-layout control frame.
//!
//! Frame layout (all multi-byte values big-endian):
//!
//! | Offset | Field |
//! |--------|-------|
//! | 0      | sequence number (u16) |
//! | 2      | comm version (u8) |
//! | 3      | control byte (enabled/auto/test/e-stop bits) |
//! | 4      | request byte (constant 0x01) |
//! | 5      | alliance (0 = red, 1 = blue) |
//! | 6      | position (1-3) |
//! | 7      | match time (u16) |
//! | 9      | 6 × 18-byte joystick block |
//! | 117    | game data length (u8, max 32) |
//! | 118    | game data (32 bytes, zero-padded) |

use bytes::BufMut;

use super::protocol::*;

/// Encode one complete control frame.
///
/// The frame is always [`CONTROL_FRAME_LEN`] bytes: every joystick slot is
/// present whether or not a device backs it, and the game data field is
/// zero-padded to its full width.
///
/// # Arguments
///
/// * `robot` - Commanded enable/mode/e-stop flags (drives the control byte)
/// * `control` - Sequence, alliance, match and joystick state
///
/// # Examples
///
/// ```
/// use ds_link::proto::encoder::encode_control_frame;
/// use ds_link::proto::protocol::{ControlState, RobotState, CONTROL_FRAME_LEN};
///
/// let frame = encode_control_frame(&RobotState::default(), &ControlState::default());
/// assert_eq!(frame.len(), CONTROL_FRAME_LEN);
/// ```
pub fn encode_control_frame(robot: &RobotState, control: &ControlState) -> Vec<u8> {
    let mut frame = Vec::with_capacity(CONTROL_FRAME_LEN);

    frame.put_u16(control.sequence_number);
    frame.put_u8(COMM_VERSION);
    frame.put_u8(control_byte(robot));
    frame.put_u8(CONTROL_REQUEST_BYTE);
    frame.put_u8(match control.alliance {
        Alliance::Red => 0,
        Alliance::Blue => 1,
    });
    frame.put_u8(control.position);
    frame.put_u16(control.match_time);

    for slot in &control.joysticks {
        for &axis in &slot.axes {
            frame.put_i8(encode_axis(axis));
        }
        frame.put_u32(slot.buttons);
        frame.put_i16(slot.pov);
    }

    let data = control.game_data.as_bytes();
    let len = data.len().min(GAME_DATA_MAX);
    frame.put_u8(len as u8);
    frame.put_slice(&data[..len]);
    // Zero-pad the game data field to its fixed width
    frame.resize(CONTROL_FRAME_LEN, 0);

    frame
}

/// Build the control byte from the commanded robot flags.
///
/// Teleop is the absence of both mode bits.
pub fn control_byte(robot: &RobotState) -> u8 {
    let mut byte = 0;
    if robot.enabled {
        byte |= CONTROL_ENABLED;
    }
    match robot.mode {
        RobotMode::Auto => byte |= CONTROL_AUTO,
        RobotMode::Test => byte |= CONTROL_TEST,
        RobotMode::Teleop => {}
    }
    if robot.emergency_stop {
        byte |= CONTROL_ESTOP;
    }
    byte
}

/// Encode a normalized axis value as a signed fixed-point byte:
/// `clamp(round(value * 127), -127, 127)`.
///
/// # Examples
///
/// ```
/// use ds_link::proto::encoder::encode_axis;
///
/// assert_eq!(encode_axis(0.0), 0);
/// assert_eq!(encode_axis(1.0), 127);
/// assert_eq!(encode_axis(-1.0), -127);
/// ```
pub fn encode_axis(value: f32) -> i8 {
    (value * 127.0).round().clamp(-127.0, 127.0) as i8
}
