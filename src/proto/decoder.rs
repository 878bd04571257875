//! # Status Frame Decoder
//!
//! Decodes robot status frames into [`RobotState`].
//!
//! Decoding is progressive: after the 4-byte header, each telemetry field
//! is read only when it fits entirely in the remaining bytes, and anything
//! the frame omits keeps its previous value in [`RobotState`]. An
//! exactly-8-byte frame is a bare keepalive and updates the header fields
//! only. Frames shorter than 8 bytes are rejected.

use bytes::Buf;

use super::protocol::*;
use crate::error::{DsLinkError, Result};

/// Decode a status frame and merge it into `robot`.
///
/// # Arguments
///
/// * `frame` - Raw datagram payload from the robot
/// * `robot` - Telemetry model to merge into
///
/// # Errors
///
/// Returns a `Protocol` error if the frame is shorter than
/// [`STATUS_MIN_LEN`]; `robot` is untouched in that case.
///
/// # Examples
///
/// ```
/// use ds_link::proto::decoder::decode_status_frame;
/// use ds_link::proto::protocol::RobotState;
///
/// let mut robot = RobotState::default();
/// // seq 0x0001, version 1, status byte with the brownout bit set
/// let frame = [0x00, 0x01, 0x01, 0x10, 0x00, 0x00, 0x00, 0x00];
/// decode_status_frame(&frame, &mut robot).unwrap();
/// assert!(robot.browned_out);
/// ```
pub fn decode_status_frame(frame: &[u8], robot: &mut RobotState) -> Result<()> {
    if frame.len() < STATUS_MIN_LEN {
        return Err(DsLinkError::Protocol(format!(
            "status frame too short: {} bytes",
            frame.len()
        )));
    }

    let mut buf = frame;
    let sequence = buf.get_u16();
    let version = buf.get_u8();
    let status = buf.get_u8();
    tracing::trace!(sequence, version, status, "status frame header");

    robot.browned_out = status & STATUS_BROWNOUT != 0;
    robot.system_watchdog = status & STATUS_WATCHDOG != 0;

    // A minimum-length frame carries no telemetry tail.
    if frame.len() == STATUS_MIN_LEN {
        return Ok(());
    }

    if buf.remaining() >= 2 {
        robot.battery_voltage = buf.get_u16() as f32 / 256.0;
    }
    if buf.remaining() >= 1 {
        robot.can_utilization = buf.get_u8() as f32;
    }
    if buf.remaining() >= 1 {
        robot.wifi_db = buf.get_i8();
    }
    if buf.remaining() >= 2 {
        robot.wifi_mb = buf.get_u16() as f32 / 1000.0;
    }
    if buf.remaining() >= 20 {
        robot.ds_version = read_version(&mut buf);
        robot.pcm_version = read_version(&mut buf);
        robot.pdp_version = read_version(&mut buf);
        robot.radio_version = read_version(&mut buf);
    }

    Ok(())
}

/// Read one null-padded version string, clamped to the bytes available.
fn read_version(buf: &mut &[u8]) -> String {
    let take = buf.remaining().min(VERSION_FIELD_LEN);
    let raw: Vec<u8> = buf[..take].iter().copied().filter(|&b| b != 0).collect();
    buf.advance(take);
    String::from_utf8_lossy(&raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BufMut;

    /// A state with every telemetry field set to a recognizable prior value.
    fn primed_state() -> RobotState {
        RobotState {
            battery_voltage: 12.5,
            can_utilization: 42.0,
            wifi_db: -60,
            wifi_mb: 3.5,
            pcm_version: "1.1".to_string(),
            ..Default::default()
        }
    }

    fn header(status: u8) -> Vec<u8> {
        let mut frame = Vec::new();
        frame.put_u16(7);
        frame.put_u8(COMM_VERSION);
        frame.put_u8(status);
        frame
    }

    #[test]
    fn test_short_frame_rejected_without_changes() {
        let mut robot = primed_state();
        let before = robot.clone();
        let result = decode_status_frame(&[0u8; 7], &mut robot);
        assert!(result.is_err());
        assert_eq!(robot, before);
    }

    #[test]
    fn test_empty_frame_rejected() {
        let mut robot = RobotState::default();
        assert!(decode_status_frame(&[], &mut robot).is_err());
    }

    #[test]
    fn test_eight_byte_frame_updates_header_only() {
        let mut robot = primed_state();
        let mut frame = header(STATUS_BROWNOUT | STATUS_WATCHDOG);
        frame.resize(8, 0);

        decode_status_frame(&frame, &mut robot).unwrap();

        assert!(robot.browned_out);
        assert!(robot.system_watchdog);
        // Telemetry tail keeps its prior values
        assert_eq!(robot.battery_voltage, 12.5);
        assert_eq!(robot.can_utilization, 42.0);
        assert_eq!(robot.wifi_db, -60);
        assert_eq!(robot.wifi_mb, 3.5);
        assert_eq!(robot.pcm_version, "1.1");
    }

    #[test]
    fn test_status_bits_clear() {
        let mut robot = RobotState {
            browned_out: true,
            system_watchdog: true,
            ..Default::default()
        };
        let mut frame = header(0x00);
        frame.resize(8, 0);
        decode_status_frame(&frame, &mut robot).unwrap();
        assert!(!robot.browned_out);
        assert!(!robot.system_watchdog);
    }

    #[test]
    fn test_full_telemetry_tail() {
        let mut robot = RobotState::default();
        let mut frame = header(0x00);
        frame.put_u16(12 * 256 + 128); // 12.5 V
        frame.put_u8(67); // CAN %
        frame.put_i8(-55); // wifi dB
        frame.put_u16(2500); // 2.5 Mb/s

        decode_status_frame(&frame, &mut robot).unwrap();

        assert!((robot.battery_voltage - 12.5).abs() < 0.01);
        assert_eq!(robot.can_utilization, 67.0);
        assert_eq!(robot.wifi_db, -55);
        assert!((robot.wifi_mb - 2.5).abs() < 0.001);
    }

    #[test]
    fn test_partial_tail_keeps_remaining_fields() {
        let mut robot = primed_state();

        // 9-byte frame: battery, CAN, and wifi dB fit after the header,
        // the 2-byte bandwidth field does not
        let mut frame = header(0x00);
        frame.put_u16(10 * 256);
        frame.put_u8(12);
        frame.put_i8(-70);
        frame.put_u8(0); // half of the bandwidth field; never parsed
        decode_status_frame(&frame, &mut robot).unwrap();
        assert_eq!(robot.battery_voltage, 10.0);
        assert_eq!(robot.can_utilization, 12.0);
        assert_eq!(robot.wifi_db, -70);
        assert_eq!(robot.wifi_mb, 3.5); // retained
    }

    #[test]
    fn test_version_strings_null_trimmed() {
        let mut robot = RobotState::default();
        let mut frame = header(0x00);
        frame.put_u16(12 * 256);
        frame.put_u8(0);
        frame.put_i8(0);
        frame.put_u16(0);
        frame.put_slice(b"24.0.1\0\0");
        frame.put_slice(b"1.6.0\0\0\0");
        frame.put_slice(b"2.3\0\0\0\0\0");
        frame.put_slice(b"5.29\0\0\0\0");

        decode_status_frame(&frame, &mut robot).unwrap();

        assert_eq!(robot.ds_version, "24.0.1");
        assert_eq!(robot.pcm_version, "1.6.0");
        assert_eq!(robot.pdp_version, "2.3");
        assert_eq!(robot.radio_version, "5.29");
    }

    #[test]
    fn test_version_tail_absent_below_threshold() {
        let mut robot = primed_state();
        let mut frame = header(0x00);
        frame.put_u16(12 * 256);
        frame.put_u8(0);
        frame.put_i8(0);
        frame.put_u16(0);
        frame.put_slice(&[0u8; 19]); // below the 20-byte version threshold

        decode_status_frame(&frame, &mut robot).unwrap();
        assert_eq!(robot.ds_version, DS_VERSION);
        assert_eq!(robot.pcm_version, "1.1");
    }

    #[test]
    fn test_encode_decode_axis_agreement() {
        use crate::proto::encoder::encode_axis;
        for raw in [-127i8, -64, 0, 64, 127] {
            let value = raw as f32 / 127.0;
            assert_eq!(encode_axis(value), raw);
        }
    }
}
