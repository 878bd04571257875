//! # DS Link
//!
//! Drive a competition robot from your desktop.
//!
//! This application polls locally attached gamepads, streams control
//! packets to the robot over UDP, and surfaces the robot's telemetry.

use anyhow::Result;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod proto;
mod session;
mod input;
mod telemetry;

use config::Config;
use input::{InputEvent, InputPollerHandle};
use proto::protocol::MAX_JOYSTICKS;
use session::{ControlSession, LinkEvent};
use telemetry::StatusLogger;

/// Configuration file consulted at startup; built-in defaults apply when absent.
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main entry point for DS Link
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (or fall back to defaults)
///    - Spawn the gamepad poller and open the robot link
///
/// 2. **Main Loop**
///    - Forward normalized controller updates into the session's joystick
///      slots; the session's own 50 Hz task does the sending
///    - Log telemetry and link/input events as they arrive
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Graceful Shutdown**
///    - Stop the poller, then disconnect the session (timers before socket)
///
/// # Errors
///
/// Returns error if the configuration is invalid or the local driver
/// station port cannot be bound.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(writer)
        .init();

    info!("DS Link v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::load_or_default(DEFAULT_CONFIG_PATH)?;
    info!(
        "team {} -> robot {}",
        config.network.team_number,
        config.network.robot_address()?
    );

    let (poller, mut input_events) = InputPollerHandle::spawn(config.input.clone());
    let (mut session, mut link_events) = ControlSession::new(config.network.clone());
    session.connect(None).await?;

    let mut status_logger = if config.telemetry.enabled {
        Some(StatusLogger::new(&config.telemetry)?)
    } else {
        None
    };

    let mut input_open = true;
    loop {
        tokio::select! {
            event = input_events.recv(), if input_open => match event {
                Some(InputEvent::ControllerUpdate { id, state }) => {
                    if id < MAX_JOYSTICKS {
                        session.update_joystick(id, &state.axes, state.buttons, state.pov);
                    } else {
                        debug!("controller slot {id} has no joystick slot; ignoring");
                    }
                }
                Some(InputEvent::ControllerConnected(descriptor)) => {
                    info!(
                        "controller ready: {} (slot {}, {:?}, {} axes, {} buttons)",
                        descriptor.name,
                        descriptor.id,
                        descriptor.kind,
                        descriptor.axis_count,
                        descriptor.button_count
                    );
                }
                Some(InputEvent::ControllerDisconnected(id)) => {
                    warn!("controller in slot {id} removed");
                    // Center the slot so the robot never holds a stale stick value
                    session.update_joystick(id, &[], 0, -1);
                }
                Some(InputEvent::Initialized) => info!("gamepad polling active"),
                Some(InputEvent::Error(reason)) => warn!("input unavailable: {reason}"),
                Some(InputEvent::Shutdown) | None => input_open = false,
            },
            event = link_events.recv() => match event {
                Some(LinkEvent::Connected) => info!("robot link up"),
                Some(LinkEvent::Disconnected) => info!("robot link closed"),
                Some(LinkEvent::RobotStatus(state)) => {
                    debug!(
                        "robot status: {:.2} V, CAN {:.0}%, wifi {} dB",
                        state.battery_voltage, state.can_utilization, state.wifi_db
                    );
                    if let Some(logger) = status_logger.as_mut() {
                        if let Err(e) = logger.log(&state) {
                            warn!("telemetry log failed: {e}");
                        }
                    }
                }
                Some(LinkEvent::Heartbeat(state)) => {
                    debug!("heartbeat: battery {:.2} V", state.battery_voltage);
                }
                Some(LinkEvent::Error(reason)) => warn!("link error: {reason}"),
                Some(LinkEvent::StateChange(delta)) => debug!("state change: {delta:?}"),
                Some(LinkEvent::JoystickUpdate(update)) => {
                    debug!("joystick slot {} rewritten", update.id);
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    poller.shutdown();
    session.disconnect();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path() {
        assert!(DEFAULT_CONFIG_PATH.ends_with(".toml"));
    }

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let config = Config::load_or_default("/nonexistent/ds-link.toml").unwrap();
        assert_eq!(config.network.send_rate_hz, 50);
        assert!(config.validate().is_ok());
    }
}
