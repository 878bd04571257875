//! # Input Poller Module
//!
//! Samples every attached gamepad on a fixed timer and normalizes raw
//! hardware state into stable [`ControllerState`] records.
//!
//! Each poll tick drains pending gilrs events (keeping its cached device
//! state fresh), diffs the set of connected gamepads against the previous
//! tick for hotplug events, and then runs the update algorithm per device:
//! deadzone-filtered axes, a 32-bit button mask, and a POV angle derived
//! from the d-pad buttons. An update event is emitted only when something
//! actually changed, so observers never see redundant state at poll rate.
//!
//! The poller task exclusively owns the `Gilrs` context; the handle talks
//! to it over a command channel and events flow back over an unbounded
//! channel.

use gilrs::ff::{BaseEffect, BaseEffectType, EffectBuilder, Replay, Ticks};
use gilrs::{Axis, Button, GamepadId, Gilrs};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::mapping::ControllerKind;
use crate::config::InputConfig;
use crate::proto::protocol::{AXES_PER_JOYSTICK, MAX_BUTTONS, POV_CENTERED};

/// Axes the fixed gilrs mapping populates (of the 12 carried per slot).
pub const POLLED_AXES: usize = 6;

/// Buttons the fixed gilrs mapping populates (of the 32 carried per slot).
pub const POLLED_BUTTONS: usize = 17;

/// Minimum post-deadzone axis change before the state counts as dirty.
pub const AXIS_EPSILON: f32 = 0.01;

/// Axis sampling order; indices match the display names in
/// [`super::mapping::axis_name`].
const AXIS_ORDER: [Axis; POLLED_AXES] = [
    Axis::LeftStickX,
    Axis::LeftStickY,
    Axis::RightStickX,
    Axis::RightStickY,
    Axis::LeftZ,
    Axis::RightZ,
];

/// Button sampling order; indices match the display tables in
/// [`super::mapping::button_name`].
const BUTTON_ORDER: [Button; POLLED_BUTTONS] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
    Button::Mode,
];

// D-pad button indices feeding the POV angle
const DPAD_UP: usize = 12;
const DPAD_DOWN: usize = 13;
const DPAD_LEFT: usize = 14;
const DPAD_RIGHT: usize = 15;

/// Immutable facts about an attached controller, fixed at connect time.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerDescriptor {
    /// Stable slot index for the life of the connection.
    pub id: usize,
    /// Device name as reported by the driver.
    pub name: String,
    /// Vendor classification from the name.
    pub kind: ControllerKind,
    pub axis_count: usize,
    pub button_count: usize,
}

/// Normalized state of one controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    /// Axis values with the deadzone applied, -1.0 to 1.0.
    pub axes: [f32; AXES_PER_JOYSTICK],
    /// Button bitmask, bit i = button i held.
    pub buttons: u32,
    /// Per-button held flags.
    pub raw_buttons: [bool; MAX_BUTTONS],
    /// D-pad angle in degrees, -1 = centered.
    pub pov: i16,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            axes: [0.0; AXES_PER_JOYSTICK],
            buttons: 0,
            raw_buttons: [false; MAX_BUTTONS],
            pov: POV_CENTERED,
        }
    }
}

/// One raw hardware snapshot, before normalization.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawSample {
    pub axes: [f32; AXES_PER_JOYSTICK],
    pub buttons: [bool; MAX_BUTTONS],
}

impl Default for RawSample {
    fn default() -> Self {
        Self {
            axes: [0.0; AXES_PER_JOYSTICK],
            buttons: [false; MAX_BUTTONS],
        }
    }
}

/// Events emitted by the poller task.
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// The gamepad backend is up and polling has started.
    Initialized,
    /// A new device appeared.
    ControllerConnected(ControllerDescriptor),
    /// A previously seen device vanished; its slot id is released.
    ControllerDisconnected(usize),
    /// A device's normalized state changed this tick.
    ControllerUpdate { id: usize, state: ControllerState },
    /// The backend is unavailable; no polling will happen.
    Error(String),
    /// The poller stopped and all device state was discarded.
    Shutdown,
}

enum Command {
    Vibrate {
        id: usize,
        weak: f32,
        strong: f32,
        duration_ms: u32,
        reply: oneshot::Sender<bool>,
    },
    Pause,
    Resume,
    Shutdown,
}

/// Handle to a running input poller task.
pub struct InputPollerHandle {
    commands: mpsc::UnboundedSender<Command>,
    deadzone: Arc<AtomicU32>,
}

impl InputPollerHandle {
    /// Spawn the poller task and return its handle plus the event channel.
    ///
    /// If the gamepad backend cannot be initialized, a single
    /// [`InputEvent::Error`] is emitted and no polling happens; the handle
    /// stays usable but every `vibrate` resolves to `false`.
    pub fn spawn(config: InputConfig) -> (Self, mpsc::UnboundedReceiver<InputEvent>) {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (events, event_rx) = mpsc::unbounded_channel();
        let deadzone = Arc::new(AtomicU32::new(
            config.deadzone.clamp(0.0, 1.0).to_bits(),
        ));

        let task_deadzone = Arc::clone(&deadzone);
        tokio::spawn(run_poller(config, task_deadzone, command_rx, events));

        (Self { commands, deadzone }, event_rx)
    }

    /// Set the axis deadzone, clamped to 0.0-1.0.
    pub fn set_deadzone(&self, deadzone: f32) {
        self.deadzone
            .store(deadzone.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    /// Current axis deadzone.
    pub fn deadzone(&self) -> f32 {
        f32::from_bits(self.deadzone.load(Ordering::Relaxed))
    }

    /// Rumble a controller, best effort.
    ///
    /// Resolves to `false` when the device is absent, rumble is
    /// unsupported, or the poller is gone. Has no effect on polling.
    pub async fn vibrate(&self, id: usize, weak: f32, strong: f32, duration_ms: u32) -> bool {
        let (reply, response) = oneshot::channel();
        if self
            .commands
            .send(Command::Vibrate {
                id,
                weak,
                strong,
                duration_ms,
                reply,
            })
            .is_err()
        {
            return false;
        }
        response.await.unwrap_or(false)
    }

    /// Suspend polling; device state is kept.
    pub fn pause(&self) {
        self.commands.send(Command::Pause).ok();
    }

    /// Resume a paused poller.
    pub fn resume(&self) {
        self.commands.send(Command::Resume).ok();
    }

    /// Stop the poll task and discard all device state. Idempotent.
    pub fn shutdown(&self) {
        self.commands.send(Command::Shutdown).ok();
    }
}

struct DeviceEntry {
    descriptor: ControllerDescriptor,
    state: ControllerState,
    /// Keeps the last rumble effect alive; replaced on the next vibrate.
    #[allow(dead_code)]
    effect: Option<gilrs::ff::Effect>,
}

struct InputPoller {
    gilrs: Gilrs,
    devices: HashMap<GamepadId, DeviceEntry>,
    deadzone: Arc<AtomicU32>,
    events: mpsc::UnboundedSender<InputEvent>,
}

async fn run_poller(
    config: InputConfig,
    deadzone: Arc<AtomicU32>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<InputEvent>,
) {
    let gilrs = match Gilrs::new() {
        Ok(gilrs) => gilrs,
        Err(e) => {
            warn!("gamepad backend unavailable: {e}");
            events
                .send(InputEvent::Error(format!("gamepad backend unavailable: {e}")))
                .ok();
            return;
        }
    };
    info!(
        "input poller started at {} Hz (deadzone {:.2})",
        config.poll_rate_hz,
        f32::from_bits(deadzone.load(Ordering::Relaxed))
    );
    events.send(InputEvent::Initialized).ok();

    let mut poller = InputPoller {
        gilrs,
        devices: HashMap::new(),
        deadzone,
        events,
    };
    let mut paused = config.start_paused;
    let mut ticker =
        tokio::time::interval(Duration::from_millis(1000 / config.poll_rate_hz));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !paused {
                    poller.poll_tick();
                }
            }
            command = commands.recv() => match command {
                Some(Command::Vibrate { id, weak, strong, duration_ms, reply }) => {
                    reply.send(poller.vibrate(id, weak, strong, duration_ms)).ok();
                }
                Some(Command::Pause) => {
                    debug!("input polling paused");
                    paused = true;
                }
                Some(Command::Resume) => {
                    debug!("input polling resumed");
                    paused = false;
                }
                Some(Command::Shutdown) | None => break,
            }
        }
    }

    poller.devices.clear();
    info!("input poller stopped");
    poller.events.send(InputEvent::Shutdown).ok();
}

impl InputPoller {
    fn poll_tick(&mut self) {
        // Drain pending events so the cached gamepad state is current
        while let Some(event) = self.gilrs.next_event() {
            debug!("gilrs event: {:?} from {:?}", event.event, event.id);
        }

        let connected: Vec<(GamepadId, String)> = self
            .gilrs
            .gamepads()
            .map(|(id, pad)| (id, pad.name().to_string()))
            .collect();

        // Departures first, so their slots free up for arrivals this tick
        let gone: Vec<GamepadId> = self
            .devices
            .keys()
            .filter(|known| !connected.iter().any(|(id, _)| id == *known))
            .copied()
            .collect();
        for id in gone {
            if let Some(entry) = self.devices.remove(&id) {
                info!(
                    "controller disconnected: {} (slot {})",
                    entry.descriptor.name, entry.descriptor.id
                );
                self.events
                    .send(InputEvent::ControllerDisconnected(entry.descriptor.id))
                    .ok();
            }
        }

        let deadzone = f32::from_bits(self.deadzone.load(Ordering::Relaxed));
        for (id, name) in connected {
            if !self.devices.contains_key(&id) {
                let descriptor = ControllerDescriptor {
                    id: self.alloc_slot(),
                    kind: ControllerKind::from_name(&name),
                    name,
                    axis_count: POLLED_AXES,
                    button_count: POLLED_BUTTONS,
                };
                info!(
                    "controller connected: {} (slot {}, {:?})",
                    descriptor.name, descriptor.id, descriptor.kind
                );
                self.devices.insert(
                    id,
                    DeviceEntry {
                        descriptor: descriptor.clone(),
                        state: ControllerState::default(),
                        effect: None,
                    },
                );
                self.events
                    .send(InputEvent::ControllerConnected(descriptor))
                    .ok();
            }

            let sample = sample_gamepad(&self.gilrs.gamepad(id));
            let update = self.devices.get_mut(&id).and_then(|entry| {
                update_state(&mut entry.state, &sample, deadzone)
                    .then(|| (entry.descriptor.id, entry.state.clone()))
            });
            if let Some((slot, state)) = update {
                self.events
                    .send(InputEvent::ControllerUpdate { id: slot, state })
                    .ok();
            }
        }
    }

    /// Smallest slot index not currently in use.
    fn alloc_slot(&self) -> usize {
        let mut slot = 0;
        while self.devices.values().any(|entry| entry.descriptor.id == slot) {
            slot += 1;
        }
        slot
    }

    fn vibrate(&mut self, slot: usize, weak: f32, strong: f32, duration_ms: u32) -> bool {
        let Some(gamepad_id) = self
            .devices
            .iter()
            .find(|(_, entry)| entry.descriptor.id == slot)
            .map(|(id, _)| *id)
        else {
            return false;
        };
        if !self.gilrs.gamepad(gamepad_id).is_ff_supported() {
            debug!("rumble unsupported on slot {slot}");
            return false;
        }

        let strong_magnitude = (strong.clamp(0.0, 1.0) * f32::from(u16::MAX)) as u16;
        let weak_magnitude = (weak.clamp(0.0, 1.0) * f32::from(u16::MAX)) as u16;
        let play_for = Ticks::from_ms(duration_ms);

        let built = EffectBuilder::new()
            .add_effect(BaseEffect {
                kind: BaseEffectType::Strong {
                    magnitude: strong_magnitude,
                },
                scheduling: Replay {
                    play_for,
                    ..Default::default()
                },
                envelope: Default::default(),
            })
            .add_effect(BaseEffect {
                kind: BaseEffectType::Weak {
                    magnitude: weak_magnitude,
                },
                scheduling: Replay {
                    play_for,
                    ..Default::default()
                },
                envelope: Default::default(),
            })
            .gamepads(&[gamepad_id])
            .finish(&mut self.gilrs);

        match built {
            Ok(effect) => match effect.play() {
                Ok(()) => {
                    if let Some(entry) = self.devices.get_mut(&gamepad_id) {
                        entry.effect = Some(effect);
                    }
                    true
                }
                Err(e) => {
                    debug!("rumble playback failed on slot {slot}: {e}");
                    false
                }
            },
            Err(e) => {
                debug!("rumble effect upload failed on slot {slot}: {e}");
                false
            }
        }
    }
}

/// Snapshot one gamepad through the fixed axis/button mapping.
fn sample_gamepad(pad: &gilrs::Gamepad<'_>) -> RawSample {
    let mut sample = RawSample::default();
    for (i, axis) in AXIS_ORDER.iter().enumerate() {
        sample.axes[i] = pad.value(*axis).clamp(-1.0, 1.0);
    }
    for (i, button) in BUTTON_ORDER.iter().enumerate() {
        sample.buttons[i] = pad.is_pressed(*button);
    }
    sample
}

/// Run the per-device update algorithm, returning whether anything changed.
///
/// Axes below the deadzone magnitude snap to 0; a stored axis only moves
/// when the new value differs by more than [`AXIS_EPSILON`]. Buttons dirty
/// the state on any transition. The POV angle is re-derived from the d-pad
/// buttons each tick.
pub(crate) fn update_state(
    state: &mut ControllerState,
    sample: &RawSample,
    deadzone: f32,
) -> bool {
    let mut changed = false;

    for i in 0..AXES_PER_JOYSTICK {
        let mut value = sample.axes[i];
        if value.abs() < deadzone {
            value = 0.0;
        }
        if (state.axes[i] - value).abs() > AXIS_EPSILON {
            state.axes[i] = value;
            changed = true;
        }
    }

    let mut mask = 0u32;
    for i in 0..MAX_BUTTONS {
        if sample.buttons[i] {
            mask |= 1 << i;
        }
        if state.raw_buttons[i] != sample.buttons[i] {
            state.raw_buttons[i] = sample.buttons[i];
            changed = true;
        }
    }
    if state.buttons != mask {
        state.buttons = mask;
        changed = true;
    }

    let pov = pov_angle(
        sample.buttons[DPAD_UP],
        sample.buttons[DPAD_DOWN],
        sample.buttons[DPAD_LEFT],
        sample.buttons[DPAD_RIGHT],
    );
    if state.pov != pov {
        state.pov = pov;
        changed = true;
    }

    changed
}

/// Convert d-pad button state to a POV angle in degrees.
///
/// Diagonals take priority over single directions; no direction is -1.
pub(crate) fn pov_angle(up: bool, down: bool, left: bool, right: bool) -> i16 {
    if up && right {
        45
    } else if down && right {
        135
    } else if down && left {
        225
    } else if up && left {
        315
    } else if up {
        0
    } else if right {
        90
    } else if down {
        180
    } else if left {
        270
    } else {
        POV_CENTERED
    }
}
