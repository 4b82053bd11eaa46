//! Joystick encoder: turns stick and button state into a [`Packet`].
//!
//! Each axis is quantized to three positions using the neutral band
//! `[AXIS_LOW, AXIS_HIGH]`, and the pair of positions selects one of nine
//! motion commands. A single held button overrides the stick for that
//! sample; a chord of several buttons is ignored.
//! The speed byte is derived from the Y axis alone and encodes how far the
//! stick is pushed, not which way.

use crate::command::{Command, Packet};
use crate::consts::{ANALOG_MAX, AXIS_HIGH, AXIS_LOW, BUTTON_COUNT, SPEED_MAX};
use crate::peripherals::ButtonMask;

/// Quantized position of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum AxisDir {
    /// Below the neutral band (left, or backwards).
    Negative,
    /// Inside the neutral band.
    Neutral,
    /// Above the neutral band (right, or forwards).
    Positive,
}

impl AxisDir {
    /// Every position, negative first.
    pub const ALL: [AxisDir; 3] = [AxisDir::Negative, AxisDir::Neutral, AxisDir::Positive];
}

/// Utility command bound to each button, button 0 first.
const BUTTON_COMMANDS: [Command; BUTTON_COUNT] = [
    Command::ResetLives,
    Command::ToggleA,
    Command::ToggleB,
    Command::ToggleC,
];

/// Quantizes a raw `0..=1023` axis reading.
pub const fn quantize_axis(raw: u16) -> AxisDir {
    if raw < AXIS_LOW {
        AxisDir::Negative
    } else if raw > AXIS_HIGH {
        AxisDir::Positive
    } else {
        AxisDir::Neutral
    }
}

/// Maps a pair of quantized axes to a motion command.
pub const fn map_axes_to_command(x: AxisDir, y: AxisDir) -> Command {
    match (x, y) {
        (AxisDir::Neutral, AxisDir::Neutral) => Command::Stop,
        (AxisDir::Neutral, AxisDir::Positive) => Command::Forward,
        (AxisDir::Neutral, AxisDir::Negative) => Command::Reverse,
        (AxisDir::Negative, AxisDir::Neutral) => Command::Left,
        (AxisDir::Positive, AxisDir::Neutral) => Command::Right,
        (AxisDir::Negative, AxisDir::Positive) => Command::ForwardLeft,
        (AxisDir::Positive, AxisDir::Positive) => Command::ForwardRight,
        (AxisDir::Negative, AxisDir::Negative) => Command::ReverseLeft,
        (AxisDir::Positive, AxisDir::Negative) => Command::ReverseRight,
    }
}

/// Computes the speed byte from the raw Y axis.
///
/// Inside the neutral band the speed is [`SPEED_MAX`]. Outside it the speed
/// falls linearly to 0 at either end of the ADC range.
pub fn compute_speed(y: u16) -> u8 {
    let y = u32::from(y.min(ANALOG_MAX));
    let max = u32::from(SPEED_MAX);
    let low = u32::from(AXIS_LOW);
    let high = u32::from(AXIS_HIGH);
    let reduction = if y > high {
        (y - (high + 1)) * max / (u32::from(ANALOG_MAX) - (high + 1))
    } else if y < low {
        ((low - 1) - y) * max / (low - 1)
    } else {
        0
    };
    max.saturating_sub(reduction) as u8
}

/// Returns the utility command of the held button, if exactly one is held.
///
/// Bits above the four buttons are ignored.
pub fn button_override(buttons: ButtonMask) -> Option<Command> {
    let mut held = (0..BUTTON_COUNT).filter(|&index| buttons.is_pressed(index));
    match (held.next(), held.next()) {
        (Some(index), None) => BUTTON_COMMANDS.get(index).copied(),
        _ => None,
    }
}

/// One sample of the transmitter's inputs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct JoystickSample {
    /// Raw X axis, `0..=1023`
    pub x: u16,
    /// Raw Y axis, `0..=1023`
    pub y: u16,
    /// Held buttons
    pub buttons: ButtonMask,
}

impl JoystickSample {
    /// Creates a sample.
    pub const fn new(x: u16, y: u16, buttons: ButtonMask) -> Self {
        Self { x, y, buttons }
    }

    /// The command this sample encodes to.
    pub fn command(&self) -> Command {
        button_override(self.buttons)
            .unwrap_or_else(|| map_axes_to_command(quantize_axis(self.x), quantize_axis(self.y)))
    }

    /// The speed byte this sample encodes to.
    pub fn speed(&self) -> u8 {
        compute_speed(self.y)
    }

    /// The packet this sample encodes to.
    pub fn to_packet(&self) -> Packet {
        Packet::new(self.command(), self.speed())
    }
}
