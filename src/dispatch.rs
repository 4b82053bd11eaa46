//! Motion command dispatch.
//!
//! [`Dispatcher`] turns a motion [`Command`] and its speed into motor
//! settings. The only state it keeps is the "currently forward" flag, which
//! blocks [`Command::Reverse`] while the robot drives forward so the motors
//! are never slammed from forward into reverse. Only [`Command::Stop`]
//! clears the flag.
//!
//! Duty values per command (`s` is the packet speed):
//!
//! | Command         | Left        | Right       |
//! |-----------------|-------------|-------------|
//! | `Forward`       | `s`         | `s`         |
//! | `Reverse`       | `255 - s`   | `255 - s`   |
//! | `Left`          | `0`         | `s`         |
//! | `Right`         | `s`         | `0`         |
//! | `ForwardLeft`   | `s / 2`     | `s`         |
//! | `ForwardRight`  | `s`         | `s / 2`     |
//! | `ReverseLeft`   | `s / 2`     | `255 - s`   |
//! | `ReverseRight`  | `255 - s`   | `s / 2`     |
//!
//! Utility commands are handled by the receiver and are a no-op here.

use crate::command::Command;
use crate::peripherals::{Direction, MotorActuator};

/// What a motion command asks of the motors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum DriveIntent {
    /// Cut the motors and release the direction relays.
    Stop,
    /// Engage the motors at the given duty, switching the relays first if set.
    Drive {
        /// Left duty
        left: u8,
        /// Right duty
        right: u8,
        /// Relay setting to apply, `None` leaves the relays alone
        direction: Option<Direction>,
    },
    /// Leave the motors as they are.
    Hold,
}

/// Computes the intent of `command` given the "currently forward" flag.
pub fn drive_intent(command: Command, speed: u8, forward: bool) -> DriveIntent {
    let full = speed;
    let half = speed >> 1;
    let inverted = u8::MAX - speed;
    let drive = |left, right| DriveIntent::Drive {
        left,
        right,
        direction: None,
    };
    match command {
        Command::Stop => DriveIntent::Stop,
        Command::Forward => DriveIntent::Drive {
            left: full,
            right: full,
            direction: Some(Direction::Forward),
        },
        Command::Reverse if forward => DriveIntent::Hold,
        Command::Reverse => DriveIntent::Drive {
            left: inverted,
            right: inverted,
            direction: Some(Direction::Released),
        },
        Command::Left => drive(0, full),
        Command::Right => drive(full, 0),
        Command::ForwardLeft => drive(half, full),
        Command::ForwardRight => drive(full, half),
        Command::ReverseLeft => drive(half, inverted),
        Command::ReverseRight => drive(inverted, half),
        Command::ResetLives | Command::ToggleA | Command::ToggleB | Command::ToggleC => {
            DriveIntent::Hold
        }
    }
}

/// Applies motion commands to a [`MotorActuator`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Dispatcher {
    forward: bool,
}

impl Dispatcher {
    /// A dispatcher with the forward flag clear.
    pub const fn new() -> Self {
        Self { forward: false }
    }

    /// Whether the robot was last commanded forward and not stopped since.
    pub const fn is_forward(&self) -> bool {
        self.forward
    }

    /// Applies `command` to `motors`. Returns the intent that was carried out.
    pub fn drive<M: MotorActuator>(
        &mut self,
        command: Command,
        speed: u8,
        motors: &mut M,
    ) -> DriveIntent {
        let intent = drive_intent(command, speed, self.forward);
        match intent {
            DriveIntent::Stop => {
                motors.disengage();
                motors.set_direction(Direction::Released);
                self.forward = false;
            }
            DriveIntent::Drive {
                left,
                right,
                direction,
            } => {
                if let Some(direction) = direction {
                    motors.set_direction(direction);
                }
                motors.engage();
                motors.set_duty(left, right);
                if command == Command::Forward {
                    self.forward = true;
                }
            }
            DriveIntent::Hold => {}
        }
        intent
    }
}
