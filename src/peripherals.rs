//! Capability traits for the robot's peripherals, and `embedded-hal` adapters.
//!
//! The control logic never touches registers. It drives these narrow traits
//! instead, so it can run against real pins on the target and against fakes
//! on the host. Adapters are provided for the usual wiring:
//!
//! - [`PinIndicator`]: one LED or laser on an [`OutputPin`]
//! - [`PinBank`]: a row of LEDs, used for the life and auxiliary indicators
//! - [`ActiveLowButtons`]: four pull-up push buttons
//! - [`PwmMotors`]: two PWM channels plus the direction relay pins
//!
//! Pin errors are ignored. On the supported HALs GPIO writes are infallible,
//! and the control loop has no way to recover from a failed write anyway.
//! Analog sampling has no `embedded-hal` 1.0 trait, so [`LightSensor`] and
//! [`Joystick`] are implemented directly on top of the board's ADC.

use crate::consts::BUTTON_COUNT;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::pwm::SetDutyCycle;

/// Direction relays of the motor driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Direction {
    /// Relays energized, motors turn forward.
    Forward,
    /// Relays released. Motors turn backwards when engaged.
    Released,
}

/// The drive train.
pub trait MotorActuator {
    /// Enables both motors at full duty.
    fn engage(&mut self);
    /// Cuts both motors.
    fn disengage(&mut self);
    /// Sets the duty of each side, `0..=255`.
    fn set_duty(&mut self, left: u8, right: u8);
    /// Drives the direction relays.
    fn set_direction(&mut self, direction: Direction);
}

/// A single on/off indicator such as the laser.
pub trait Indicator {
    /// Flips the output.
    fn toggle(&mut self);
    /// Forces the output off.
    fn force_off(&mut self);
    /// Current output state.
    fn is_on(&self) -> bool;
}

/// The life indicators, one per life.
pub trait LifeIndicators {
    /// Turns off the indicator at `index`.
    fn clear(&mut self, index: usize);
    /// Flips every indicator.
    fn toggle_all(&mut self);
}

/// The three utility indicators toggled from the transmitter buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum AuxChannel {
    /// Toggled by `TOGGLE_A`.
    A,
    /// Toggled by `TOGGLE_B`.
    B,
    /// Toggled by `TOGGLE_C`.
    C,
}

impl AuxChannel {
    /// Position of the channel in a [`PinBank`].
    pub const fn index(self) -> usize {
        match self {
            AuxChannel::A => 0,
            AuxChannel::B => 1,
            AuxChannel::C => 2,
        }
    }
}

/// Outputs flipped by the utility commands.
pub trait AuxIndicators {
    /// Flips the output of `channel`.
    fn toggle(&mut self, channel: AuxChannel);
}

/// The hit sensor.
pub trait LightSensor {
    /// Samples the sensor, `0..=1023`. Lower means darker.
    fn read(&mut self) -> u16;
}

/// Joystick axes on the transmitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Axis {
    /// Left/right.
    X,
    /// Forward/backward.
    Y,
}

impl Axis {
    /// ADC channel the axis is wired to on the reference transmitter.
    pub const fn channel(self) -> u8 {
        match self {
            Axis::X => 3,
            Axis::Y => 2,
        }
    }
}

/// The transmitter's analog stick.
pub trait Joystick {
    /// Samples one axis, `0..=1023`.
    fn read_axis(&mut self, axis: Axis) -> u16;
}

/// Pressed-button bit mask, bit `n` set when button `n` is held.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct ButtonMask(pub u8);

impl ButtonMask {
    /// No buttons pressed.
    pub const NONE: ButtonMask = ButtonMask(0);

    /// Whether button `index` is held.
    pub const fn is_pressed(self, index: usize) -> bool {
        index < BUTTON_COUNT && self.0 & (1 << index) != 0
    }
}

/// The transmitter's push buttons.
pub trait Buttons {
    /// Samples all buttons at once.
    fn read_mask(&mut self) -> ButtonMask;
}

/// An [`Indicator`] driving one output pin.
///
/// The pin state is tracked locally so only [`OutputPin`] is required.
#[derive(Debug)]
pub struct PinIndicator<P: OutputPin> {
    /// The output pin
    pub pin: P,
    on: bool,
}

impl<P: OutputPin> PinIndicator<P> {
    /// Wraps `pin`, driving it low.
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_low();
        Self { pin, on: false }
    }

    fn write(&mut self, on: bool) {
        self.on = on;
        if on {
            let _ = self.pin.set_high();
        } else {
            let _ = self.pin.set_low();
        }
    }
}

impl<P: OutputPin> Indicator for PinIndicator<P> {
    fn toggle(&mut self) {
        self.write(!self.on);
    }

    fn force_off(&mut self) {
        self.write(false);
    }

    fn is_on(&self) -> bool {
        self.on
    }
}

/// A row of `N` indicator pins of the same type.
#[derive(Debug)]
pub struct PinBank<P: OutputPin, const N: usize> {
    /// The output pins, index 0 first
    pub pins: [P; N],
    states: [bool; N],
}

impl<P: OutputPin, const N: usize> PinBank<P, N> {
    /// Wraps `pins`, driving all of them low.
    pub fn new(mut pins: [P; N]) -> Self {
        for pin in pins.iter_mut() {
            let _ = pin.set_low();
        }
        Self {
            pins,
            states: [false; N],
        }
    }

    /// State of the pin at `index`, `false` when out of range.
    pub fn is_on(&self, index: usize) -> bool {
        self.states.get(index).copied().unwrap_or(false)
    }

    fn write(&mut self, index: usize, on: bool) {
        if let Some(pin) = self.pins.get_mut(index) {
            self.states[index] = on;
            if on {
                let _ = pin.set_high();
            } else {
                let _ = pin.set_low();
            }
        }
    }
}

impl<P: OutputPin, const N: usize> LifeIndicators for PinBank<P, N> {
    fn clear(&mut self, index: usize) {
        self.write(index, false);
    }

    fn toggle_all(&mut self) {
        for index in 0..N {
            let on = !self.states[index];
            self.write(index, on);
        }
    }
}

impl<P: OutputPin, const N: usize> AuxIndicators for PinBank<P, N> {
    fn toggle(&mut self, channel: AuxChannel) {
        let index = channel.index();
        let on = !self.is_on(index);
        self.write(index, on);
    }
}

/// Four push buttons wired to ground with pull-ups, so pressed reads low.
///
/// Not debounced: a bouncing contact simply produces a utility command on
/// several consecutive transmit ticks.
#[derive(Debug)]
pub struct ActiveLowButtons<P: InputPin> {
    /// The input pins, button 0 first
    pub pins: [P; BUTTON_COUNT],
}

impl<P: InputPin> ActiveLowButtons<P> {
    /// Wraps the four button pins.
    pub fn new(pins: [P; BUTTON_COUNT]) -> Self {
        Self { pins }
    }
}

impl<P: InputPin> Buttons for ActiveLowButtons<P> {
    fn read_mask(&mut self) -> ButtonMask {
        let mut mask = 0u8;
        for (bit, pin) in self.pins.iter_mut().enumerate() {
            if pin.is_low().unwrap_or(false) {
                mask |= 1 << bit;
            }
        }
        ButtonMask(mask)
    }
}

/// A [`MotorActuator`] over two PWM channels and a pair of direction relays.
#[derive(Debug)]
pub struct PwmMotors<L, R, D>
where
    L: SetDutyCycle,
    R: SetDutyCycle,
    D: OutputPin,
{
    /// Left motor PWM channel
    pub left: L,
    /// Right motor PWM channel
    pub right: R,
    /// Direction relay pins, switched together
    pub relays: [D; 2],
}

impl<L, R, D> PwmMotors<L, R, D>
where
    L: SetDutyCycle,
    R: SetDutyCycle,
    D: OutputPin,
{
    /// Wraps the channels. Nothing is driven until the first command.
    pub fn new(left: L, right: R, relays: [D; 2]) -> Self {
        Self {
            left,
            right,
            relays,
        }
    }
}

impl<L, R, D> MotorActuator for PwmMotors<L, R, D>
where
    L: SetDutyCycle,
    R: SetDutyCycle,
    D: OutputPin,
{
    fn engage(&mut self) {
        let _ = self.left.set_duty_cycle_fully_on();
        let _ = self.right.set_duty_cycle_fully_on();
    }

    fn disengage(&mut self) {
        let _ = self.left.set_duty_cycle_fully_off();
        let _ = self.right.set_duty_cycle_fully_off();
    }

    fn set_duty(&mut self, left: u8, right: u8) {
        let _ = self
            .left
            .set_duty_cycle_fraction(u16::from(left), u16::from(u8::MAX));
        let _ = self
            .right
            .set_duty_cycle_fraction(u16::from(right), u16::from(u8::MAX));
    }

    fn set_direction(&mut self, direction: Direction) {
        for relay in self.relays.iter_mut() {
            let _ = match direction {
                Direction::Forward => relay.set_high(),
                Direction::Released => relay.set_low(),
            };
        }
    }
}
