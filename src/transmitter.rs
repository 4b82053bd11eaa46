//! The handheld side of the link.
//!
//! [`Transmitter`] samples the joystick and buttons, encodes one
//! [`Packet`] and hands it to the radio. It never waits for or retries a
//! delivery: if the radio is busy the packet is dropped and the next tick
//! sends fresh state anyway.
//!
//! Call [`step()`](Transmitter::step) every [`TX_PERIOD_MS`] milliseconds,
//! or use [`run_transmit_loop`](crate::timer::run_transmit_loop) with the
//! `delay-loop` feature.

use crate::command::Packet;
use crate::consts::TX_PERIOD_MS;
use crate::joystick::JoystickSample;
use crate::macros::log_debug;
use crate::peripherals::{Axis, Buttons, Joystick};
use crate::radio::{LinkConfig, RadioLink, setup_transmitter};

/// The transmitter's inputs and radio.
#[derive(Debug)]
pub struct Transmitter<J, B, R>
where
    J: Joystick,
    B: Buttons,
    R: RadioLink,
{
    /// Analog stick
    pub joystick: J,
    /// Push buttons
    pub buttons: B,
    /// Radio link
    pub link: R,

    /// Count of packets accepted by the radio.
    pub tx_good: u16,

    /// Count of packets dropped because the radio was busy or failed.
    pub tx_dropped: u16,
}

impl<J, B, R> Transmitter<J, B, R>
where
    J: Joystick,
    B: Buttons,
    R: RadioLink,
{
    /// Creates a transmitter.
    pub fn new(joystick: J, buttons: B, link: R) -> Self {
        Self {
            joystick,
            buttons,
            link,
            tx_good: 0,
            tx_dropped: 0,
        }
    }

    /// Configures the radio for sending.
    pub fn setup(&mut self, config: &LinkConfig) -> Result<(), R::Error> {
        setup_transmitter(&mut self.link, config)
    }

    /// Samples all inputs.
    pub fn sample(&mut self) -> JoystickSample {
        let y = self.joystick.read_axis(Axis::Y);
        let x = self.joystick.read_axis(Axis::X);
        let buttons = self.buttons.read_mask();
        JoystickSample::new(x, y, buttons)
    }

    /// Samples, encodes and sends one packet. Returns the packet, whether or
    /// not the radio accepted it.
    pub fn step(&mut self) -> Packet {
        let packet = self.sample().to_packet();
        match self.link.write(&packet.to_bytes()) {
            Ok(()) => self.tx_good = self.tx_good.wrapping_add(1),
            Err(_) => {
                self.tx_dropped = self.tx_dropped.wrapping_add(1);
                log_debug!("radio busy, dropped packet {}", self.tx_dropped);
            }
        }
        packet
    }

    /// The interval between two [`step()`](Transmitter::step) calls, in milliseconds.
    pub const fn period_ms(&self) -> u32 {
        TX_PERIOD_MS
    }
}
