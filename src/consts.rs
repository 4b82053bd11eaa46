//! Constants shared by the transmitter and the receiver.
//!
//! This module defines the protocol-wide values both ends of the link must
//! agree on (radio channel, pipe address, payload length), the joystick
//! quantization band, and the thresholds driving the hit/penalty rules on the
//! receiver.
//!
//! ## Key Concepts
//!
//! - **Neutral band**: raw axis readings in `[AXIS_LOW, AXIS_HIGH]` count as centred.
//! - **Hit threshold**: a light-sensor reading below [`HIT_THRESHOLD`] is a hit.
//! - **Penalty**: lasts [`PENALTY_TICKS`] ticks of the 1 Hz timer.
//! - **Timer clocking**: the defaults describe an ATmega328P at 16 MHz.

/// Length (in bytes) of every packet on the link: command code + speed.
pub const PACKET_LEN: usize = 2;

/// Radio channel used by both ends of the link.
pub const RADIO_CHANNEL: u8 = 76;

/// The fixed 5-byte pipe address shared by transmitter and receiver.
///
/// There is no pairing or discovery; both nodes must be flashed with the same value.
pub const LINK_ADDRESS: [u8; 5] = *b"NODE1";

/// Raw axis readings below this value quantize to `-1`.
pub const AXIS_LOW: u16 = 200;

/// Raw axis readings above this value quantize to `+1`.
pub const AXIS_HIGH: u16 = 800;

/// Largest value a 10-bit ADC axis or light sensor can report.
pub const ANALOG_MAX: u16 = 1023;

/// Speed byte sent while the Y axis sits in the neutral band.
pub const SPEED_MAX: u8 = u8::MAX;

/// Number of buttons on the transmitter.
pub const BUTTON_COUNT: usize = 4;

/// Light-sensor readings strictly below this value register as a hit.
pub const HIT_THRESHOLD: u16 = 30;

/// Lives a robot starts with, and is restored to by `RESET_LIVES`.
pub const MAX_LIVES: u8 = 3;

/// Number of timer ticks a penalty lasts.
pub const PENALTY_TICKS: u8 = 5;

/// Interval between two transmitted packets, in milliseconds.
pub const TX_PERIOD_MS: u32 = 50;

/// Receiver tick rate. The penalty and laser blink are counted in these ticks.
pub const TICK_HZ: u32 = 1;

/// See [`TICK_HZ`](crate::consts::TICK_HZ)
pub const TICK_PERIOD_US: u32 = 1_000_000 / TICK_HZ;

/// Default CPU clock of the reference board, in Hz.
pub const F_CPU: u32 = 16_000_000;

/// Timer prescaler used for the 1 Hz compare interrupt on the reference board.
pub const TICK_PRESCALER: u32 = 256;
