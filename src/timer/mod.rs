//! Timer and tick-loop utilities.
//!
//! The receiver needs one periodic interrupt at [`TICK_HZ`] driving the laser
//! blink and the penalty clock. The transmitter only needs a fixed delay
//! between packets. Two approaches are provided: an interrupt service
//! routine keeping the blinker in a `critical_section::Mutex` (`timer-isr`
//! feature), and a busy-loop delay driving the transmitter (`delay-loop`
//! feature).
//!
//! Contains helpers for:
//! - `const_ocr_value`: compile-time compare value calculator
//! - `run_transmit_loop`: blocking transmitter loop over `DelayNs` (feature `delay-loop`)
//! - `global_blink_tick` and `tick_blinker!()`: interrupt-side tick callback (feature `timer-isr`)
//!
//! Common settings for a 1 s tick: (For use with `const_ocr_value`)
//!
//! | F_CPU  | PRESCALER | Compare value |
//! |--------|-----------|---------------|
//! | 16 MHz |       256 |         62499 |
//! |  8 MHz |       256 |         31249 |
//! | 16 MHz |      1024 |         15624 |
//!
//! [`TICK_HZ`]: crate::consts::TICK_HZ

use crate::consts::{F_CPU, TICK_PERIOD_US, TICK_PRESCALER};

#[cfg(feature = "delay-loop")]
mod delay;
#[cfg_attr(feature = "delay-loop", allow(unused_imports))]
#[cfg(feature = "delay-loop")]
pub use delay::*;

#[cfg(feature = "timer-isr")]
mod isr;
#[cfg_attr(feature = "timer-isr", allow(unused_imports))]
#[cfg(feature = "timer-isr")]
pub use isr::*;

#[cfg(feature = "timer-isr")]
mod macros;

/// 1,000,000 microseconds = 1 second
pub const MICROSECONDS_PER_SECOND: u32 = 1_000_000;

/// Compare value for the reference board's 1 Hz tick.
pub const TICK_OCR: u16 = const_ocr_value(F_CPU, TICK_PRESCALER, TICK_PERIOD_US);

/// Computes the compare register value for a timer in CTC mode.
///
/// The counter runs from 0 to the compare value inclusive, so the result is
/// one less than the number of timer counts per period. Integer arithmetic
/// only; truncates instead of rounding.
///
/// # Arguments
/// - `f_cpu`: CPU frequency in Hz
/// - `prescaler`: timer prescaler (e.g., 64, 256, 1024)
/// - `period_us`: desired interrupt period in microseconds
///
/// # Returns
/// - Compare value for OCRnA, saturating at `u16::MAX`
pub const fn const_ocr_value(f_cpu: u32, prescaler: u32, period_us: u32) -> u16 {
    let counts = (f_cpu / prescaler) as u64 * period_us as u64 / MICROSECONDS_PER_SECOND as u64;
    if counts == 0 {
        0
    } else if counts - 1 > u16::MAX as u64 {
        u16::MAX
    } else {
        (counts - 1) as u16
    }
}
