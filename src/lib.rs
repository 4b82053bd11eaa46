//! # laserlink
//!
//! A portable, no_std Rust firmware core for a two-node 2.4 GHz remote control
//! link driving a small laser-tag combat robot.
//!
//! The handheld **transmitter** samples a two-axis joystick and four buttons,
//! encodes the state as a 2-byte packet and sends it every 50 ms without
//! waiting for acknowledgement. The robot-side **receiver** decodes packets
//! into motor and indicator actions, watches a light sensor for laser hits,
//! and keeps a lives/penalty state machine. A 1 Hz timer interrupt blinks the
//! robot's own laser and drives the penalty clock.
//!
//! Hardware is reached only through `embedded-hal` traits and the small
//! capability traits in [`peripherals`] and [`radio`], so the whole control
//! logic runs on the host under test.
//!
//! ## Crate features
//! | Feature               | Description |
//! |-----------------------|-------------|
//! | `std`                 | Disables `#![no_std]` support |
//! | `delay-loop`          | Adds `run_transmit_loop` over `embedded_hal::delay::DelayNs` |
//! | `timer-isr` (default) | Adds the `critical_section` globals and macros for the tick interrupt |
//! | `defmt-0-3`           | Uses `defmt` logging |
//! | `log`                 | Uses `log` logging |
//!
//! ## Usage
//!
//! Receiver:
//!
//! ```rust,ignore
//! use laserlink::{init_blinker, setup_blinker, tick_blinker};
//! use laserlink::receiver::Receiver;
//!
//! init_blinker!(PinIndicator<LaserPin>);
//!
//! fn main() -> ! {
//!     setup_blinker!(PinIndicator::new(laser_pin));
//!     let mut rx =
//!         Receiver::new(radio, motors, sensor, lives, aux, &LASER_BLINKER, &PENALTY_CLOCK);
//!     rx.setup(&LinkConfig::default()).ok();
//!     rx.run()
//! }
//!
//! #[avr_device::interrupt(atmega328p)]
//! fn TIMER1_COMPA() {
//!     tick_blinker!();
//! }
//! ```
//!
//! Transmitter:
//!
//! ```rust,ignore
//! let mut tx = Transmitter::new(stick, buttons, radio);
//! tx.setup(&LinkConfig::default()).ok();
//! laserlink::timer::run_transmit_loop(&mut tx, &mut delay, TX_PERIOD_MS);
//! ```
//!
//! ## Integration Notes
//!
//! - The tick interrupt must fire at [`consts::TICK_HZ`]; see
//!   [`timer::TICK_OCR`] for the reference board's compare value.
//! - Only one receiver and one blinker should share a [`penalty::PenaltyClock`].
//! - A hit blocks the receiver's main loop until the next tick.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(all(test, not(feature = "std")))]
extern crate std;

pub use critical_section;
pub use heapless;

pub(crate) mod macros;

pub mod blink;
pub mod command;
pub mod consts;
pub mod dispatch;
pub mod joystick;
pub mod penalty;
pub mod peripherals;
pub mod radio;
pub mod receiver;
pub mod timer;
pub mod transmitter;
