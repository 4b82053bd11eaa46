//! Lives, hits, and the penalty cooldown.
//!
//! The receiver has two states, `NORMAL` and `PENALIZED`. A hit (a dark
//! light-sensor reading while the robot still has lives) costs one life and
//! starts a penalty that the 1 Hz timer ends [`PENALTY_TICKS`] ticks later.
//!
//! The state is split by execution context:
//!
//! - [`PenaltyClock`] holds what the timer interrupt touches: the
//!   penalty-active flag, the elapsed-tick counter and the tick-occurred
//!   signal. Each is a single atomic word. The interrupt path
//!   ([`PenaltyClock::on_tick`]) runs inside a critical section. The main
//!   loop reads the flag and counter without one; a stale read costs at
//!   most one loop iteration.
//! - [`LifeState`] holds the lives and the hit latch, owned by the main loop.
//!
//! ## Rendezvous
//!
//! When a hit is registered the main loop pulses the motors until the next
//! tick ([`PenaltyClock::wait_for_next_tick`]). The tick-occurred signal is
//! cleared inside a critical section right before the spin, so a tick landing
//! between the clear and the first poll is never lost. The wait lasts at most
//! one tick period and cannot be cancelled: the hit is already committed.

use crate::consts::{HIT_THRESHOLD, MAX_LIVES, PENALTY_TICKS};
use portable_atomic::{AtomicBool, AtomicU8, Ordering};

/// What a timer tick did to the penalty state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum TickEvent {
    /// Not penalized: the laser blinks and the tick is signalled.
    Blink,
    /// Still penalized after this many elapsed ticks.
    Penalized(u8),
    /// The penalty just expired. The robot blinks again from this tick on.
    Released,
}

impl TickEvent {
    /// Whether the laser blinks on this tick.
    pub const fn blinks(self) -> bool {
        !matches!(self, TickEvent::Penalized(_))
    }
}

/// Penalty state shared between the timer interrupt and the main loop.
///
/// Create one as a `static` and hand out shared references:
///
/// ```rust
/// use laserlink::penalty::PenaltyClock;
///
/// static CLOCK: PenaltyClock = PenaltyClock::new();
///
/// CLOCK.arm();
/// assert!(CLOCK.is_penalized());
/// for _ in 0..5 {
///     let _ = CLOCK.on_tick();
/// }
/// assert!(!CLOCK.is_penalized());
/// ```
#[derive(Debug)]
pub struct PenaltyClock {
    active: AtomicBool,
    elapsed: AtomicU8,
    tick_seen: AtomicBool,
}

impl Default for PenaltyClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PenaltyClock {
    /// A clock in the `NORMAL` state.
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            elapsed: AtomicU8::new(0),
            tick_seen: AtomicBool::new(false),
        }
    }

    /// Whether a penalty is running.
    pub fn is_penalized(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Ticks elapsed in the current penalty, `0` when not penalized.
    pub fn elapsed_ticks(&self) -> u8 {
        self.elapsed.load(Ordering::Acquire)
    }

    /// Whether a blinking tick has happened since the signal was last cleared.
    pub fn tick_seen(&self) -> bool {
        self.tick_seen.load(Ordering::Acquire)
    }

    /// Starts a penalty.
    pub fn arm(&self) {
        critical_section::with(|_| {
            self.elapsed.store(0, Ordering::Release);
            self.active.store(true, Ordering::Release);
        });
    }

    /// Advances the clock by one timer tick. Call from the timer interrupt.
    pub fn on_tick(&self) -> TickEvent {
        critical_section::with(|_| {
            let event = if self.active.load(Ordering::Acquire) {
                let elapsed = self.elapsed.load(Ordering::Acquire).saturating_add(1);
                if elapsed >= PENALTY_TICKS {
                    self.elapsed.store(0, Ordering::Release);
                    self.active.store(false, Ordering::Release);
                    TickEvent::Released
                } else {
                    self.elapsed.store(elapsed, Ordering::Release);
                    TickEvent::Penalized(elapsed)
                }
            } else {
                TickEvent::Blink
            };
            if event.blinks() {
                self.tick_seen.store(true, Ordering::Release);
            }
            event
        })
    }

    /// Blocks until the next blinking tick, at most one tick period.
    pub fn wait_for_next_tick(&self) {
        critical_section::with(|_| self.tick_seen.store(false, Ordering::Release));
        while !self.tick_seen.load(Ordering::Acquire) {
            core::hint::spin_loop();
        }
        self.tick_seen.store(false, Ordering::Release);
    }
}

/// Lives and the hit latch. Owned by the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct LifeState {
    lives: u8,
    hit_latched: bool,
}

impl Default for LifeState {
    fn default() -> Self {
        Self::new()
    }
}

impl LifeState {
    /// Full lives, latch open.
    pub const fn new() -> Self {
        Self {
            lives: MAX_LIVES,
            hit_latched: false,
        }
    }

    /// Lives left.
    pub const fn lives(&self) -> u8 {
        self.lives
    }

    /// Whether the sensor has stayed dark since the last hit.
    pub const fn is_latched(&self) -> bool {
        self.hit_latched
    }

    /// Feeds one light-sensor reading.
    ///
    /// Returns the lives left when the reading registers a hit: the reading is
    /// below [`HIT_THRESHOLD`], lives remain, and the sensor has gone bright
    /// since the previous hit. A reading at or above the threshold re-opens
    /// the latch. There is no hysteresis, a reading hovering around the
    /// threshold can re-open the latch between two samples.
    pub fn observe(&mut self, reading: u16) -> Option<u8> {
        if reading >= HIT_THRESHOLD {
            self.hit_latched = false;
            return None;
        }
        if self.lives == 0 || self.hit_latched {
            return None;
        }
        self.lives -= 1;
        self.hit_latched = true;
        Some(self.lives)
    }

    /// Restores all lives. Only acts when none are left; returns whether it did.
    pub fn reset(&mut self) -> bool {
        if self.lives != 0 {
            return false;
        }
        self.lives = MAX_LIVES;
        true
    }
}
