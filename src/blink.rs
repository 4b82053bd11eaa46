//! The 1 Hz laser blink driver.
//!
//! [`LaserBlinker`] owns the laser output and is driven from the timer
//! interrupt. On every tick it advances the shared [`PenaltyClock`] and then
//! either toggles the laser (normal operation) or forces it off (penalized).
//!
//! The blinker lives in a [`SharedBlinker`] so the main loop can also reach
//! the laser: when a penalty starts, the receiver cuts it through
//! [`LaserCutoff`] instead of waiting for the next penalized tick.
//!
//! For interrupt wiring see [`crate::timer`].

use crate::macros::log_info;
use crate::penalty::{PenaltyClock, TickEvent};
use crate::peripherals::Indicator;
use core::cell::RefCell;
use critical_section::Mutex;

/// A [`LaserBlinker`] shared between the timer interrupt and the main loop.
pub type SharedBlinker<'a, L> = Mutex<RefCell<Option<LaserBlinker<'a, L>>>>;

/// Turns the laser off from the main loop.
pub trait LaserCutoff {
    /// Forces the laser off. It stays off until the next blinking tick.
    fn cut_laser(&mut self);
}

/// Blinks the laser on each tick while the robot is not penalized.
///
/// # Example
///
/// ```rust
/// # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
/// use laserlink::blink::LaserBlinker;
/// use laserlink::penalty::{PenaltyClock, TickEvent};
/// use laserlink::peripherals::PinIndicator;
///
/// static CLOCK: PenaltyClock = PenaltyClock::new();
///
/// # let pin = Pin::new(&[
/// #     PinTransaction::set(PinState::Low),
/// #     PinTransaction::set(PinState::Low),
/// #     PinTransaction::set(PinState::High),
/// # ]);
/// let mut blinker = LaserBlinker::new(PinIndicator::new(pin), &CLOCK);
/// assert_eq!(blinker.on_tick(), TickEvent::Blink);
/// assert!(blinker.is_laser_on());
/// # blinker.laser.pin.done();
/// ```
#[derive(Debug)]
pub struct LaserBlinker<'a, L: Indicator> {
    /// The laser output
    pub laser: L,
    clock: &'a PenaltyClock,
    /// Number of ticks handled so far
    pub ticks: u32,
}

impl<'a, L: Indicator> LaserBlinker<'a, L> {
    /// Creates a blinker driving `laser` from `clock`. The laser starts off.
    pub fn new(mut laser: L, clock: &'a PenaltyClock) -> Self {
        laser.force_off();
        Self {
            laser,
            clock,
            ticks: 0,
        }
    }

    /// Handles one timer tick.
    pub fn on_tick(&mut self) -> TickEvent {
        self.ticks = self.ticks.wrapping_add(1);
        let event = self.clock.on_tick();
        if event == TickEvent::Released {
            log_info!("penalty released");
        }
        if event.blinks() {
            self.laser.toggle();
        } else {
            self.laser.force_off();
        }
        event
    }

    /// Whether the laser is currently on.
    pub fn is_laser_on(&self) -> bool {
        self.laser.is_on()
    }

    /// Moves the blinker into a [`SharedBlinker`].
    pub fn into_shared(self) -> SharedBlinker<'a, L> {
        Mutex::new(RefCell::new(Some(self)))
    }
}

impl<L: Indicator> LaserCutoff for LaserBlinker<'_, L> {
    fn cut_laser(&mut self) {
        self.laser.force_off();
    }
}

impl<L: Indicator> LaserCutoff for &SharedBlinker<'_, L> {
    fn cut_laser(&mut self) {
        critical_section::with(|cs| {
            if let Some(blinker) = self.borrow(cs).borrow_mut().as_mut() {
                blinker.cut_laser();
            }
        });
    }
}

/// Ticks a shared blinker, if one has been installed.
pub fn shared_blink_tick<L: Indicator>(shared: &SharedBlinker<'_, L>) -> Option<TickEvent> {
    critical_section::with(|cs| {
        shared
            .borrow(cs)
            .borrow_mut()
            .as_mut()
            .map(|blinker| blinker.on_tick())
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::consts::PENALTY_TICKS;

    #[derive(Debug, Default)]
    pub(crate) struct FakeLaser {
        pub(crate) on: bool,
        pub(crate) toggles: u32,
    }

    /// Reads the laser of a shared blinker.
    pub(crate) fn shared_laser_on(shared: &SharedBlinker<'_, FakeLaser>) -> bool {
        critical_section::with(|cs| {
            shared
                .borrow(cs)
                .borrow()
                .as_ref()
                .is_some_and(|blinker| blinker.is_laser_on())
        })
    }

    impl Indicator for FakeLaser {
        fn toggle(&mut self) {
            self.on = !self.on;
            self.toggles += 1;
        }

        fn force_off(&mut self) {
            self.on = false;
        }

        fn is_on(&self) -> bool {
            self.on
        }
    }

    #[test]
    fn test_blinks_once_per_tick() {
        let clock = PenaltyClock::new();
        let mut blinker = LaserBlinker::new(FakeLaser::default(), &clock);
        let mut expected = false;
        for _ in 0..6 {
            assert_eq!(blinker.on_tick(), TickEvent::Blink);
            expected = !expected;
            assert_eq!(blinker.is_laser_on(), expected);
        }
        assert_eq!(blinker.laser.toggles, 6);
        assert_eq!(blinker.ticks, 6);
    }

    #[test]
    fn test_laser_off_while_penalized() {
        let clock = PenaltyClock::new();
        let mut blinker = LaserBlinker::new(FakeLaser::default(), &clock);
        let _ = blinker.on_tick();
        assert!(blinker.is_laser_on());

        clock.arm();
        for _ in 1..PENALTY_TICKS {
            assert!(matches!(blinker.on_tick(), TickEvent::Penalized(_)));
            assert!(!blinker.is_laser_on());
        }
        // The releasing tick already blinks.
        assert_eq!(blinker.on_tick(), TickEvent::Released);
        assert!(blinker.is_laser_on());
        assert!(!clock.is_penalized());
    }

    #[test]
    fn test_cut_right_after_arm() {
        let clock = PenaltyClock::new();
        let mut blinker = LaserBlinker::new(FakeLaser::default(), &clock);
        assert_eq!(blinker.on_tick(), TickEvent::Blink);
        assert!(blinker.is_laser_on());

        clock.arm();
        blinker.cut_laser();
        assert!(clock.is_penalized());
        assert!(!blinker.is_laser_on());
        assert_eq!(blinker.on_tick(), TickEvent::Penalized(1));
        assert!(!blinker.is_laser_on());
    }

    #[test]
    fn test_shared_blinker_cut_and_tick() {
        let clock = PenaltyClock::new();
        let shared = LaserBlinker::new(FakeLaser::default(), &clock).into_shared();
        assert_eq!(shared_blink_tick(&shared), Some(TickEvent::Blink));
        assert!(shared_laser_on(&shared));

        clock.arm();
        let mut cutoff = &shared;
        cutoff.cut_laser();
        assert!(!shared_laser_on(&shared));

        for _ in 1..PENALTY_TICKS {
            assert!(matches!(
                shared_blink_tick(&shared),
                Some(TickEvent::Penalized(_))
            ));
            assert!(!shared_laser_on(&shared));
        }
        assert_eq!(shared_blink_tick(&shared), Some(TickEvent::Released));
        assert!(shared_laser_on(&shared));
    }

    #[test]
    fn test_empty_slot_is_ignored() {
        let empty: SharedBlinker<'_, FakeLaser> = Mutex::new(RefCell::new(None));
        assert_eq!(shared_blink_tick(&empty), None);
        let mut cutoff = &empty;
        cutoff.cut_laser();
    }
}
