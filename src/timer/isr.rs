use crate::blink::{LaserBlinker, SharedBlinker, shared_blink_tick};
use crate::penalty::{PenaltyClock, TickEvent};
use crate::peripherals::Indicator;
use core::cell::RefCell;
use critical_section::Mutex;

/// The global slot holding the interrupt-owned [`LaserBlinker`].
///
/// A `&'static GlobalBlinker` is also the [`LaserCutoff`](crate::blink::LaserCutoff)
/// handed to the receiver.
pub type GlobalBlinker<L> = SharedBlinker<'static, L>;

/// Used to initialize the global static `LaserBlinker` for use with
/// `critical_section`.
///
/// # Returns
/// * An empty mutable ref-cell
///
/// # Example
/// ```rust,ignore
/// use laserlink::peripherals::PinIndicator;
/// use laserlink::timer::{GlobalBlinker, global_blinker_init};
/// use some_hal::PC1;
///
/// static BLINKER: GlobalBlinker<PinIndicator<PC1>> = global_blinker_init();
/// ```
pub const fn global_blinker_init<L: Indicator>() -> GlobalBlinker<L> {
    Mutex::new(RefCell::new(None))
}

/// Installs the blinker the timer interrupt will drive.
///
/// # Arguments
/// * The global static slot
/// * The laser output
/// * The penalty clock shared with the receiver
///
/// # Example
/// ```rust,ignore
/// static CLOCK: PenaltyClock = PenaltyClock::new();
///
/// fn main() {
///     global_blinker_setup(&BLINKER, PinIndicator::new(laser_pin), &CLOCK);
/// }
/// ```
pub fn global_blinker_setup<L: Indicator>(
    global_blinker: &'static GlobalBlinker<L>,
    laser: L,
    clock: &'static PenaltyClock,
) {
    critical_section::with(|cs| {
        let _ = global_blinker
            .borrow(cs)
            .replace(Some(LaserBlinker::new(laser, clock)));
    });
}

/// Runs the tick at each interrupt
///
/// # Returns
/// * What the tick did, or `None` when the blinker has not been installed yet
///
/// # Example
/// ```rust,ignore
/// #[avr_device::interrupt(atmega328p)]
/// fn TIMER1_COMPA() {
///     let _ = global_blink_tick(&BLINKER);
/// }
/// ```
pub fn global_blink_tick<L: Indicator>(
    global_blinker: &'static GlobalBlinker<L>,
) -> Option<TickEvent> {
    shared_blink_tick(global_blinker)
}
