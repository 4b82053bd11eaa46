/// Declares a static global `LASER_BLINKER` instance protected by a `critical_section` mutex,
/// together with the `PENALTY_CLOCK` it shares with the receiver.
///
/// This macro creates the `static` singletons needed when both the main loop
/// and a timer ISR touch the penalty state.
///
/// # Arguments
/// - `$laser`: The concrete type of the laser output (must implement `Indicator`)
///
/// # Example
/// ```rust,ignore
/// init_blinker!(PinIndicator<MyLaserPinType>);
/// ```
#[macro_export]
macro_rules! init_blinker {
    ( $laser:ty ) => {
        pub static PENALTY_CLOCK: $crate::penalty::PenaltyClock =
            $crate::penalty::PenaltyClock::new();
        pub static LASER_BLINKER: $crate::timer::GlobalBlinker<$laser> =
            $crate::timer::global_blinker_init();
    };
}

/// Installs the laser into the global `LASER_BLINKER`.
///
/// # Arguments
/// - `$laser`: The laser output value (must implement `Indicator`)
///
/// # Example
/// ```rust,ignore
/// main() {
///     setup_blinker!(PinIndicator::new(laser_pin));
/// }
/// ```
///
/// # Notes
/// - Requires `init_blinker!` to have been used earlier.
#[macro_export]
macro_rules! setup_blinker {
    ( $laser:expr ) => {
        $crate::timer::global_blinker_setup(&LASER_BLINKER, $laser, &PENALTY_CLOCK)
    };
}

/// Ticks the global `LASER_BLINKER` if it has been installed.
///
/// This macro is intended to be invoked from the 1 Hz timer ISR.
///
/// # Example
/// ```rust,ignore
/// #[avr_device::interrupt(atmega328p)]
/// fn TIMER1_COMPA() {
///     tick_blinker!();
/// }
/// ```
///
/// # Notes
/// - This macro assumes `LASER_BLINKER` was declared with `init_blinker!`
///   and initialized via `setup_blinker!`.
/// - Safe to call repeatedly, does nothing until the blinker is set up.
#[macro_export]
macro_rules! tick_blinker {
    () => {
        let _ = $crate::timer::global_blink_tick(&LASER_BLINKER);
    };
}

#[cfg(test)]
mod tests {
    use crate::penalty::TickEvent;
    use crate::peripherals::Indicator;

    #[derive(Debug, Default)]
    pub struct Laser {
        on: bool,
    }

    impl Indicator for Laser {
        fn toggle(&mut self) {
            self.on = !self.on;
        }

        fn force_off(&mut self) {
            self.on = false;
        }

        fn is_on(&self) -> bool {
            self.on
        }
    }

    crate::init_blinker!(Laser);

    #[test]
    fn test_macros_drive_the_global_blinker() {
        crate::setup_blinker!(Laser::default());
        crate::tick_blinker!();
        PENALTY_CLOCK.arm();
        crate::tick_blinker!();
        assert_eq!(PENALTY_CLOCK.elapsed_ticks(), 1);
        assert_eq!(
            crate::timer::global_blink_tick(&LASER_BLINKER),
            Some(TickEvent::Penalized(2))
        );
    }
}
