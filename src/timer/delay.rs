use crate::peripherals::{Buttons, Joystick};
use crate::radio::RadioLink;
use crate::transmitter::Transmitter;
use embedded_hal::delay::DelayNs;

/// Runs a blocking loop that sends one packet every `period_ms` milliseconds.
///
/// This is the transmitter's whole main loop. Timing comes from a delay
/// provider implementing `embedded_hal::delay::DelayNs`, so the period is
/// `period_ms` plus the time spent sampling and writing.
///
/// # Arguments
/// - `transmitter`: A configured [`Transmitter`].
/// - `delay`: A delay provider implementing `DelayNs`, typically from the HAL.
/// - `period_ms`: The pause between packets (e.g. [`TX_PERIOD_MS`](crate::consts::TX_PERIOD_MS)).
///
/// # Example
/// ```rust,ignore
/// use laserlink::timer::run_transmit_loop;
/// let mut tx = Transmitter::new(stick, buttons, radio);
/// tx.setup(&LinkConfig::default())?;
/// run_transmit_loop(&mut tx, &mut delay, tx.period_ms());
/// ```
///
/// # Notes
/// - This loop will never return; it is intended for single-purpose firmware.
/// - Busy-radio drops are counted in `transmitter.tx_dropped` and never retried.
pub fn run_transmit_loop<D, J, B, R>(
    transmitter: &mut Transmitter<J, B, R>,
    delay: &mut D,
    period_ms: u32,
) -> !
where
    D: DelayNs,
    J: Joystick,
    B: Buttons,
    R: RadioLink,
{
    loop {
        let _ = transmit_once(transmitter, delay, period_ms);
    }
}

/// One iteration of [`run_transmit_loop`]: send, then wait.
pub fn transmit_once<D, J, B, R>(
    transmitter: &mut Transmitter<J, B, R>,
    delay: &mut D,
    period_ms: u32,
) -> crate::command::Packet
where
    D: DelayNs,
    J: Joystick,
    B: Buttons,
    R: RadioLink,
{
    let packet = transmitter.step();
    delay.delay_ms(period_ms);
    packet
}
