//! The robot-side control loop.
//!
//! [`Receiver`] owns the radio, the motors, the light sensor and the
//! indicators, and runs one cooperative iteration per
//! [`poll()`](Receiver::poll):
//!
//! 1. If a penalty is running, cut the motors, drain the radio and stop there.
//! 2. Sample the light sensor.
//! 3. Read at most one packet and dispatch it.
//! 4. Feed the sample to the hit detector; on a hit, pulse the motors until
//!    the next timer tick, start the penalty and cut the laser.
//!
//! The laser blink and the tick itself are handled from the timer interrupt
//! by [`LaserBlinker`](crate::blink::LaserBlinker), which shares the
//! [`PenaltyClock`] with the receiver.

use crate::blink::LaserCutoff;
use crate::command::{Command, Packet};
use crate::dispatch::{Dispatcher, DriveIntent};
use crate::macros::{log_debug, log_info, log_warn};
use crate::penalty::{LifeState, PenaltyClock};
use crate::peripherals::{AuxChannel, AuxIndicators, LifeIndicators, LightSensor, MotorActuator};
use crate::radio::{LinkConfig, RadioLink, setup_receiver};

/// What one [`Receiver::poll`] iteration did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct PollOutcome {
    /// The iteration was skipped because a penalty is running.
    pub penalized: bool,
    /// The command dispatched this iteration, if any.
    pub command: Option<Command>,
    /// Lives left, when this iteration registered a hit.
    pub hit: Option<u8>,
}

/// The receiver's main-loop state and peripherals.
///
/// ## Type Parameters
///
/// - `R`: the radio
/// - `M`: the drive train
/// - `S`: the hit sensor
/// - `L`: the life indicators, one per life
/// - `A`: the utility indicators
/// - `K`: the laser, as seen from the main loop
///
/// ## Example
///
/// ```rust,ignore
/// init_blinker!(PinIndicator<LaserPin>);
///
/// setup_blinker!(PinIndicator::new(laser_pin));
/// let mut receiver =
///     Receiver::new(radio, motors, ldr, life_leds, aux_leds, &LASER_BLINKER, &PENALTY_CLOCK);
/// receiver.setup(&LinkConfig::default())?;
/// receiver.run();
/// ```
#[derive(Debug)]
pub struct Receiver<'a, R, M, S, L, A, K>
where
    R: RadioLink,
    M: MotorActuator,
    S: LightSensor,
    L: LifeIndicators,
    A: AuxIndicators,
    K: LaserCutoff,
{
    /// Radio link
    pub link: R,
    /// Drive train
    pub motors: M,
    /// Hit sensor
    pub sensor: S,
    /// Life indicators
    pub life_leds: L,
    /// Utility indicators
    pub aux: A,
    /// Laser cutoff, used when a penalty starts
    pub laser: K,
    clock: &'a PenaltyClock,
    life: LifeState,
    dispatcher: Dispatcher,

    /// Count of packets decoded and dispatched.
    pub rx_good: u16,

    /// Count of packets rejected for an unknown command code.
    pub rx_bad: u16,

    /// Count of packets discarded while penalized.
    pub rx_drained: u16,
}

impl<'a, R, M, S, L, A, K> Receiver<'a, R, M, S, L, A, K>
where
    R: RadioLink,
    M: MotorActuator,
    S: LightSensor,
    L: LifeIndicators,
    A: AuxIndicators,
    K: LaserCutoff,
{
    /// Creates a receiver with full lives, sharing `clock` with the timer interrupt.
    pub fn new(
        link: R,
        motors: M,
        sensor: S,
        life_leds: L,
        aux: A,
        laser: K,
        clock: &'a PenaltyClock,
    ) -> Self {
        Self {
            link,
            motors,
            sensor,
            life_leds,
            aux,
            laser,
            clock,
            life: LifeState::new(),
            dispatcher: Dispatcher::new(),
            rx_good: 0,
            rx_bad: 0,
            rx_drained: 0,
        }
    }

    /// Stops the motors, lights the life indicators and starts listening.
    ///
    /// The life indicators are expected to start off, as
    /// [`PinBank::new`](crate::peripherals::PinBank::new) leaves them.
    pub fn setup(&mut self, config: &LinkConfig) -> Result<(), R::Error> {
        self.motors.disengage();
        self.life_leds.toggle_all();
        setup_receiver(&mut self.link, config)?;
        log_info!("receiver listening on channel {}", config.channel);
        Ok(())
    }

    /// Lives left.
    pub fn lives(&self) -> u8 {
        self.life.lives()
    }

    /// The hit detector state.
    pub fn life(&self) -> &LifeState {
        &self.life
    }

    /// Whether a penalty is running.
    pub fn is_penalized(&self) -> bool {
        self.clock.is_penalized()
    }

    /// Whether the robot was last commanded forward and not stopped since.
    pub fn is_forward(&self) -> bool {
        self.dispatcher.is_forward()
    }

    /// Runs one main-loop iteration.
    ///
    /// Blocks for up to one tick period when the iteration registers a hit.
    pub fn poll(&mut self) -> PollOutcome {
        if self.clock.is_penalized() {
            self.motors.disengage();
            self.drain();
            return PollOutcome {
                penalized: true,
                ..PollOutcome::default()
            };
        }

        let reading = self.sensor.read();
        let command = self.receive_and_dispatch();
        let hit = self.life.observe(reading);
        if let Some(lives_left) = hit {
            self.register_hit(lives_left);
        }
        PollOutcome {
            penalized: false,
            command,
            hit,
        }
    }

    /// Runs the main loop forever.
    pub fn run(&mut self) -> ! {
        loop {
            let _ = self.poll();
        }
    }

    fn drain(&mut self) {
        while self.link.try_read().is_ok() {
            self.rx_drained = self.rx_drained.wrapping_add(1);
        }
    }

    fn receive_and_dispatch(&mut self) -> Option<Command> {
        let bytes = self.link.try_read().ok()?;
        match Packet::from_bytes(bytes) {
            Ok(packet) => {
                self.rx_good = self.rx_good.wrapping_add(1);
                self.dispatch(packet);
                Some(packet.command)
            }
            Err(_) => {
                self.rx_bad = self.rx_bad.wrapping_add(1);
                log_debug!("dropping packet with code {}", bytes[0]);
                None
            }
        }
    }

    fn dispatch(&mut self, packet: Packet) {
        match packet.command {
            Command::ResetLives => {
                if self.life.reset() {
                    self.life_leds.toggle_all();
                    log_info!("lives reset");
                }
            }
            Command::ToggleA => self.aux.toggle(AuxChannel::A),
            Command::ToggleB => self.aux.toggle(AuxChannel::B),
            Command::ToggleC => self.aux.toggle(AuxChannel::C),
            motion => {
                let intent = self.dispatcher.drive(motion, packet.speed, &mut self.motors);
                if intent == DriveIntent::Hold {
                    log_debug!("reverse ignored while driving forward");
                }
            }
        }
    }

    fn register_hit(&mut self, lives_left: u8) {
        log_warn!("hit registered, {} lives left", lives_left);
        self.life_leds.clear(usize::from(lives_left));
        self.motors.engage();
        self.clock.wait_for_next_tick();
        self.motors.disengage();
        // Arm first: a tick landing before the cut is already a penalized one.
        self.clock.arm();
        self.laser.cut_laser();
        log_info!("penalty armed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blink::tests::{FakeLaser, shared_laser_on};
    use crate::blink::{LaserBlinker, SharedBlinker, shared_blink_tick};
    use crate::consts::PENALTY_TICKS;
    use crate::dispatch::tests::{MotorCall, RecordingMotors};
    use crate::penalty::TickEvent;
    use crate::radio::LoopbackLink;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use std::vec::Vec;

    #[derive(Debug)]
    struct FakeSensor {
        level: u16,
    }

    impl LightSensor for FakeSensor {
        fn read(&mut self) -> u16 {
            self.level
        }
    }

    #[derive(Debug, Default)]
    struct FakeLifeLeds {
        on: [bool; 3],
        cleared: Vec<usize>,
    }

    impl LifeIndicators for FakeLifeLeds {
        fn clear(&mut self, index: usize) {
            self.on[index] = false;
            self.cleared.push(index);
        }

        fn toggle_all(&mut self) {
            for led in self.on.iter_mut() {
                *led = !*led;
            }
        }
    }

    #[derive(Debug, Default)]
    struct FakeAux {
        toggles: [u8; 3],
    }

    impl AuxIndicators for FakeAux {
        fn toggle(&mut self, channel: AuxChannel) {
            self.toggles[channel.index()] += 1;
        }
    }

    type TestReceiver<'a, 'b> = Receiver<
        'a,
        LoopbackLink<8>,
        RecordingMotors,
        FakeSensor,
        FakeLifeLeds,
        FakeAux,
        &'b SharedBlinker<'a, FakeLaser>,
    >;

    const BRIGHT: u16 = 600;
    const DARK: u16 = 5;

    fn laser(clock: &PenaltyClock) -> SharedBlinker<'_, FakeLaser> {
        LaserBlinker::new(FakeLaser::default(), clock).into_shared()
    }

    fn receiver<'a, 'b>(
        clock: &'a PenaltyClock,
        laser: &'b SharedBlinker<'a, FakeLaser>,
    ) -> TestReceiver<'a, 'b> {
        let mut receiver = Receiver::new(
            LoopbackLink::new(),
            RecordingMotors::default(),
            FakeSensor { level: BRIGHT },
            FakeLifeLeds::default(),
            FakeAux::default(),
            laser,
            clock,
        );
        receiver.setup(&LinkConfig::default()).unwrap();
        receiver.motors.calls.clear();
        receiver
    }

    fn send(receiver: &mut TestReceiver<'_, '_>, command: Command, speed: u8) {
        assert!(receiver.link.inject(Packet::new(command, speed).to_bytes()));
    }

    /// Polls once while a helper thread plays the 1 Hz interrupt, which
    /// completes the hit rendezvous.
    fn poll_with_ticker(receiver: &mut TestReceiver<'_, '_>, clock: &PenaltyClock) -> PollOutcome {
        let done = AtomicBool::new(false);
        let laser = receiver.laser;
        std::thread::scope(|s| {
            let _ticker = s.spawn(|| {
                while !done.load(Ordering::Acquire) && !clock.is_penalized() {
                    std::thread::sleep(Duration::from_millis(1));
                    let _ = shared_blink_tick(laser);
                }
            });
            let outcome = receiver.poll();
            done.store(true, Ordering::Release);
            outcome
        })
    }

    fn expire_penalty(clock: &PenaltyClock) {
        let mut ticks = 0;
        while clock.is_penalized() {
            let _ = clock.on_tick();
            ticks += 1;
        }
        assert!(ticks <= PENALTY_TICKS);
    }

    #[test]
    fn test_setup_lights_lives_and_listens() {
        let clock = PenaltyClock::new();
        let laser = laser(&clock);
        let receiver = receiver(&clock, &laser);
        assert_eq!(receiver.life_leds.on, [true, true, true]);
        assert!(receiver.link.is_listening());
        assert_eq!(receiver.lives(), 3);
        assert!(!receiver.is_penalized());
    }

    #[test]
    fn test_forward_then_left_scenario() {
        let clock = PenaltyClock::new();
        let laser = laser(&clock);
        let mut receiver = receiver(&clock, &laser);

        send(&mut receiver, Command::Forward, 200);
        let outcome = receiver.poll();
        assert_eq!(outcome.command, Some(Command::Forward));
        assert!(receiver.motors.calls.contains(&MotorCall::Engage));
        assert_eq!(receiver.motors.duty, (200, 200));
        assert!(receiver.is_forward());

        send(&mut receiver, Command::Left, 180);
        let outcome = receiver.poll();
        assert_eq!(outcome.command, Some(Command::Left));
        assert_eq!(receiver.motors.duty, (0, 180));
        assert_eq!(receiver.rx_good, 2);
    }

    #[test]
    fn test_one_packet_per_iteration() {
        let clock = PenaltyClock::new();
        let laser = laser(&clock);
        let mut receiver = receiver(&clock, &laser);
        send(&mut receiver, Command::Forward, 10);
        send(&mut receiver, Command::Stop, 0);
        assert_eq!(receiver.poll().command, Some(Command::Forward));
        assert_eq!(receiver.link.len(), 1);
        assert_eq!(receiver.poll().command, Some(Command::Stop));
        assert_eq!(receiver.poll().command, None);
    }

    #[test]
    fn test_unknown_code_is_a_noop() {
        let clock = PenaltyClock::new();
        let laser = laser(&clock);
        let mut receiver = receiver(&clock, &laser);
        assert!(receiver.link.inject([0xA9, 100]));
        let outcome = receiver.poll();
        assert_eq!(outcome, PollOutcome::default());
        assert!(receiver.motors.calls.is_empty());
        assert_eq!(receiver.rx_bad, 1);
        assert_eq!(receiver.rx_good, 0);
    }

    #[test]
    fn test_toggle_commands_hit_independent_outputs() {
        let clock = PenaltyClock::new();
        let laser = laser(&clock);
        let mut receiver = receiver(&clock, &laser);
        for command in [Command::ToggleA, Command::ToggleC, Command::ToggleC] {
            send(&mut receiver, command, 0);
            let _ = receiver.poll();
        }
        assert_eq!(receiver.aux.toggles, [1, 0, 2]);
        assert!(receiver.motors.calls.is_empty());
    }

    #[test]
    fn test_hit_pulses_motors_and_penalizes() {
        let clock = PenaltyClock::new();
        let laser = laser(&clock);
        let mut receiver = receiver(&clock, &laser);
        receiver.sensor.level = DARK;

        let outcome = poll_with_ticker(&mut receiver, &clock);
        assert_eq!(outcome.hit, Some(2));
        assert!(receiver.is_penalized());
        assert_eq!(
            receiver.motors.calls,
            [MotorCall::Engage, MotorCall::Disengage]
        );
        assert_eq!(receiver.life_leds.cleared, [2]);
        assert_eq!(receiver.life_leds.on, [true, true, false]);
    }

    #[test]
    fn test_penalty_discards_packets_and_holds_motors() {
        let clock = PenaltyClock::new();
        let laser = laser(&clock);
        let mut receiver = receiver(&clock, &laser);
        receiver.sensor.level = DARK;
        let _ = poll_with_ticker(&mut receiver, &clock);
        receiver.sensor.level = BRIGHT;
        receiver.motors.calls.clear();

        while clock.is_penalized() {
            send(&mut receiver, Command::Forward, 255);
            send(&mut receiver, Command::ToggleA, 0);
            let outcome = receiver.poll();
            assert!(outcome.penalized);
            assert_eq!(outcome.command, None);
            assert!(receiver.link.is_empty());
            assert!(!receiver.motors.engaged);
            let _ = clock.on_tick();
        }
        assert!(receiver.rx_drained >= 2);
        assert_eq!(receiver.aux.toggles, [0, 0, 0]);
        assert!(!receiver.is_forward());

        send(&mut receiver, Command::Forward, 255);
        assert_eq!(receiver.poll().command, Some(Command::Forward));
        assert!(receiver.motors.engaged);
    }

    #[test]
    fn test_lives_sequence_and_reset() {
        let clock = PenaltyClock::new();
        let laser = laser(&clock);
        let mut receiver = receiver(&clock, &laser);

        for expected in [2, 1, 0] {
            receiver.sensor.level = DARK;
            let outcome = poll_with_ticker(&mut receiver, &clock);
            assert_eq!(outcome.hit, Some(expected));
            assert_eq!(receiver.lives(), expected);
            expire_penalty(&clock);
            receiver.sensor.level = BRIGHT;
            assert_eq!(receiver.poll().hit, None);
            assert!(!receiver.life().is_latched());
        }
        assert_eq!(receiver.life_leds.cleared, [2, 1, 0]);
        assert_eq!(receiver.life_leds.on, [false, false, false]);

        // A fourth hit at zero lives neither decrements nor penalizes.
        receiver.sensor.level = DARK;
        let outcome = receiver.poll();
        assert_eq!(outcome.hit, None);
        assert!(!receiver.is_penalized());
        assert_eq!(receiver.lives(), 0);

        receiver.sensor.level = BRIGHT;
        send(&mut receiver, Command::ResetLives, 0);
        assert_eq!(receiver.poll().command, Some(Command::ResetLives));
        assert_eq!(receiver.lives(), 3);
        assert_eq!(receiver.life_leds.on, [true, true, true]);

        // Resetting with lives left does nothing.
        send(&mut receiver, Command::ResetLives, 0);
        let _ = receiver.poll();
        assert_eq!(receiver.lives(), 3);
        assert_eq!(receiver.life_leds.on, [true, true, true]);
    }

    #[test]
    fn test_sustained_darkness_costs_one_life() {
        let clock = PenaltyClock::new();
        let laser = laser(&clock);
        let mut receiver = receiver(&clock, &laser);
        receiver.sensor.level = DARK;
        let _ = poll_with_ticker(&mut receiver, &clock);
        expire_penalty(&clock);

        for _ in 0..10 {
            assert_eq!(receiver.poll().hit, None);
        }
        assert_eq!(receiver.lives(), 2);
        assert!(!receiver.is_penalized());
    }

    #[test]
    fn test_motion_allowed_with_no_lives() {
        let clock = PenaltyClock::new();
        let laser = laser(&clock);
        let mut receiver = receiver(&clock, &laser);
        for _ in 0..3 {
            receiver.sensor.level = DARK;
            let _ = poll_with_ticker(&mut receiver, &clock);
            expire_penalty(&clock);
            receiver.sensor.level = BRIGHT;
            let _ = receiver.poll();
        }
        assert_eq!(receiver.lives(), 0);
        send(&mut receiver, Command::Right, 90);
        assert_eq!(receiver.poll().command, Some(Command::Right));
        assert_eq!(receiver.motors.duty, (90, 0));
    }

    #[test]
    fn test_laser_off_from_the_moment_of_the_hit() {
        let clock = PenaltyClock::new();
        let laser = laser(&clock);
        let mut receiver = receiver(&clock, &laser);

        // The rendezvous tick toggles the laser, so a hit can land on either phase.
        for _ in 0..2 {
            receiver.sensor.level = DARK;
            let outcome = poll_with_ticker(&mut receiver, &clock);
            assert!(outcome.hit.is_some());
            assert!(receiver.is_penalized());
            assert!(!shared_laser_on(&laser));

            receiver.sensor.level = BRIGHT;
            while clock.is_penalized() {
                assert!(receiver.poll().penalized);
                assert!(!shared_laser_on(&laser));
                if shared_blink_tick(&laser) == Some(TickEvent::Released) {
                    assert!(shared_laser_on(&laser));
                } else {
                    assert!(!shared_laser_on(&laser));
                }
            }
            let _ = shared_blink_tick(&laser);
            assert_eq!(receiver.poll().hit, None);
        }
        assert_eq!(receiver.lives(), 1);
    }
}
