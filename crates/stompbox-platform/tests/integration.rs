//! End-to-end tests: scripted hardware → scheduler → queue → pedal → audio.

use stompbox_core::{Effect, Subdivision};
use stompbox_effects::{Delay, Gain, Tremolo};
use stompbox_platform::{
    ControlHardware, ControlId, ControlLayout, ControlScheduler, EventKind, Pedal, PedalConfig,
    ProcessingFlag, SchedulerConfig, event_queue,
};

/// In-memory control surface with a manual clock.
#[derive(Default)]
struct MockHardware {
    adc: [u16; 8],
    gpio: [bool; 16],
    now_us: u64,
}

impl MockHardware {
    /// Encoder quadrature lines rest high and the pull-up switches read
    /// high while open.
    fn idle() -> Self {
        let mut hw = Self::default();
        for pin in 0..10 {
            hw.gpio[pin] = true;
        }
        hw
    }
}

impl ControlHardware for MockHardware {
    fn read_adc(&mut self, channel: usize) -> u16 {
        self.adc.get(channel).copied().unwrap_or(0)
    }

    fn read_gpio(&mut self, pin: usize) -> bool {
        self.gpio.get(pin).copied().unwrap_or(false)
    }

    fn now_us(&self) -> u64 {
        self.now_us
    }
}

struct Rig {
    scheduler: ControlScheduler<MockHardware>,
    pedal: Pedal,
}

impl Rig {
    fn new(effects: Vec<Box<dyn Effect>>) -> Self {
        let config = SchedulerConfig::default();
        let (tx, rx) = event_queue(config.queue_capacity);
        let flag = ProcessingFlag::new();
        let scheduler = ControlScheduler::new(
            MockHardware::idle(),
            ControlLayout::default(),
            config,
            tx,
            flag.clone(),
        );
        let pedal = Pedal::new(effects, PedalConfig::default(), rx, flag);
        Self { scheduler, pedal }
    }

    /// Runs the control timer for `ms` milliseconds at 2 kHz, polling the
    /// pedal once per millisecond.
    fn run_ms(&mut self, ms: u64) {
        for _ in 0..ms {
            for _ in 0..2 {
                self.scheduler.hardware_mut().now_us += 500;
                self.scheduler.tick();
            }
            self.pedal.poll();
        }
    }

    fn hw(&mut self) -> &mut MockHardware {
        self.scheduler.hardware_mut()
    }

    /// Presses and releases the switch on `pin`, holding it for `ms`.
    /// Closing a pull-up switch pulls the pin low.
    fn click(&mut self, pin: usize, ms: u64) {
        self.hw().gpio[pin] = false;
        self.run_ms(ms);
        self.hw().gpio[pin] = true;
        self.run_ms(100);
    }
}

#[test]
fn test_bypass_footswitch_engages_effect() {
    let mut rig = Rig::new(vec![Box::new(Gain::new())]);
    assert!(rig.pedal.state().is_bypassed());

    rig.click(1, 100);
    assert!(!rig.pedal.state().is_bypassed());

    rig.click(1, 100);
    assert!(rig.pedal.state().is_bypassed());
}

#[test]
fn test_idle_pull_up_switches_stay_quiet() {
    let mut rig = Rig::new(vec![Box::new(Delay::new())]);
    rig.run_ms(3000);
    assert!(rig.pedal.state().is_bypassed());
    assert_eq!(rig.pedal.state().tempo_hz(), None);
    assert!(!rig.pedal.state().active_effect().unwrap().params()[4].is_on());
}

#[test]
fn test_knob_reaches_parameter() {
    let mut rig = Rig::new(vec![Box::new(Tremolo::new())]);
    rig.hw().adc[0] = u16::MAX;
    rig.run_ms(200);
    let depth = rig.pedal.state().active_effect().unwrap().params()[0].value();
    assert!((depth - 1.0).abs() < 1e-6);
}

#[test]
fn test_tap_tempo_syncs_delay() {
    let mut rig = Rig::new(vec![Box::new(Delay::new())]);
    // two taps 500 ms apart on the tap switch
    rig.click(2, 100);
    rig.run_ms(300);
    rig.click(2, 100);

    // switches are sampled every 8 ms, so the interval lands within one sample of 500 ms
    let tempo = rig.pedal.state().tempo_hz().unwrap();
    assert!((tempo - 2.0).abs() < 0.05, "tempo {tempo}");

    let delay = rig.pedal.state().active_effect().unwrap();
    assert_eq!(delay.tempo_hz(), tempo);
    let sync = delay.params().iter().find(|p| p.name() == "Tempo Sync").unwrap();
    assert!(sync.is_on());
    assert_eq!(Subdivision::from_param(&delay.params()[3]), Subdivision::Quarter);
}

#[test]
fn test_slow_taps_leave_tempo_unset() {
    let mut rig = Rig::new(vec![Box::new(Delay::new())]);
    rig.click(2, 100);
    rig.run_ms(2900);
    rig.click(2, 100);
    assert_eq!(rig.pedal.state().tempo_hz(), None);
    assert!(rig.pedal.state().tap().last_tap_ms().is_some());
}

#[test]
fn test_select_encoder_changes_active_effect() {
    let mut rig = Rig::new(vec![Box::new(Gain::new()), Box::new(Tremolo::new())]);
    // one clockwise detent on encoder 1 (pins 7/8), each phase held 5 ms
    for (a, b) in [(true, false), (false, false), (false, true), (true, true)] {
        rig.hw().gpio[7] = a;
        rig.hw().gpio[8] = b;
        rig.run_ms(5);
    }
    assert_eq!(rig.pedal.state().active_index(), 1);
    assert_eq!(rig.pedal.state().active_effect().unwrap().name(), "Tremolo");
}

#[test]
fn test_encoder_steps_delay_time() {
    let mut rig = Rig::new(vec![Box::new(Delay::new())]);
    let before = rig.pedal.state().active_effect().unwrap().params()[1].value();
    for _ in 0..3 {
        for (a, b) in [(true, false), (false, false), (false, true), (true, true)] {
            rig.hw().gpio[4] = a;
            rig.hw().gpio[5] = b;
            rig.run_ms(5);
        }
    }
    let after = rig.pedal.state().active_effect().unwrap().params()[1].value();
    assert!((after - before - 0.03).abs() < 1e-4, "{before} -> {after}");
}

#[test]
fn test_toggle_switch_flips_tempo_sync() {
    let mut rig = Rig::new(vec![Box::new(Delay::new())]);
    rig.click(3, 100);
    let delay = rig.pedal.state().active_effect().unwrap();
    assert!(delay.params()[4].is_on());
}

#[test]
fn test_hold_event_reaches_custom_listener() {
    let mut rig = Rig::new(vec![Box::new(Gain::new())]);
    rig.pedal.dispatcher_mut().register(
        EventKind::ButtonHeld,
        Some(ControlId::switch(0)),
        |_, state| state.set_bypass(false),
    );
    rig.click(0, 2100);
    assert!(!rig.pedal.state().is_bypassed());
}

#[test]
fn test_audio_follows_bypass() {
    let mut rig = Rig::new(vec![Box::new(Gain::new())]);
    let input = [0.5f32; 128];
    let (mut l, mut r) = ([0.0f32; 128], [0.0f32; 128]);

    rig.pedal.process_audio(&input, &input, &mut l, &mut r);
    assert_eq!(l, input);

    rig.click(1, 100);
    rig.pedal.state_mut().effect_mut(0).unwrap().params_mut()[0].set_value(0.0);
    rig.pedal.state_mut().effect_mut(0).unwrap().update();
    rig.pedal.process_audio(&input, &input, &mut l, &mut r);
    assert!(l.iter().chain(r.iter()).all(|&s| s == 0.0));
}

#[test]
fn test_queue_overflow_is_counted() {
    let (tx, rx) = event_queue(2);
    let mut hw = MockHardware::idle();
    hw.adc = [u16::MAX; 8];
    let config = SchedulerConfig {
        knob_divisor: 1,
        ..SchedulerConfig::default()
    };
    let mut scheduler =
        ControlScheduler::new(hw, ControlLayout::default(), config, tx, ProcessingFlag::new());
    let mut pedal = Pedal::new(vec![Box::new(Gain::new())], PedalConfig::default(), rx, ProcessingFlag::new());

    scheduler.tick();
    assert_eq!(pedal.pending_events(), 2);
    assert_eq!(pedal.dropped_events(), 4);
    assert_eq!(pedal.poll(), 2);
}
