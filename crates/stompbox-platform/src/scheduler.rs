//! Fixed-rate control sampling.
//!
//! [`ControlScheduler::tick`] is what the control timer interrupt calls. Each
//! sampler family runs at its own sub-multiple of the base rate through an
//! explicit [`Divider`]: encoders most often, then switches, then knobs.
//! Changes become [`ControlEvent`]s pushed into the event queue; the
//! scheduler never touches effect parameters itself.

use crate::encoder::Encoder;
use crate::event::ControlEvent;
use crate::knob::{DEFAULT_SLEW_SECONDS, Knob};
use crate::queue::{DEFAULT_QUEUE_CAPACITY, EventProducer};
use crate::switch::{DEFAULT_HOLD_THRESHOLD_MS, Polarity, Switch};
use crate::{ControlHardware, ControlId};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Control timing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    /// Rate of the control timer interrupt in Hz.
    pub base_rate_hz: f32,
    /// Encoders are sampled every `encoder_divisor` ticks.
    pub encoder_divisor: u32,
    /// Switches are sampled every `switch_divisor` ticks.
    pub switch_divisor: u32,
    /// Knobs are sampled every `knob_divisor` ticks.
    pub knob_divisor: u32,
    /// Press duration that produces a hold event.
    pub hold_threshold_ms: u32,
    /// Knob smoothing time constant in seconds.
    pub knob_slew_seconds: f32,
    /// Minimum normalized knob travel that counts as a change.
    pub knob_deadband: f32,
    /// Event queue capacity.
    pub queue_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            base_rate_hz: 2000.0,
            encoder_divisor: 4,
            switch_divisor: 16,
            knob_divisor: 200,
            hold_threshold_ms: DEFAULT_HOLD_THRESHOLD_MS,
            knob_slew_seconds: DEFAULT_SLEW_SECONDS,
            knob_deadband: 0.001,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl SchedulerConfig {
    /// Effective knob sampling rate.
    pub fn knob_rate_hz(&self) -> f32 {
        self.base_rate_hz / self.knob_divisor.max(1) as f32
    }

    /// Effective switch sampling rate.
    pub fn switch_rate_hz(&self) -> f32 {
        self.base_rate_hz / self.switch_divisor.max(1) as f32
    }

    /// Effective encoder sampling rate.
    pub fn encoder_rate_hz(&self) -> f32 {
        self.base_rate_hz / self.encoder_divisor.max(1) as f32
    }
}

/// Integer rate divider: fires once every `divisor` ticks.
///
/// # Example
///
/// ```rust
/// use stompbox_platform::Divider;
///
/// let mut d = Divider::new(3);
/// let fired: Vec<bool> = (0..6).map(|_| d.tick()).collect();
/// assert_eq!(fired, [false, false, true, false, false, true]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Divider {
    count: u32,
    divisor: u32,
}

impl Divider {
    /// A divisor of 0 behaves as 1.
    pub fn new(divisor: u32) -> Self {
        Self {
            count: 0,
            divisor: divisor.max(1),
        }
    }

    /// Advances one tick; true when the divided clock fires.
    #[inline]
    pub fn tick(&mut self) -> bool {
        self.count += 1;
        if self.count >= self.divisor {
            self.count = 0;
            true
        } else {
            false
        }
    }

    /// Divisor.
    pub fn divisor(&self) -> u32 {
        self.divisor
    }

    /// Restarts the count.
    pub fn reset(&mut self) {
        self.count = 0;
    }
}

/// Re-entrancy guard shared by the event consumer and the control tick.
///
/// The main loop raises it while it drains and dispatches; a control tick
/// that observes it raised is skipped instead of sampling into a queue that
/// is being processed.
#[derive(Debug, Clone, Default)]
pub struct ProcessingFlag(Arc<AtomicBool>);

impl ProcessingFlag {
    /// Creates a lowered flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag; returns whether it was already raised.
    pub fn raise(&self) -> bool {
        self.0.swap(true, Ordering::AcqRel)
    }

    /// Lowers the flag.
    pub fn lower(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Whether the flag is raised.
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// GPIO pins of one encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderPins {
    /// Channel A.
    pub a: usize,
    /// Channel B.
    pub b: usize,
    /// Push switch.
    pub button: usize,
}

/// Which ADC channels and GPIO pins the controls are wired to.
///
/// Positions in each list are the control indices used by events and by
/// parameter mappings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlLayout {
    /// ADC channel of each knob.
    pub knob_channels: Vec<usize>,
    /// GPIO pin of each footswitch.
    pub switch_pins: Vec<usize>,
    /// Pins of each encoder.
    pub encoders: Vec<EncoderPins>,
    /// Wiring polarity of switches and encoder buttons.
    pub polarity: Polarity,
}

/// Six knobs, four footswitches and two push encoders, switches wired
/// with pull-ups.
impl Default for ControlLayout {
    fn default() -> Self {
        Self {
            knob_channels: (0..6).collect(),
            switch_pins: (0..4).collect(),
            encoders: vec![
                EncoderPins { a: 4, b: 5, button: 6 },
                EncoderPins { a: 7, b: 8, button: 9 },
            ],
            polarity: Polarity::Inverted,
        }
    }
}

/// Samples every control at its divided rate and queues the changes.
pub struct ControlScheduler<H> {
    hardware: H,
    config: SchedulerConfig,
    layout: ControlLayout,
    knobs: Vec<Knob>,
    switches: Vec<Switch>,
    encoders: Vec<Encoder>,
    knob_divider: Divider,
    switch_divider: Divider,
    encoder_divider: Divider,
    queue: EventProducer,
    flag: ProcessingFlag,
    skipped: u64,
    skip_run: u64,
}

impl<H: ControlHardware> ControlScheduler<H> {
    /// Creates a scheduler for `layout`, pushing into `queue` and honoring
    /// `flag`.
    pub fn new(
        hardware: H,
        layout: ControlLayout,
        config: SchedulerConfig,
        queue: EventProducer,
        flag: ProcessingFlag,
    ) -> Self {
        let knob_rate = config.knob_rate_hz();
        let knobs = layout
            .knob_channels
            .iter()
            .map(|_| Knob::new(knob_rate).with_slew(config.knob_slew_seconds))
            .collect();
        let switches = layout
            .switch_pins
            .iter()
            .map(|_| Switch::new(layout.polarity).with_hold_threshold(config.hold_threshold_ms))
            .collect();
        let encoders = layout
            .encoders
            .iter()
            .map(|_| Encoder::new(layout.polarity).with_hold_threshold(config.hold_threshold_ms))
            .collect();

        tracing::debug!(
            knobs = layout.knob_channels.len(),
            switches = layout.switch_pins.len(),
            encoders = layout.encoders.len(),
            base_rate_hz = config.base_rate_hz,
            "control scheduler created"
        );

        Self {
            hardware,
            knob_divider: Divider::new(config.knob_divisor),
            switch_divider: Divider::new(config.switch_divisor),
            encoder_divider: Divider::new(config.encoder_divisor),
            config,
            layout,
            knobs,
            switches,
            encoders,
            queue,
            flag,
            skipped: 0,
            skip_run: 0,
        }
    }

    /// One control-timer tick. Returns false when the tick was skipped
    /// because events are being processed.
    pub fn tick(&mut self) -> bool {
        if self.flag.is_raised() {
            self.skipped += 1;
            self.skip_run += 1;
            // warn once per run of skips
            if self.skip_run == 1 {
                tracing::warn!(skipped = self.skipped, "control tick skipped during event processing");
            } else {
                tracing::trace!(run = self.skip_run, "control tick skipped");
            }
            return false;
        }
        if self.skip_run > 0 {
            tracing::debug!(run = self.skip_run, "control ticks resumed");
            self.skip_run = 0;
        }

        let now_ms = self.hardware.now_ms();
        if self.encoder_divider.tick() {
            self.sample_encoders(now_ms);
        }
        if self.switch_divider.tick() {
            self.sample_switches(now_ms);
        }
        if self.knob_divider.tick() {
            self.sample_knobs(now_ms);
        }
        true
    }

    fn sample_knobs(&mut self, now_ms: u32) {
        for (i, (knob, &channel)) in self
            .knobs
            .iter_mut()
            .zip(&self.layout.knob_channels)
            .enumerate()
        {
            knob.process(self.hardware.read_adc(channel));
            if (knob.raw_normalized() - knob.smoothed()).abs() <= self.config.knob_deadband {
                continue;
            }
            let previous = knob.value();
            knob.filter();
            let event =
                ControlEvent::knob_changed(ControlId::knob(i as u8), i, knob.value(), previous, now_ms);
            push(&mut self.queue, event);
        }
    }

    fn sample_switches(&mut self, now_ms: u32) {
        for (i, (sw, &pin)) in self
            .switches
            .iter_mut()
            .zip(&self.layout.switch_pins)
            .enumerate()
        {
            sw.debounce(self.hardware.read_gpio(pin), now_ms);
            let id = ControlId::switch(i as u8);
            if sw.rising_edge() {
                push(&mut self.queue, ControlEvent::button_pressed(id, i, now_ms));
            } else if sw.falling_edge() {
                push(&mut self.queue, ControlEvent::button_released(id, i, now_ms));
            } else if sw.held() {
                let held = sw.time_held_ms();
                push(&mut self.queue, ControlEvent::button_held(id, i, held, now_ms));
            }
        }
    }

    fn sample_encoders(&mut self, now_ms: u32) {
        let switch_count = self.switches.len();
        for (i, (enc, pins)) in self
            .encoders
            .iter_mut()
            .zip(&self.layout.encoders)
            .enumerate()
        {
            let a = self.hardware.read_gpio(pins.a);
            let b = self.hardware.read_gpio(pins.b);
            let button = self.hardware.read_gpio(pins.button);
            enc.debounce(a, b, button, now_ms);

            let steps = enc.increment();
            if steps != 0 {
                let event = ControlEvent::encoder_rotated(ControlId::encoder(i as u8), i, steps, now_ms);
                push(&mut self.queue, event);
            }

            let id = ControlId::encoder_button(i as u8);
            let index = switch_count + i;
            if enc.rising_edge() {
                push(&mut self.queue, ControlEvent::button_pressed(id, index, now_ms));
            } else if enc.falling_edge() {
                push(&mut self.queue, ControlEvent::button_released(id, index, now_ms));
            } else if enc.held() {
                let held = enc.time_held_ms();
                push(&mut self.queue, ControlEvent::button_held(id, index, held, now_ms));
            }
        }
    }

    /// Changes the base timer rate; knob smoothing follows the new knob rate.
    pub fn set_base_rate(&mut self, base_rate_hz: f32) {
        self.config.base_rate_hz = base_rate_hz;
        let knob_rate = self.config.knob_rate_hz();
        for knob in &mut self.knobs {
            knob.set_update_rate(knob_rate);
        }
    }

    /// Knob at `index`.
    pub fn knob(&self, index: usize) -> Option<&Knob> {
        self.knobs.get(index)
    }

    /// Mutable knob at `index`, for per-knob transforms.
    pub fn knob_mut(&mut self, index: usize) -> Option<&mut Knob> {
        self.knobs.get_mut(index)
    }

    /// Switch at `index`.
    pub fn switch(&self, index: usize) -> Option<&Switch> {
        self.switches.get(index)
    }

    /// Encoder at `index`.
    pub fn encoder(&self, index: usize) -> Option<&Encoder> {
        self.encoders.get(index)
    }

    /// Timing in effect.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Control wiring.
    pub fn layout(&self) -> &ControlLayout {
        &self.layout
    }

    /// Ticks skipped because the processing flag was raised.
    pub fn skipped_ticks(&self) -> u64 {
        self.skipped
    }

    /// Ticks skipped in a row since the last sampled tick.
    pub fn consecutive_skips(&self) -> u64 {
        self.skip_run
    }

    /// The hardware collaborator.
    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    /// Mutable hardware collaborator.
    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }
}

fn push(queue: &mut EventProducer, event: ControlEvent) {
    if let Err(err) = queue.push(event) {
        tracing::warn!(%err, "control event dropped");
    }
}

impl<H> std::fmt::Debug for ControlScheduler<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlScheduler")
            .field("config", &self.config)
            .field("layout", &self.layout)
            .field("skipped", &self.skipped)
            .field("skip_run", &self.skip_run)
            .finish_non_exhaustive()
    }
}
