//! Feedback delay with free-running or tempo-synced time.

use libm::ceilf;
use stompbox_core::{
    Curve, DelayLine, Effect, EffectState, Parameter, Subdivision, bpm_from_normalized,
    bpm_from_tempo_hz, delay_seconds, flush_denormal, wet_dry_mix,
};

/// Longest delay the lines are sized for.
pub const MAX_DELAY_SECONDS: f32 = 2.0;

const MIX: usize = 0;
const TIME: usize = 1;
const FEEDBACK: usize = 2;
const DIVISION: usize = 3;
const TEMPO_SYNC: usize = 4;

/// Feedback delay.
///
/// In free mode the delay time is the `Time` encoder value in seconds. In
/// tempo-sync mode the time is one [`Subdivision`] of the tempo: the tapped
/// tempo when there is one, otherwise the `Time` position mapped linearly
/// onto 60–240 BPM.
///
/// ## Parameters
///
/// | Index | Name | Range | Default | Control |
/// |-------|------|-------|---------|---------|
/// | 0 | Mix | 0–1 | 0.5 | knob 0 |
/// | 1 | Time | 0.001–2.0 s, step 0.01 | 0.5 | encoder 0 |
/// | 2 | Feedback | 0–0.95 | 0.5 | knob 2 |
/// | 3 | Division | 0–1 (7 buckets) | 0.5 (quarter) | knob 1 |
/// | 4 | Tempo Sync | off/on | off | switch 3 |
///
/// # Example
///
/// ```rust
/// use stompbox_core::Effect;
/// use stompbox_effects::Delay;
///
/// let mut delay = Delay::new();
/// delay.init(48000.0);
/// assert_eq!(delay.delay_seconds(), 0.5);
///
/// // a tapped tempo of 2 Hz (120 BPM) engages sync at a quarter note
/// delay.set_tempo(2.0);
/// assert!(delay.is_synced());
/// assert_eq!(delay.delay_seconds(), 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Delay {
    state: EffectState,
    line_l: Option<DelayLine>,
    line_r: Option<DelayLine>,
    delay_seconds: f32,
    delay_samples: f32,
    feedback: f32,
    mix: f32,
}

impl Default for Delay {
    fn default() -> Self {
        Self::new()
    }
}

impl Delay {
    /// Creates an uninitialized delay.
    pub fn new() -> Self {
        Self {
            state: EffectState::new("Delay"),
            line_l: None,
            line_r: None,
            delay_seconds: 0.5,
            delay_samples: 0.0,
            feedback: 0.5,
            mix: 0.5,
        }
    }

    /// Current delay time in seconds.
    pub fn delay_seconds(&self) -> f32 {
        self.delay_seconds
    }

    /// Whether the delay follows the tempo.
    pub fn is_synced(&self) -> bool {
        self.state.param(TEMPO_SYNC).is_some_and(Parameter::is_on)
    }

    /// Subdivision selected by the division knob.
    pub fn subdivision(&self) -> Subdivision {
        self.state
            .param(DIVISION)
            .map(Subdivision::from_param)
            .unwrap_or_default()
    }

    fn synced_seconds(&self) -> Option<f32> {
        let bpm = if self.state.tempo_hz() > 0.0 {
            bpm_from_tempo_hz(self.state.tempo_hz())
        } else {
            bpm_from_normalized(self.state.param(TIME)?.normalized())
        };
        Some(delay_seconds(bpm, self.subdivision()))
    }

    #[inline]
    fn tick(line: &mut DelayLine, x: f32, delay: f32, feedback: f32, mix: f32) -> f32 {
        let delayed = line.read(delay);
        line.write(flush_denormal(x + delayed * feedback));
        wet_dry_mix(x, delayed, mix)
    }
}

impl Effect for Delay {
    fn state(&self) -> &EffectState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EffectState {
        &mut self.state
    }

    fn init(&mut self, sample_rate: f32) {
        if self.state.begin_init(sample_rate) {
            self.state
                .add_param(Parameter::continuous("Mix", 0.0, 1.0, 0.5, Curve::Linear).with_control(0));
            self.state
                .add_param(Parameter::stepped("Time", 0.001, MAX_DELAY_SECONDS, 0.5, 0.01).with_control(0));
            self.state.add_param(
                Parameter::continuous("Feedback", 0.0, 0.95, 0.5, Curve::Linear).with_control(2),
            );
            self.state.add_param(
                Parameter::continuous("Division", 0.0, 1.0, 0.5, Curve::Linear).with_control(1),
            );
            self.state
                .add_param(Parameter::toggle("Tempo Sync", false).with_control(3));
        }
        let samples = ceilf(MAX_DELAY_SECONDS * sample_rate) as usize + 1;
        self.line_l = Some(DelayLine::new(samples));
        self.line_r = Some(DelayLine::new(samples));
        self.update();
    }

    fn process_mono(&mut self, input: &[f32], output: &mut [f32]) {
        let Some(line) = self.line_l.as_mut() else {
            output.copy_from_slice(input);
            return;
        };
        for (o, &x) in output.iter_mut().zip(input) {
            *o = Self::tick(line, x, self.delay_samples, self.feedback, self.mix);
        }
    }

    fn process_stereo(
        &mut self,
        in_l: &[f32],
        in_r: &[f32],
        out_l: &mut [f32],
        out_r: &mut [f32],
    ) {
        let (Some(line_l), Some(line_r)) = (self.line_l.as_mut(), self.line_r.as_mut()) else {
            out_l.copy_from_slice(in_l);
            out_r.copy_from_slice(in_r);
            return;
        };
        for (o, &x) in out_l.iter_mut().zip(in_l) {
            *o = Self::tick(line_l, x, self.delay_samples, self.feedback, self.mix);
        }
        for (o, &x) in out_r.iter_mut().zip(in_r) {
            *o = Self::tick(line_r, x, self.delay_samples, self.feedback, self.mix);
        }
    }

    fn update(&mut self) {
        if let Some(mix) = self.state.value(MIX) {
            self.mix = mix;
        }
        if let Some(feedback) = self.state.value(FEEDBACK) {
            self.feedback = feedback;
        }
        let seconds = if self.is_synced() {
            self.synced_seconds()
        } else {
            self.state.value(TIME)
        };
        if let Some(seconds) = seconds {
            self.delay_seconds = seconds.min(MAX_DELAY_SECONDS);
        }
        let capacity = self.line_l.as_ref().map_or(1, DelayLine::capacity);
        self.delay_samples = (self.delay_seconds * self.state.sample_rate()).clamp(0.0, (capacity - 1) as f32);
    }

    /// Stores the tempo and engages tempo sync.
    fn set_tempo(&mut self, tempo_hz: f32) {
        self.state.set_tempo_hz(tempo_hz);
        if let Some(sync) = self.state.param_mut(TEMPO_SYNC) {
            sync.set_on(true);
        }
        self.update();
    }

    fn reset(&mut self) {
        for line in [self.line_l.as_mut(), self.line_r.as_mut()].into_iter().flatten() {
            line.clear();
        }
    }
}
