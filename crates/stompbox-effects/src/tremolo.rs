//! Sine tremolo whose rate follows tap tempo.

use core::f32::consts::TAU;
use libm::sinf;
use stompbox_core::{Curve, Effect, EffectState, Parameter, RATE_PARAM};

/// Amplitude modulation by a sine LFO.
///
/// The `Rate` parameter is in Hz, so the default [`Effect::set_tempo`]
/// locks one LFO cycle to one tapped beat.
///
/// ## Parameters
///
/// | Index | Name | Range | Default | Control |
/// |-------|------|-------|---------|---------|
/// | 0 | Depth | 0–1 | 0.5 | knob 0 |
/// | 1 | Rate | 0.1–10 Hz (log) | 4.0 | knob 1 |
///
/// # Example
///
/// ```rust
/// use stompbox_core::Effect;
/// use stompbox_effects::Tremolo;
///
/// let mut trem = Tremolo::new();
/// trem.init(48000.0);
/// trem.set_tempo(2.0);
/// assert_eq!(trem.rate_hz(), 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct Tremolo {
    state: EffectState,
    phase: f32,
    phase_inc: f32,
    depth: f32,
    rate_hz: f32,
}

impl Default for Tremolo {
    fn default() -> Self {
        Self::new()
    }
}

impl Tremolo {
    /// Creates an uninitialized tremolo.
    pub fn new() -> Self {
        Self {
            state: EffectState::new("Tremolo"),
            phase: 0.0,
            phase_inc: 0.0,
            depth: 0.5,
            rate_hz: 4.0,
        }
    }

    /// Current LFO rate in Hz.
    pub fn rate_hz(&self) -> f32 {
        self.rate_hz
    }

    #[inline]
    fn next_gain(&mut self) -> f32 {
        let lfo = 0.5 + 0.5 * sinf(TAU * self.phase);
        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        1.0 - self.depth * lfo
    }
}

impl Effect for Tremolo {
    fn state(&self) -> &EffectState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EffectState {
        &mut self.state
    }

    fn init(&mut self, sample_rate: f32) {
        if self.state.begin_init(sample_rate) {
            self.state
                .add_param(Parameter::continuous("Depth", 0.0, 1.0, 0.5, Curve::Linear).with_control(0));
            self.state
                .add_param(Parameter::continuous(RATE_PARAM, 0.1, 10.0, 4.0, Curve::Log).with_control(1));
        }
        self.phase = 0.0;
        self.update();
    }

    fn process_mono(&mut self, input: &[f32], output: &mut [f32]) {
        for (o, &x) in output.iter_mut().zip(input) {
            *o = x * self.next_gain();
        }
    }

    /// Both channels share one LFO so the image stays centered.
    fn process_stereo(
        &mut self,
        in_l: &[f32],
        in_r: &[f32],
        out_l: &mut [f32],
        out_r: &mut [f32],
    ) {
        for ((ol, or), (&l, &r)) in out_l.iter_mut().zip(out_r.iter_mut()).zip(in_l.iter().zip(in_r)) {
            let gain = self.next_gain();
            *ol = l * gain;
            *or = r * gain;
        }
    }

    fn update(&mut self) {
        if let Some(depth) = self.state.value(0) {
            self.depth = depth;
        }
        if let Some(rate) = self.state.value(1) {
            self.rate_hz = rate;
        }
        self.phase_inc = self.rate_hz / self.state.sample_rate();
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }
}
