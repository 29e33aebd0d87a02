//! Output level stage.

use stompbox_core::{Curve, Effect, EffectState, Parameter};

/// Linear gain with an audio-taper level knob.
///
/// ## Parameters
///
/// | Index | Name | Range | Default | Control |
/// |-------|------|-------|---------|---------|
/// | 0 | Level | 0–2 (log A) | 1.0 | knob 0 |
#[derive(Debug, Clone)]
pub struct Gain {
    state: EffectState,
    level: f32,
}

impl Default for Gain {
    fn default() -> Self {
        Self::new()
    }
}

impl Gain {
    /// Creates an uninitialized unity-gain stage.
    pub fn new() -> Self {
        Self {
            state: EffectState::new("Gain"),
            level: 1.0,
        }
    }

    /// Current linear gain.
    pub fn level(&self) -> f32 {
        self.level
    }
}

impl Effect for Gain {
    fn state(&self) -> &EffectState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EffectState {
        &mut self.state
    }

    fn init(&mut self, sample_rate: f32) {
        if self.state.begin_init(sample_rate) {
            self.state
                .add_param(Parameter::continuous("Level", 0.0, 2.0, 1.0, Curve::LogA).with_control(0));
        }
        self.update();
    }

    fn process_mono(&mut self, input: &[f32], output: &mut [f32]) {
        for (o, &x) in output.iter_mut().zip(input) {
            *o = x * self.level;
        }
    }

    fn update(&mut self) {
        if let Some(level) = self.state.value(0) {
            self.level = level;
        }
    }
}
