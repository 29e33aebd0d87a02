//! The [`Effect`] trait and the state every effect carries.
//!
//! An effect is a block processor with a lifecycle:
//!
//! 1. construct (cheap, no parameters yet)
//! 2. [`Effect::init`] with the sample rate: allocates processing state and
//!    registers parameters, the latter exactly once even if `init` is called
//!    again with a new rate
//! 3. any number of [`Effect::update`] calls, each re-deriving internal
//!    coefficients from the current parameter values
//!
//! The control path writes parameters and then calls `update`; the audio
//! path only calls the `process_*` methods. Neither direction allocates once
//! the effect is initialized.
//!
//! ## Design Decisions
//!
//! - **Object-safe**: chains hold `Box<dyn Effect>`, and compound effects
//!   nest them.
//! - **Shared state by composition**: name, enable flag, sample rate, tempo
//!   and the parameter list live in an [`EffectState`] that every
//!   implementation embeds, so the provided methods can be implemented once.
//! - **No implicit recompute**: writing a parameter never calls `update` on
//!   its own; the caller decides when coefficients are re-derived.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use crate::param::{ControlKind, Parameter};
use alloc::borrow::Cow;
use alloc::vec::Vec;

/// Sample rate effects assume until [`Effect::init`] says otherwise.
pub const DEFAULT_SAMPLE_RATE: f32 = 48_000.0;

/// Parameter name the default [`Effect::set_tempo`] writes the tempo into.
pub const RATE_PARAM: &str = "Rate";

/// Common state embedded in every effect.
#[derive(Debug, Clone)]
pub struct EffectState {
    name: Cow<'static, str>,
    enabled: bool,
    sample_rate: f32,
    tempo_hz: f32,
    params: Vec<Parameter>,
    initialized: bool,
}

impl EffectState {
    /// Fresh, enabled, uninitialized state at the default sample rate.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            sample_rate: DEFAULT_SAMPLE_RATE,
            tempo_hz: 0.0,
            params: Vec::new(),
            initialized: false,
        }
    }

    /// Records the sample rate and reports whether this is the first init.
    ///
    /// Implementations register their parameters only when this returns
    /// `true`, so re-initializing keeps the current values.
    pub fn begin_init(&mut self, sample_rate: f32) -> bool {
        self.sample_rate = sample_rate;
        let first = !self.initialized;
        self.initialized = true;
        first
    }

    /// Effect name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enable flag.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sample rate from the last init.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Last injected tempo in Hz.
    pub fn tempo_hz(&self) -> f32 {
        self.tempo_hz
    }

    /// Stores a tempo without touching parameters.
    pub fn set_tempo_hz(&mut self, tempo_hz: f32) {
        self.tempo_hz = tempo_hz;
    }

    /// Whether [`begin_init`](Self::begin_init) has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Appends a parameter and returns its position.
    pub fn add_param(&mut self, param: Parameter) -> usize {
        self.params.push(param);
        self.params.len() - 1
    }

    /// Value of the parameter at `index`, if registered.
    ///
    /// `update` implementations read through this so a short parameter list
    /// leaves the dependent coefficient untouched instead of panicking.
    #[inline]
    pub fn value(&self, index: usize) -> Option<f32> {
        self.params.get(index).map(Parameter::value)
    }

    /// Parameter at `index`, if registered.
    pub fn param(&self, index: usize) -> Option<&Parameter> {
        self.params.get(index)
    }

    /// Parameter at `index`, mutably.
    pub fn param_mut(&mut self, index: usize) -> Option<&mut Parameter> {
        self.params.get_mut(index)
    }

    /// Looks a parameter up by name.
    pub fn param_named_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.params.iter_mut().find(|p| p.name() == name)
    }
}

/// A block-processing audio effect with control-mapped parameters.
///
/// # Example
///
/// ```rust
/// use stompbox_core::{Curve, Effect, EffectState, Parameter};
///
/// struct Volume {
///     state: EffectState,
///     gain: f32,
/// }
///
/// impl Effect for Volume {
///     fn state(&self) -> &EffectState { &self.state }
///     fn state_mut(&mut self) -> &mut EffectState { &mut self.state }
///
///     fn init(&mut self, sample_rate: f32) {
///         if self.state.begin_init(sample_rate) {
///             self.state.add_param(
///                 Parameter::continuous("Level", 0.0, 1.0, 1.0, Curve::LogA).with_control(0),
///             );
///         }
///         self.update();
///     }
///
///     fn process_mono(&mut self, input: &[f32], output: &mut [f32]) {
///         for (o, i) in output.iter_mut().zip(input) {
///             *o = *i * self.gain;
///         }
///     }
///
///     fn update(&mut self) {
///         if let Some(level) = self.state.value(0) {
///             self.gain = level;
///         }
///     }
/// }
///
/// let mut v = Volume { state: EffectState::new("Volume"), gain: 1.0 };
/// v.init(48000.0);
/// v.params_mut()[0].set_value(0.5);
/// v.update();
/// let mut out = [0.0; 2];
/// v.process_mono(&[1.0, -1.0], &mut out);
/// assert_eq!(out, [0.5, -0.5]);
/// ```
pub trait Effect: Send {
    /// Shared state.
    fn state(&self) -> &EffectState;

    /// Shared state, mutably.
    fn state_mut(&mut self) -> &mut EffectState;

    /// Prepares processing state for `sample_rate` and registers parameters
    /// on the first call.
    fn init(&mut self, sample_rate: f32);

    /// Processes one channel. `input` and `output` have equal length.
    fn process_mono(&mut self, input: &[f32], output: &mut [f32]);

    /// Re-derives internal coefficients from the current parameter values.
    fn update(&mut self);

    /// Processes a stereo block.
    ///
    /// Default runs [`process_mono`](Self::process_mono) on each channel in
    /// turn; effects with per-channel state override it.
    fn process_stereo(
        &mut self,
        in_l: &[f32],
        in_r: &[f32],
        out_l: &mut [f32],
        out_r: &mut [f32],
    ) {
        self.process_mono(in_l, out_l);
        self.process_mono(in_r, out_r);
    }

    /// Injects a tempo in Hz (beats per second).
    ///
    /// Default stores it, writes it into the parameter named
    /// [`RATE_PARAM`] when there is one, and calls [`update`](Self::update).
    fn set_tempo(&mut self, tempo_hz: f32) {
        let state = self.state_mut();
        state.tempo_hz = tempo_hz;
        if let Some(rate) = state.param_named_mut(RATE_PARAM) {
            rate.set_value(tempo_hz);
        }
        self.update();
    }

    /// Clears delay lines and other signal history. Parameters are kept.
    fn reset(&mut self) {}

    /// Finds the parameter mapped to control `index` of family `kind`.
    fn find_param_mut(&mut self, kind: ControlKind, index: usize) -> Option<&mut Parameter> {
        self.state_mut()
            .params
            .iter_mut()
            .find(|p| p.is_mapped_to(kind, index))
    }

    /// Effect name.
    fn name(&self) -> &str {
        &self.state().name
    }

    /// Whether the effect processes audio (compound routers skip disabled
    /// children).
    fn is_enabled(&self) -> bool {
        self.state().enabled
    }

    /// Enables or disables the effect.
    fn set_enabled(&mut self, enabled: bool) {
        self.state_mut().enabled = enabled;
    }

    /// Sample rate from the last [`init`](Self::init).
    fn sample_rate(&self) -> f32 {
        self.state().sample_rate
    }

    /// Last tempo passed to [`set_tempo`](Self::set_tempo), 0 if none.
    fn tempo_hz(&self) -> f32 {
        self.state().tempo_hz
    }

    /// Registered parameters, in registration order.
    fn params(&self) -> &[Parameter] {
        &self.state().params
    }

    /// Registered parameters, mutably.
    fn params_mut(&mut self) -> &mut [Parameter] {
        &mut self.state_mut().params
    }

    /// Looks a parameter up by name.
    fn param_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.state_mut().param_named_mut(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::Curve;

    struct Lfo {
        state: EffectState,
        rate: f32,
        updates: usize,
    }

    impl Lfo {
        fn new() -> Self {
            Self {
                state: EffectState::new("Lfo"),
                rate: 0.0,
                updates: 0,
            }
        }
    }

    impl Effect for Lfo {
        fn state(&self) -> &EffectState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut EffectState {
            &mut self.state
        }

        fn init(&mut self, sample_rate: f32) {
            if self.state.begin_init(sample_rate) {
                self.state.add_param(
                    Parameter::continuous(RATE_PARAM, 0.1, 10.0, 1.0, Curve::Linear).with_control(1),
                );
                self.state
                    .add_param(Parameter::stepped("Depth", 0.0, 1.0, 0.5, 0.1).with_control(1));
            }
            self.update();
        }

        fn process_mono(&mut self, input: &[f32], output: &mut [f32]) {
            for (o, i) in output.iter_mut().zip(input) {
                *o = *i * 2.0;
            }
        }

        fn update(&mut self) {
            self.updates += 1;
            if let Some(rate) = self.state.value(0) {
                self.rate = rate;
            }
        }
    }

    #[test]
    fn defaults_before_init() {
        let lfo = Lfo::new();
        assert!(lfo.is_enabled());
        assert_eq!(lfo.sample_rate(), DEFAULT_SAMPLE_RATE);
        assert_eq!(lfo.tempo_hz(), 0.0);
        assert!(lfo.params().is_empty());
    }

    #[test]
    fn init_registers_params_once() {
        let mut lfo = Lfo::new();
        lfo.init(44100.0);
        lfo.params_mut()[0].set_value(3.0);
        lfo.init(96000.0);
        assert_eq!(lfo.params().len(), 2);
        assert_eq!(lfo.params()[0].value(), 3.0);
        assert_eq!(lfo.sample_rate(), 96000.0);
    }

    #[test]
    fn set_tempo_drives_rate_param() {
        let mut lfo = Lfo::new();
        lfo.init(48000.0);
        let before = lfo.updates;
        lfo.set_tempo(2.5);
        assert_eq!(lfo.tempo_hz(), 2.5);
        assert_eq!(lfo.rate, 2.5);
        assert_eq!(lfo.updates, before + 1);
    }

    #[test]
    fn update_tolerates_missing_params() {
        let mut lfo = Lfo::new();
        lfo.rate = 7.0;
        lfo.update();
        assert_eq!(lfo.rate, 7.0);
    }

    #[test]
    fn find_param_respects_control_kind() {
        let mut lfo = Lfo::new();
        lfo.init(48000.0);
        let knob = lfo.find_param_mut(ControlKind::Knob, 1).map(|p| p.name().to_owned());
        let enc = lfo.find_param_mut(ControlKind::Encoder, 1).map(|p| p.name().to_owned());
        assert_eq!(knob.as_deref(), Some("Rate"));
        assert_eq!(enc.as_deref(), Some("Depth"));
        assert!(lfo.find_param_mut(ControlKind::Switch, 1).is_none());
    }

    #[test]
    fn default_stereo_runs_mono_per_channel() {
        let mut lfo = Lfo::new();
        let (mut l, mut r) = ([0.0; 2], [0.0; 2]);
        lfo.process_stereo(&[1.0, 2.0], &[3.0, 4.0], &mut l, &mut r);
        assert_eq!(l, [2.0, 4.0]);
        assert_eq!(r, [6.0, 8.0]);
    }
}
