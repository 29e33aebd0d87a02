//! Bounded, named effect parameters mapped to physical controls.
//!
//! A [`Parameter`] holds a plain `f32` value that always lies inside
//! `[min, max]`. Every write clamps; nothing errors. The control path mutates
//! parameters and the audio path reads them, so a parameter is just data: no
//! smoothing and no interior mutability.
//!
//! ## Variants
//!
//! | Variant | Driven by | Extra state |
//! |---------|-----------|-------------|
//! | [`ParamKind::Continuous`] | potentiometer | transfer [`Curve`] |
//! | [`ParamKind::Stepped`] | rotary encoder | step size |
//! | [`ParamKind::Toggle`] | momentary switch | on/off state (value 0 or 1) |
//!
//! ## Control indices
//!
//! The optional control index names a physical control *within its kind's
//! index space*: knob 2 and encoder 2 are different controls. Indices need
//! not be contiguous or start at zero for a given effect.
//!
//! # Example
//!
//! ```rust
//! use stompbox_core::{Curve, Parameter};
//!
//! let mut mix = Parameter::continuous("Mix", 0.0, 1.0, 0.5, Curve::Linear).with_control(0);
//! mix.set_value(1e9);
//! assert_eq!(mix.value(), 1.0);
//!
//! mix.set_normalized(0.25);
//! assert_eq!(mix.value(), 0.25);
//! ```

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use crate::curve::Curve;
use alloc::borrow::Cow;
use libm::roundf;

/// Physical control family a parameter listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    /// Potentiometer (analog, absolute position).
    Knob,
    /// Rotary encoder (relative steps).
    Encoder,
    /// Momentary switch (press toggles).
    Switch,
}

impl ControlKind {
    /// Lowercase display name.
    pub fn name(&self) -> &'static str {
        match self {
            ControlKind::Knob => "knob",
            ControlKind::Encoder => "encoder",
            ControlKind::Switch => "switch",
        }
    }
}

/// Variant-specific parameter behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    /// Absolute control with a transfer curve.
    Continuous {
        /// Curve applied by [`Parameter::set_normalized_with_curve`].
        curve: Curve,
    },
    /// Relative control moving in fixed steps.
    Stepped {
        /// Value change per encoder detent.
        step: f32,
    },
    /// On/off state mirrored into a 0/1 value.
    Toggle {
        /// Current state.
        on: bool,
    },
}

/// A named, bounded, control-mapped effect parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: Cow<'static, str>,
    min: f32,
    max: f32,
    value: f32,
    control: Option<usize>,
    kind: ParamKind,
}

impl Parameter {
    fn new(name: impl Into<Cow<'static, str>>, min: f32, max: f32, default: f32, kind: ParamKind) -> Self {
        debug_assert!(min <= max, "parameter min must not exceed max");
        Self {
            name: name.into(),
            min,
            max,
            value: default.clamp(min, max),
            control: None,
            kind,
        }
    }

    /// Creates a knob-driven parameter with a transfer curve.
    pub fn continuous(
        name: impl Into<Cow<'static, str>>,
        min: f32,
        max: f32,
        default: f32,
        curve: Curve,
    ) -> Self {
        Self::new(name, min, max, default, ParamKind::Continuous { curve })
    }

    /// Creates an encoder-driven parameter that moves by `step` per detent.
    pub fn stepped(
        name: impl Into<Cow<'static, str>>,
        min: f32,
        max: f32,
        default: f32,
        step: f32,
    ) -> Self {
        Self::new(name, min, max, default, ParamKind::Stepped { step })
    }

    /// Creates a switch-driven on/off parameter (value range 0–1).
    pub fn toggle(name: impl Into<Cow<'static, str>>, default: bool) -> Self {
        let value = if default { 1.0 } else { 0.0 };
        Self::new(name, 0.0, 1.0, value, ParamKind::Toggle { on: default })
    }

    /// Builder: maps the parameter to a control index.
    pub fn with_control(mut self, index: usize) -> Self {
        self.control = Some(index);
        self
    }

    /// Parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lower bound.
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound.
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Current value, always within `[min, max]`.
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Variant and its state.
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Control family this parameter listens to.
    pub fn control_kind(&self) -> ControlKind {
        match self.kind {
            ParamKind::Continuous { .. } => ControlKind::Knob,
            ParamKind::Stepped { .. } => ControlKind::Encoder,
            ParamKind::Toggle { .. } => ControlKind::Switch,
        }
    }

    /// Control index within [`control_kind`](Self::control_kind)'s index space.
    pub fn control_index(&self) -> Option<usize> {
        self.control
    }

    /// Remaps the parameter to another control index (or unmaps it).
    pub fn set_control_index(&mut self, index: Option<usize>) {
        self.control = index;
    }

    /// True if this parameter listens to control `index` of family `kind`.
    pub fn is_mapped_to(&self, kind: ControlKind, index: usize) -> bool {
        self.control == Some(index) && self.control_kind() == kind
    }

    /// Sets the value, clamped to `[min, max]`.
    ///
    /// On a toggle the state follows the value: anything at or above the
    /// midpoint switches it on. NaN leaves every variant unchanged.
    pub fn set_value(&mut self, value: f32) {
        if value.is_nan() {
            return;
        }
        if let ParamKind::Toggle { on } = &mut self.kind {
            *on = value >= 0.5;
            self.value = if *on { 1.0 } else { 0.0 };
            return;
        }
        self.value = value.clamp(self.min, self.max);
    }

    /// Position of the value inside its range, in [0, 1].
    ///
    /// A zero-width range reports 0.
    pub fn normalized(&self) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((self.value - self.min) / span).clamp(0.0, 1.0)
    }

    /// Sets the value linearly from a normalized position (clamped to [0, 1]).
    pub fn set_normalized(&mut self, normalized: f32) {
        if normalized.is_nan() {
            return;
        }
        let x = normalized.clamp(0.0, 1.0);
        self.set_value(self.min + x * (self.max - self.min));
    }

    /// Sets the value from a normalized position remapped through the curve.
    ///
    /// Non-continuous parameters have no curve and behave like
    /// [`set_normalized`](Self::set_normalized).
    pub fn set_normalized_with_curve(&mut self, normalized: f32) {
        if normalized.is_nan() {
            return;
        }
        let shaped = match self.kind {
            ParamKind::Continuous { curve } => curve.apply(normalized),
            _ => normalized.clamp(0.0, 1.0),
        };
        self.set_value(self.min + shaped * (self.max - self.min));
    }

    /// Quantizes the normalized value onto `0..=max_int`.
    ///
    /// Used to map a continuous knob onto a small discrete set, e.g. seven
    /// tempo subdivisions with `max_int = 6`.
    pub fn value_as_int(&self, max_int: u32) -> u32 {
        let scaled = roundf(self.normalized() * max_int as f32);
        (scaled.max(0.0) as u32).min(max_int)
    }

    /// Curve of a continuous parameter.
    pub fn curve(&self) -> Option<Curve> {
        match self.kind {
            ParamKind::Continuous { curve } => Some(curve),
            _ => None,
        }
    }

    /// Replaces the curve of a continuous parameter. No-op for other variants.
    pub fn set_curve(&mut self, curve: Curve) {
        if let ParamKind::Continuous { curve: c } = &mut self.kind {
            *c = curve;
        }
    }

    /// Step size of a stepped parameter.
    pub fn step(&self) -> Option<f32> {
        match self.kind {
            ParamKind::Stepped { step } => Some(step),
            _ => None,
        }
    }

    /// Replaces the step size of a stepped parameter. No-op for other variants.
    pub fn set_step(&mut self, step: f32) {
        if let ParamKind::Stepped { step: s } = &mut self.kind {
            *s = step;
        }
    }

    /// Moves a stepped parameter by `steps` detents (negative moves down).
    ///
    /// Clamped to the range. No-op for other variants.
    pub fn increment(&mut self, steps: i32) {
        if let ParamKind::Stepped { step } = self.kind {
            self.set_value(self.value + steps as f32 * step);
        }
    }

    /// Moves a stepped parameter down by `steps` detents.
    pub fn decrement(&mut self, steps: i32) {
        self.increment(-steps);
    }

    /// Flips a toggle. No-op for other variants.
    pub fn toggle_state(&mut self) {
        if let ParamKind::Toggle { on } = self.kind {
            self.set_on(!on);
        }
    }

    /// State of a toggle; other variants report whether the value is non-zero.
    pub fn is_on(&self) -> bool {
        match self.kind {
            ParamKind::Toggle { on } => on,
            _ => self.value != 0.0,
        }
    }

    /// Sets a toggle's state, mirroring it into the 0/1 value.
    pub fn set_on(&mut self, on: bool) {
        if let ParamKind::Toggle { on: state } = &mut self.kind {
            *state = on;
            self.value = if on { 1.0 } else { 0.0 };
        }
    }
}
