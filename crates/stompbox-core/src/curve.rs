//! Transfer curves for potentiometer-style parameters.
//!
//! A curve remaps a normalized control position `x ∈ [0, 1]` onto another
//! value in `[0, 1]` before the parameter scales it into its own range. Every
//! curve preserves the endpoints (`f(0) = 0`, `f(1) = 1`) and is monotonically
//! non-decreasing, so a knob at either end of its travel always reaches the
//! parameter's minimum or maximum.
//!
//! # Log tapers
//!
//! The logarithmic family uses the audio-taper approximation
//!
//! ```text
//! f(x) = a · b^x − a,   b = (1/ym − 1)²,   a = 1 / (b − 1)
//! ```
//!
//! where `ym` is the curve's output at the midpoint of travel. `ym = 0.5`
//! collapses `b` to 1 and divides by zero, so a [`Taper`] can only be built
//! through [`Taper::new`], which rejects it.
//!
//! # Example
//!
//! ```rust
//! use stompbox_core::{Curve, Taper};
//!
//! assert_eq!(Curve::Linear.apply(0.25), 0.25);
//! assert!(Curve::Log.apply(0.5) < 0.5);
//!
//! let custom = Taper::new(0.2).unwrap();
//! assert!((Curve::Taper(custom).apply(0.5) - 0.2).abs() < 1e-5);
//! assert!(Taper::new(0.5).is_err());
//! ```

use libm::powf;
use thiserror::Error;

/// Invalid taper configuration.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CurveError {
    /// The midpoint value 0.5 makes the taper degenerate (division by zero).
    #[error("taper midpoint 0.5 is degenerate; use Curve::Linear instead")]
    LinearMidpoint,
    /// The midpoint must lie strictly between 0 and 1.
    #[error("taper midpoint {0} is outside (0, 1)")]
    OutOfRange(f32),
}

/// A validated log-taper shape.
///
/// Stores the precomputed `a` and `b` constants of the taper formula so the
/// control path only pays for one `powf` per evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Taper {
    ym: f32,
    a: f32,
    b: f32,
}

impl Taper {
    /// Builds a taper whose output at `x = 0.5` equals `ym`.
    ///
    /// Rejects `ym = 0.5` and anything outside the open interval (0, 1).
    pub fn new(ym: f32) -> Result<Self, CurveError> {
        if !(ym > 0.0 && ym < 1.0) {
            return Err(CurveError::OutOfRange(ym));
        }
        if (ym - 0.5).abs() < 1e-4 {
            return Err(CurveError::LinearMidpoint);
        }
        let c = 1.0 / ym - 1.0;
        let b = c * c;
        let a = 1.0 / (b - 1.0);
        Ok(Self { ym, a, b })
    }

    /// Returns the midpoint value this taper was built with.
    pub fn midpoint(&self) -> f32 {
        self.ym
    }

    /// Evaluates the taper at `x` (expected in [0, 1]).
    #[inline]
    pub fn apply(&self, x: f32) -> f32 {
        self.a * powf(self.b, x) - self.a
    }
}

/// Midpoint of the [`Curve::Log`] taper.
pub const LOG_MIDPOINT: f32 = 0.12;
/// Midpoint of the [`Curve::ReverseLog`] taper.
pub const REVERSE_LOG_MIDPOINT: f32 = 0.88;
/// Midpoint of the [`Curve::LogA`] taper.
pub const LOG_A_MIDPOINT: f32 = 0.25;

/// Named transfer curve applied before linear scaling.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Curve {
    /// Identity.
    #[default]
    Linear,
    /// Steep audio taper (midpoint 0.12).
    Log,
    /// Mirror of the audio taper (midpoint 0.88).
    ReverseLog,
    /// Gentle audio taper (midpoint 0.25).
    LogA,
    /// Dual-curve S shape for blend and crossfade controls.
    WTaper,
    /// `x²`
    Squared,
    /// `x³`
    Cubed,
    /// Log taper with a caller-chosen midpoint.
    Taper(Taper),
}

impl Curve {
    /// Remaps `x` through the curve. Input is clamped to [0, 1].
    pub fn apply(&self, x: f32) -> f32 {
        let x = x.clamp(0.0, 1.0);
        let y = match self {
            Curve::Linear => x,
            Curve::Log => log_taper(LOG_MIDPOINT, x),
            Curve::ReverseLog => log_taper(REVERSE_LOG_MIDPOINT, x),
            Curve::LogA => log_taper(LOG_A_MIDPOINT, x),
            Curve::WTaper => {
                if x < 0.5 {
                    2.0 * x * x
                } else {
                    let inv = 1.0 - x;
                    1.0 - 2.0 * inv * inv
                }
            }
            Curve::Squared => x * x,
            Curve::Cubed => x * x * x,
            Curve::Taper(taper) => taper.apply(x),
        };
        // powf rounding can land a hair outside the unit interval at x = 1.
        y.clamp(0.0, 1.0)
    }

    /// Short lowercase name, used by configuration files and listings.
    pub fn name(&self) -> &'static str {
        match self {
            Curve::Linear => "linear",
            Curve::Log => "log",
            Curve::ReverseLog => "reverse_log",
            Curve::LogA => "log_a",
            Curve::WTaper => "w_taper",
            Curve::Squared => "squared",
            Curve::Cubed => "cubed",
            Curve::Taper(_) => "taper",
        }
    }

    /// Looks up a named curve. Custom tapers are built with [`Taper::new`].
    pub fn from_name(name: &str) -> Option<Self> {
        let curve = match name {
            "linear" | "lin" => Curve::Linear,
            "log" => Curve::Log,
            "reverse_log" => Curve::ReverseLog,
            "log_a" => Curve::LogA,
            "w_taper" | "w" => Curve::WTaper,
            "squared" => Curve::Squared,
            "cubed" => Curve::Cubed,
            _ => return None,
        };
        Some(curve)
    }
}

#[inline]
fn log_taper(ym: f32, x: f32) -> f32 {
    let c = 1.0 / ym - 1.0;
    let b = c * c;
    let a = 1.0 / (b - 1.0);
    a * powf(b, x) - a
}
