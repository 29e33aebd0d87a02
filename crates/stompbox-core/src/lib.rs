//! Stompbox Core - effect and parameter model for a single-channel pedal
//!
//! This crate holds everything the audio path touches, designed for
//! real-time processing with no allocation once effects are initialized.
//!
//! # Core Abstractions
//!
//! ## Parameters
//!
//! - [`Parameter`] - Named, bounded value mapped to a physical control
//! - [`Curve`] - Transfer curves applied to knob positions
//! - [`Taper`] - Validated custom log taper
//!
//! ## Effect System
//!
//! - [`Effect`] - Object-safe trait for every processing module
//! - [`EffectState`] - Name, enable flag, sample rate, tempo and parameters
//! - [`CompoundEffect`] - Series/parallel router over owned children
//!
//! ## Tempo
//!
//! - [`TapTempo`] - Tempo from consecutive button presses
//! - [`Subdivision`] - Note lengths for synced delays
//!
//! ## Utilities
//!
//! - [`DelayLine`] - Circular buffer with fractional reads
//! - [`flush_denormal`], [`wet_dry_mix`]
//!
//! # no_std Support
//!
//! Disable the default `std` feature for embedded targets:
//!
//! ```toml
//! [dependencies]
//! stompbox-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use stompbox_core::{CompoundEffect, Effect, Routing};
//!
//! let mut chain = CompoundEffect::new("Chain", Routing::Series);
//! chain.init(48000.0);
//!
//! let input = [0.1f32; 64];
//! let mut left = [0.0f32; 64];
//! let mut right = [0.0f32; 64];
//! chain.process_stereo(&input, &input, &mut left, &mut right);
//! assert_eq!(left, input);
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: No allocations in audio processing paths
//! - **No dependencies on std**: Pure `no_std` with `libm` for math
//! - **Clamp, don't fail**: Out-of-range control writes are clamped
//! - **Illegal configurations are unrepresentable**: degenerate tapers
//!   are rejected at construction

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod compound;
pub mod curve;
pub mod delay;
pub mod effect;
pub mod math;
pub mod param;
pub mod tempo;

// Re-export main types at crate root
pub use compound::{CompoundEffect, DEFAULT_BLOCK_SIZE, Routing};
pub use curve::{Curve, CurveError, LOG_A_MIDPOINT, LOG_MIDPOINT, REVERSE_LOG_MIDPOINT, Taper};
pub use delay::DelayLine;
pub use effect::{DEFAULT_SAMPLE_RATE, Effect, EffectState, RATE_PARAM};
pub use math::{flush_denormal, mix_into, wet_dry_mix};
pub use param::{ControlKind, ParamKind, Parameter};
pub use tempo::{
    DEFAULT_TAP_TIMEOUT_MS, MAX_BPM, MIN_BPM, Subdivision, TapTempo, bpm_from_normalized,
    bpm_from_tempo_hz, delay_seconds,
};
