//! Stompbox Effects - effect variants and the effect registry
//!
//! The set of effects a pedal can load is closed; [`EffectKind`] names every
//! variant and builds them behind `Box<dyn Effect>`:
//!
//! - [`Delay`] - Feedback delay, free-running or tempo-synced
//! - [`Tremolo`] - Sine tremolo with a tap-tempo `Rate`
//! - [`Gain`] - Output level
//! - [`CompoundEffect`] - Series/parallel rack of other effects
//!
//! Delay, Tremolo and Gain are small demonstration effects. They exist to
//! exercise the parameter, tempo and bypass contract of `stompbox-core`, not
//! to match a production effect library's DSP.
//!
//! ## Example
//!
//! ```rust
//! use stompbox_core::{CompoundEffect, Effect, Routing};
//! use stompbox_effects::EffectKind;
//!
//! let mut rack = CompoundEffect::new("Rack", Routing::Series);
//! for name in ["gain", "delay"] {
//!     let kind = EffectKind::from_name(name).unwrap();
//!     rack.add_effect(kind.create());
//! }
//! rack.init(48000.0);
//! assert_eq!(rack.slot_count(), 2);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;

pub mod delay;
pub mod gain;
pub mod tremolo;

// Re-export main types at crate root
pub use delay::{Delay, MAX_DELAY_SECONDS};
pub use gain::Gain;
pub use stompbox_core::CompoundEffect;
pub use tremolo::Tremolo;

use stompbox_core::{Effect, Routing};

/// Every effect variant a pedal can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// [`Delay`]
    Delay,
    /// [`Tremolo`]
    Tremolo,
    /// [`Gain`]
    Gain,
    /// Empty series [`CompoundEffect`]
    Compound,
}

impl EffectKind {
    /// All variants, in listing order.
    pub const ALL: [EffectKind; 4] = [
        EffectKind::Delay,
        EffectKind::Tremolo,
        EffectKind::Gain,
        EffectKind::Compound,
    ];

    /// Identifier used by configuration files (lowercase, no spaces).
    pub const fn id(&self) -> &'static str {
        match self {
            EffectKind::Delay => "delay",
            EffectKind::Tremolo => "tremolo",
            EffectKind::Gain => "gain",
            EffectKind::Compound => "compound",
        }
    }

    /// One-line description.
    pub const fn description(&self) -> &'static str {
        match self {
            EffectKind::Delay => "Feedback delay with tap-tempo subdivisions",
            EffectKind::Tremolo => "Sine amplitude modulation, rate follows tap tempo",
            EffectKind::Gain => "Output level with audio-taper knob",
            EffectKind::Compound => "Series or parallel rack of other effects",
        }
    }

    /// Looks a variant up by [`id`](Self::id), ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id().eq_ignore_ascii_case(name))
    }

    /// Builds an uninitialized instance.
    pub fn create(&self) -> Box<dyn Effect> {
        match self {
            EffectKind::Delay => Box::new(Delay::new()),
            EffectKind::Tremolo => Box::new(Tremolo::new()),
            EffectKind::Gain => Box::new(Gain::new()),
            EffectKind::Compound => Box::new(CompoundEffect::new("Compound", Routing::Series)),
        }
    }
}
