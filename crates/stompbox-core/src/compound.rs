//! Composite effect routing owned children in series or parallel.
//!
//! [`CompoundEffect`] is itself an [`Effect`], so compounds nest. Children
//! are held in slots (`Option<Box<dyn Effect>>`); an emptied slot is skipped
//! during processing but still counts toward the parallel mix denominator.
//!
//! ## Routing
//!
//! ```text
//! Series:    in ─► [A] ─► [B] ─► [C] ─► out
//!
//! Parallel:       ┌► [A] ─┐
//!            in ──┼► [B] ─┼─► Σ · 1/N ─► out
//!                 └► [C] ─┘
//! ```
//!
//! ## Scratch buffers
//!
//! One scratch buffer per channel, preallocated at [`Effect::init`] to
//! [`DEFAULT_BLOCK_SIZE`] samples. A larger block grows the buffers once
//! (never shrinks them); steady-state processing never allocates. Call
//! [`CompoundEffect::reserve_block`] ahead of time to keep even that first
//! growth off the audio path.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use crate::effect::{Effect, EffectState};
use crate::math::mix_into;
use crate::param::{ControlKind, Parameter};
use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::vec::Vec;

/// Scratch size allocated by [`Effect::init`].
pub const DEFAULT_BLOCK_SIZE: usize = 128;

/// How a compound effect combines its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Routing {
    /// Each child's output feeds the next child's input.
    #[default]
    Series,
    /// Every child processes the same input; outputs are averaged.
    Parallel,
}

impl Routing {
    /// Lowercase name used by configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            Routing::Series => "series",
            Routing::Parallel => "parallel",
        }
    }

    /// Parses `"series"` or `"parallel"`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "series" => Some(Routing::Series),
            "parallel" => Some(Routing::Parallel),
            _ => None,
        }
    }
}

/// An effect that owns child effects and routes audio through them.
///
/// # Example
///
/// ```rust
/// use stompbox_core::{CompoundEffect, Effect, Routing};
///
/// let mut rack = CompoundEffect::new("Rack", Routing::Parallel);
/// rack.init(48000.0);
/// let input = [0.5; 4];
/// let mut output = [0.0; 4];
/// rack.process_mono(&input, &mut output);
/// // no children: bypass copies input
/// assert_eq!(output, input);
/// ```
pub struct CompoundEffect {
    state: EffectState,
    routing: Routing,
    children: Vec<Option<Box<dyn Effect>>>,
    scratch_l: Vec<f32>,
    scratch_r: Vec<f32>,
}

impl CompoundEffect {
    /// Creates an empty compound effect.
    pub fn new(name: impl Into<Cow<'static, str>>, routing: Routing) -> Self {
        Self {
            state: EffectState::new(name),
            routing,
            children: Vec::new(),
            scratch_l: Vec::new(),
            scratch_r: Vec::new(),
        }
    }

    /// Builder: appends a child.
    pub fn with_effect(mut self, effect: Box<dyn Effect>) -> Self {
        self.add_effect(effect);
        self
    }

    /// Appends a child and returns its slot.
    ///
    /// A child added after [`Effect::init`] is initialized immediately with
    /// this effect's sample rate and tempo.
    pub fn add_effect(&mut self, mut effect: Box<dyn Effect>) -> usize {
        if self.state.is_initialized() {
            effect.init(self.state.sample_rate());
            let tempo = self.tempo_hz();
            if tempo > 0.0 {
                effect.set_tempo(tempo);
            }
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(parent = %self.state.name(), child = %effect.name(), slot = self.children.len(), "child effect added");
        self.children.push(Some(effect));
        self.children.len() - 1
    }

    /// Removes the child in `slot`, leaving the slot empty.
    ///
    /// The empty slot still counts toward the parallel mix denominator.
    pub fn take_effect(&mut self, slot: usize) -> Option<Box<dyn Effect>> {
        self.children.get_mut(slot).and_then(Option::take)
    }

    /// Child in `slot`, if the slot exists and is occupied.
    pub fn effect(&self, slot: usize) -> Option<&dyn Effect> {
        self.children.get(slot)?.as_deref()
    }

    /// Child in `slot`, mutably.
    pub fn effect_mut(&mut self, slot: usize) -> Option<&mut (dyn Effect + 'static)> {
        self.children.get_mut(slot)?.as_deref_mut()
    }

    /// Number of slots, occupied or not.
    pub fn slot_count(&self) -> usize {
        self.children.len()
    }

    /// Current routing mode.
    pub fn routing(&self) -> Routing {
        self.routing
    }

    /// Switches routing mode.
    pub fn set_routing(&mut self, routing: Routing) {
        self.routing = routing;
    }

    /// Capacity of the per-channel scratch buffers.
    pub fn scratch_capacity(&self) -> usize {
        self.scratch_l.len().min(self.scratch_r.len())
    }

    /// Grows both scratch buffers to hold `block_size` samples.
    pub fn reserve_block(&mut self, block_size: usize) {
        if self.scratch_l.len() < block_size || self.scratch_r.len() < block_size {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                effect = %self.state.name(),
                from = self.scratch_l.len(),
                to = block_size,
                "growing compound scratch buffers"
            );
            self.scratch_l.resize(block_size.max(self.scratch_l.len()), 0.0);
            self.scratch_r.resize(block_size.max(self.scratch_r.len()), 0.0);
        }
    }

    fn is_bypassed(&self) -> bool {
        !self.state.is_enabled() || self.children.is_empty()
    }

    fn series_mono(&mut self, input: &[f32], output: &mut [f32]) {
        let n = input.len();
        let scratch = &mut self.scratch_l[..n];
        let mut wrote = false;
        for child in self.children.iter_mut().flatten() {
            if !child.is_enabled() {
                continue;
            }
            if wrote {
                scratch.copy_from_slice(output);
                child.process_mono(scratch, output);
            } else {
                child.process_mono(input, output);
                wrote = true;
            }
        }
        if !wrote {
            output.copy_from_slice(input);
        }
    }

    fn series_stereo(&mut self, in_l: &[f32], in_r: &[f32], out_l: &mut [f32], out_r: &mut [f32]) {
        let n = in_l.len();
        let scratch_l = &mut self.scratch_l[..n];
        let scratch_r = &mut self.scratch_r[..n];
        let mut wrote = false;
        for child in self.children.iter_mut().flatten() {
            if !child.is_enabled() {
                continue;
            }
            if wrote {
                scratch_l.copy_from_slice(out_l);
                scratch_r.copy_from_slice(out_r);
                child.process_stereo(scratch_l, scratch_r, out_l, out_r);
            } else {
                child.process_stereo(in_l, in_r, out_l, out_r);
                wrote = true;
            }
        }
        if !wrote {
            out_l.copy_from_slice(in_l);
            out_r.copy_from_slice(in_r);
        }
    }

    fn parallel_mono(&mut self, input: &[f32], output: &mut [f32]) {
        let n = input.len();
        let gain = 1.0 / self.children.len() as f32;
        let scratch = &mut self.scratch_l[..n];
        output.fill(0.0);
        for child in self.children.iter_mut().flatten() {
            if !child.is_enabled() {
                continue;
            }
            child.process_mono(input, scratch);
            mix_into(output, scratch, gain);
        }
    }

    fn parallel_stereo(
        &mut self,
        in_l: &[f32],
        in_r: &[f32],
        out_l: &mut [f32],
        out_r: &mut [f32],
    ) {
        let n = in_l.len();
        let gain = 1.0 / self.children.len() as f32;
        let scratch_l = &mut self.scratch_l[..n];
        let scratch_r = &mut self.scratch_r[..n];
        out_l.fill(0.0);
        out_r.fill(0.0);
        for child in self.children.iter_mut().flatten() {
            if !child.is_enabled() {
                continue;
            }
            child.process_stereo(in_l, in_r, scratch_l, scratch_r);
            mix_into(out_l, scratch_l, gain);
            mix_into(out_r, scratch_r, gain);
        }
    }
}

impl Effect for CompoundEffect {
    fn state(&self) -> &EffectState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EffectState {
        &mut self.state
    }

    fn init(&mut self, sample_rate: f32) {
        self.state.begin_init(sample_rate);
        self.reserve_block(DEFAULT_BLOCK_SIZE);
        for child in self.children.iter_mut().flatten() {
            child.init(sample_rate);
        }
    }

    fn process_mono(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), output.len());
        if self.is_bypassed() {
            output.copy_from_slice(input);
            return;
        }
        self.reserve_block(input.len());
        match self.routing {
            Routing::Series => self.series_mono(input, output),
            Routing::Parallel => self.parallel_mono(input, output),
        }
    }

    fn process_stereo(
        &mut self,
        in_l: &[f32],
        in_r: &[f32],
        out_l: &mut [f32],
        out_r: &mut [f32],
    ) {
        debug_assert_eq!(in_l.len(), in_r.len());
        debug_assert_eq!(in_l.len(), out_l.len());
        debug_assert_eq!(in_l.len(), out_r.len());
        if self.is_bypassed() {
            out_l.copy_from_slice(in_l);
            out_r.copy_from_slice(in_r);
            return;
        }
        self.reserve_block(in_l.len());
        match self.routing {
            Routing::Series => self.series_stereo(in_l, in_r, out_l, out_r),
            Routing::Parallel => self.parallel_stereo(in_l, in_r, out_l, out_r),
        }
    }

    fn update(&mut self) {
        for child in self.children.iter_mut().flatten() {
            child.update();
        }
    }

    fn set_tempo(&mut self, tempo_hz: f32) {
        self.state.set_tempo_hz(tempo_hz);
        for child in self.children.iter_mut().flatten() {
            child.set_tempo(tempo_hz);
        }
    }

    fn reset(&mut self) {
        for child in self.children.iter_mut().flatten() {
            child.reset();
        }
    }

    fn find_param_mut(&mut self, kind: ControlKind, index: usize) -> Option<&mut Parameter> {
        for child in self.children.iter_mut().flatten() {
            if let Some(param) = child.find_param_mut(kind, index) {
                return Some(param);
            }
        }
        None
    }
}

impl core::fmt::Debug for CompoundEffect {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CompoundEffect")
            .field("name", &self.state.name())
            .field("routing", &self.routing)
            .field("slots", &self.children.len())
            .field("scratch", &self.scratch_capacity())
            .finish()
    }
}
