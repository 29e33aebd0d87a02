//! Stompbox Platform - control sampling, event dispatch and the pedal runtime
//!
//! This crate turns noisy hardware readings into parameter changes on the
//! active effect, across three execution contexts:
//!
//! ```text
//!  control timer            main loop                 audio callback
//!  ─────────────            ─────────                 ──────────────
//!  ControlScheduler::tick   Pedal::poll               Pedal::process_audio
//!   ├ Knob / Switch /        ├ EventConsumer::pop      └ Effect::process_stereo
//!   │ Encoder debounce       └ Dispatcher::dispatch
//!   └ EventProducer::push        └ listeners mutate Parameters
//! ```
//!
//! # Core Abstractions
//!
//! ## Control Samplers
//!
//! - [`Switch`] - 8-bit shift-register debounce with edge and hold detection
//! - [`Encoder`] - Quadrature decoder with an embedded push switch
//! - [`Knob`] - ADC capture, one-pole smoothing, scale/offset/flip/invert
//!
//! ## Events
//!
//! - [`ControlId`] - Namespaced control identity (knob, switch, encoder, encoder button)
//! - [`ControlEvent`] - One control change, created at sample time, consumed once
//! - [`event_queue`] - Bounded SPSC queue between the control timer and the main loop
//! - [`Dispatcher`] - Listener registry filtered by kind, source and index
//!
//! ## Runtime
//!
//! - [`ControlHardware`] - The four primitives the samplers consume
//! - [`ControlScheduler`] - Sub-rate sampling via per-sampler dividers
//! - [`Pedal`] - Effect list, bypass, tap tempo and the default control wiring
//!
//! # Control ID Namespaces
//!
//! - `0x00XX` - Potentiometers
//! - `0x01XX` - Momentary switches
//! - `0x02XX` - Rotary encoders
//! - `0x03XX` - Encoder push buttons

pub mod dispatcher;
pub mod encoder;
pub mod event;
pub mod knob;
pub mod pedal;
pub mod queue;
pub mod scheduler;
pub mod switch;

use core::fmt;

// Re-export main types at crate root
pub use dispatcher::{Dispatcher, Listener};
pub use encoder::Encoder;
pub use event::{ControlEvent, EventKind, Payload};
pub use knob::{DEFAULT_SLEW_SECONDS, Knob};
pub use pedal::{Pedal, PedalConfig, PedalState};
pub use queue::{EventConsumer, EventProducer, QueueFull, event_queue};
pub use scheduler::{
    ControlLayout, ControlScheduler, Divider, EncoderPins, ProcessingFlag, SchedulerConfig,
};
pub use switch::{DEFAULT_HOLD_THRESHOLD_MS, Polarity, Switch};

/// Namespace identifiers for control families.
pub mod namespace {
    /// Potentiometers.
    pub const KNOB: u16 = 0x0000;
    /// Momentary switches.
    pub const SWITCH: u16 = 0x0100;
    /// Rotary encoders.
    pub const ENCODER: u16 = 0x0200;
    /// Push buttons built into encoders.
    pub const ENCODER_BUTTON: u16 = 0x0300;
}

/// A namespaced control identifier.
///
/// The high byte names the control family, the low byte the control's
/// position within it. This is the "originating control" a listener can
/// filter on.
///
/// # Example
///
/// ```rust
/// use stompbox_platform::ControlId;
///
/// let knob = ControlId::knob(2);
/// assert_eq!(knob.raw(), 0x0002);
/// assert!(knob.is_knob());
/// assert_eq!(knob.to_string(), "Knob_3");
///
/// let button = ControlId::encoder_button(0);
/// assert_eq!(button.raw(), 0x0300);
/// assert_eq!(button.to_string(), "Encoder_1_Button");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(u16);

impl ControlId {
    /// Creates a ControlId from a raw 16-bit value.
    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Potentiometer at `index`.
    #[inline]
    pub const fn knob(index: u8) -> Self {
        Self(namespace::KNOB | index as u16)
    }

    /// Momentary switch at `index`.
    #[inline]
    pub const fn switch(index: u8) -> Self {
        Self(namespace::SWITCH | index as u16)
    }

    /// Rotary encoder at `index`.
    #[inline]
    pub const fn encoder(index: u8) -> Self {
        Self(namespace::ENCODER | index as u16)
    }

    /// Push button of the encoder at `index`.
    #[inline]
    pub const fn encoder_button(index: u8) -> Self {
        Self(namespace::ENCODER_BUTTON | index as u16)
    }

    /// Returns the raw 16-bit value.
    #[inline]
    pub const fn raw(&self) -> u16 {
        self.0
    }

    /// Returns the namespace portion (high byte).
    #[inline]
    pub const fn namespace(&self) -> u16 {
        self.0 & 0xFF00
    }

    /// Returns the index within the namespace (low byte).
    #[inline]
    pub const fn index(&self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    /// Returns true for potentiometers.
    #[inline]
    pub const fn is_knob(&self) -> bool {
        self.namespace() == namespace::KNOB
    }

    /// Returns true for momentary switches.
    #[inline]
    pub const fn is_switch(&self) -> bool {
        self.namespace() == namespace::SWITCH
    }

    /// Returns true for rotary encoders.
    #[inline]
    pub const fn is_encoder(&self) -> bool {
        self.namespace() == namespace::ENCODER
    }

    /// Returns true for encoder push buttons.
    #[inline]
    pub const fn is_encoder_button(&self) -> bool {
        self.namespace() == namespace::ENCODER_BUTTON
    }
}

/// Display label, numbered from 1: `Knob_1`, `Switch_2`, `Encoder_1`,
/// `Encoder_1_Button`.
impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = u16::from(self.index()) + 1;
        match self.namespace() {
            namespace::KNOB => write!(f, "Knob_{n}"),
            namespace::SWITCH => write!(f, "Switch_{n}"),
            namespace::ENCODER => write!(f, "Encoder_{n}"),
            namespace::ENCODER_BUTTON => write!(f, "Encoder_{n}_Button"),
            _ => write!(f, "Control_{:#06x}", self.0),
        }
    }
}

/// Hardware primitives the control layer consumes.
///
/// Peripheral setup (ADC channels, GPIO modes, timers) happens elsewhere;
/// implementations only report readings and time. The periodic callback is
/// whatever timer interrupt calls [`ControlScheduler::tick`].
///
/// # Example
///
/// ```rust
/// use stompbox_platform::ControlHardware;
///
/// struct Bench {
///     adc: [u16; 4],
///     gpio: [bool; 8],
///     us: u64,
/// }
///
/// impl ControlHardware for Bench {
///     fn read_adc(&mut self, channel: usize) -> u16 {
///         self.adc.get(channel).copied().unwrap_or(0)
///     }
///     fn read_gpio(&mut self, pin: usize) -> bool {
///         self.gpio.get(pin).copied().unwrap_or(false)
///     }
///     fn now_us(&self) -> u64 {
///         self.us
///     }
/// }
///
/// let bench = Bench { adc: [0; 4], gpio: [false; 8], us: 2_500_000 };
/// assert_eq!(bench.now_ms(), 2500);
/// ```
pub trait ControlHardware {
    /// Raw 16-bit ADC reading for `channel`.
    fn read_adc(&mut self, channel: usize) -> u16;

    /// Raw logic level of GPIO `pin`.
    fn read_gpio(&mut self, pin: usize) -> bool;

    /// Monotonic microsecond clock.
    fn now_us(&self) -> u64;

    /// Monotonic millisecond clock (wraps at 2³²).
    fn now_ms(&self) -> u32 {
        (self.now_us() / 1000) as u32
    }
}
