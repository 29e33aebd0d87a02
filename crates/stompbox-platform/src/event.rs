//! Control-change events.

use crate::ControlId;

/// What happened to a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A potentiometer moved.
    KnobChanged,
    /// A switch or encoder button was pressed.
    ButtonPressed,
    /// A switch or encoder button was released.
    ButtonReleased,
    /// A press outlasted the hold threshold.
    ButtonHeld,
    /// An encoder turned.
    EncoderRotated,
}

impl EventKind {
    /// Lowercase name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::KnobChanged => "knob_changed",
            EventKind::ButtonPressed => "button_pressed",
            EventKind::ButtonReleased => "button_released",
            EventKind::ButtonHeld => "button_held",
            EventKind::EncoderRotated => "encoder_rotated",
        }
    }
}

/// Numeric data carried by an event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Payload {
    /// Presses and releases carry nothing.
    #[default]
    None,
    /// Knob position after and before the change.
    Value {
        /// New value.
        current: f32,
        /// Value before the change.
        previous: f32,
    },
    /// Encoder detents (negative = counter-clockwise).
    Steps(i32),
    /// How long the button had been held.
    HeldMs(u32),
}

/// One control change.
///
/// Created by the sampling context, consumed exactly once by the dispatcher.
/// `Copy` and allocation-free so it can be built inside a timer interrupt;
/// the display label is derived from [`source`](Self::source) on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlEvent {
    /// What happened.
    pub kind: EventKind,
    /// Which control it happened to.
    pub source: ControlId,
    /// Control index the dispatcher's index filter matches against.
    ///
    /// Knobs, switches and encoders use their position; encoder buttons are
    /// numbered after the switches (`switch_count + encoder`).
    pub index: usize,
    /// Event data.
    pub payload: Payload,
    /// Millisecond clock at sampling time.
    pub timestamp_ms: u32,
}

impl ControlEvent {
    /// Knob moved from `previous` to `current`.
    pub fn knob_changed(source: ControlId, index: usize, current: f32, previous: f32, now_ms: u32) -> Self {
        Self {
            kind: EventKind::KnobChanged,
            source,
            index,
            payload: Payload::Value { current, previous },
            timestamp_ms: now_ms,
        }
    }

    /// Button pressed.
    pub fn button_pressed(source: ControlId, index: usize, now_ms: u32) -> Self {
        Self {
            kind: EventKind::ButtonPressed,
            source,
            index,
            payload: Payload::None,
            timestamp_ms: now_ms,
        }
    }

    /// Button released.
    pub fn button_released(source: ControlId, index: usize, now_ms: u32) -> Self {
        Self {
            kind: EventKind::ButtonReleased,
            source,
            index,
            payload: Payload::None,
            timestamp_ms: now_ms,
        }
    }

    /// Button held for `held_ms`.
    pub fn button_held(source: ControlId, index: usize, held_ms: u32, now_ms: u32) -> Self {
        Self {
            kind: EventKind::ButtonHeld,
            source,
            index,
            payload: Payload::HeldMs(held_ms),
            timestamp_ms: now_ms,
        }
    }

    /// Encoder turned by `steps`.
    pub fn encoder_rotated(source: ControlId, index: usize, steps: i32, now_ms: u32) -> Self {
        Self {
            kind: EventKind::EncoderRotated,
            source,
            index,
            payload: Payload::Steps(steps),
            timestamp_ms: now_ms,
        }
    }

    /// New knob value, for [`Payload::Value`].
    pub fn value(&self) -> Option<f32> {
        match self.payload {
            Payload::Value { current, .. } => Some(current),
            _ => None,
        }
    }

    /// Previous knob value, for [`Payload::Value`].
    pub fn previous_value(&self) -> Option<f32> {
        match self.payload {
            Payload::Value { previous, .. } => Some(previous),
            _ => None,
        }
    }

    /// Encoder steps, for [`Payload::Steps`].
    pub fn steps(&self) -> Option<i32> {
        match self.payload {
            Payload::Steps(steps) => Some(steps),
            _ => None,
        }
    }

    /// Display label such as `Switch_2`.
    pub fn label(&self) -> String {
        self.source.to_string()
    }
}
