//! Quadrature rotary encoder with a push switch.

use crate::switch::{Polarity, Switch};

/// Quadrature decoder.
///
/// Channels A and B each keep their last two readings (idle high). A step
/// is reported on the tick where one channel falls while the other has
/// already been low for a reading:
///
/// | A (prev, now) | B (prev, now) | Step |
/// |---------------|---------------|------|
/// | 1, 0 | 0, 0 | +1 |
/// | 0, 0 | 1, 0 | −1 |
///
/// # Example
///
/// ```rust
/// use stompbox_platform::Encoder;
///
/// let mut enc = Encoder::default();
/// // B falls first, then A: one clockwise detent
/// enc.debounce(true, false, false, 0);
/// enc.debounce(false, false, false, 1);
/// assert_eq!(enc.increment(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoder {
    a: u8,
    b: u8,
    increment: i32,
    button: Switch,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(Polarity::default())
    }
}

impl Encoder {
    /// Creates an idle encoder; `button_polarity` applies to the push switch.
    pub fn new(button_polarity: Polarity) -> Self {
        Self {
            a: 0xff,
            b: 0xff,
            increment: 0,
            button: Switch::new(button_polarity),
        }
    }

    /// Builder: overrides the push switch's hold threshold.
    pub fn with_hold_threshold(mut self, ms: u32) -> Self {
        self.button = self.button.with_hold_threshold(ms);
        self
    }

    /// Shifts in one reading of both channels and the push switch.
    pub fn debounce(&mut self, a: bool, b: bool, button: bool, now_ms: u32) {
        self.a = (self.a << 1) | u8::from(a);
        self.b = (self.b << 1) | u8::from(b);

        let (a2, b2) = (self.a & 0b11, self.b & 0b11);
        self.increment = if a2 == 0b10 && b2 == 0b00 {
            1
        } else if b2 == 0b10 && a2 == 0b00 {
            -1
        } else {
            0
        };

        self.button.debounce(button, now_ms);
    }

    /// Step detected on the last reading: +1, −1 or 0.
    #[inline]
    pub fn increment(&self) -> i32 {
        self.increment
    }

    /// Push switch rising edge.
    pub fn rising_edge(&self) -> bool {
        self.button.rising_edge()
    }

    /// Push switch falling edge.
    pub fn falling_edge(&self) -> bool {
        self.button.falling_edge()
    }

    /// Push switch held down.
    pub fn pressed(&self) -> bool {
        self.button.pressed()
    }

    /// Push switch press duration.
    pub fn time_held_ms(&self) -> u32 {
        self.button.time_held_ms()
    }

    /// Push switch hold, once per press.
    pub fn held(&mut self) -> bool {
        self.button.held()
    }

    /// The embedded push switch.
    pub fn button(&self) -> &Switch {
        &self.button
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Gray-code sequence for one detent; `cw` picks the direction.
    fn detent(enc: &mut Encoder, cw: bool) -> i32 {
        let seq: [(bool, bool); 4] = if cw {
            [(true, false), (false, false), (false, true), (true, true)]
        } else {
            [(false, true), (false, false), (true, false), (true, true)]
        };
        let mut total = 0;
        for (a, b) in seq {
            enc.debounce(a, b, false, 0);
            total += enc.increment();
        }
        total
    }

    #[test]
    fn test_idle_reports_nothing() {
        let mut enc = Encoder::default();
        for _ in 0..10 {
            enc.debounce(true, true, false, 0);
            assert_eq!(enc.increment(), 0);
        }
    }

    #[test]
    fn test_one_step_per_detent() {
        let mut enc = Encoder::default();
        assert_eq!(detent(&mut enc, true), 1);
        assert_eq!(detent(&mut enc, true), 1);
        assert_eq!(detent(&mut enc, false), -1);
    }

    #[test]
    fn test_increment_lasts_one_tick() {
        let mut enc = Encoder::default();
        enc.debounce(true, false, false, 0);
        enc.debounce(false, false, false, 0);
        assert_eq!(enc.increment(), 1);
        enc.debounce(false, false, false, 0);
        assert_eq!(enc.increment(), 0);
    }

    #[test]
    fn test_button_edges() {
        let mut enc = Encoder::new(Polarity::Normal);
        let mut rising = 0;
        for t in 0..10 {
            enc.debounce(true, true, true, t);
            rising += usize::from(enc.rising_edge());
        }
        assert_eq!(rising, 1);
        assert!(enc.pressed());
        assert_eq!(enc.time_held_ms(), 3);
    }

    #[test]
    fn test_default_button_is_pull_up() {
        let mut enc = Encoder::default();
        for t in 0..10 {
            enc.debounce(true, true, true, t);
        }
        assert!(!enc.pressed());
        for t in 10..20 {
            enc.debounce(true, true, false, t);
        }
        assert!(enc.pressed());
    }
}
