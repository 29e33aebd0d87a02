//! Shift-register debounce for momentary switches.
//!
//! Each [`Switch::debounce`] call shifts the newest reading into an 8-bit
//! history. Only exact patterns count:
//!
//! | History | Meaning |
//! |---------|---------|
//! | `0111_1111` | rising edge (seven consecutive closed readings after an open one) |
//! | `1000_0000` | falling edge |
//! | `1111_1111` | pressed |
//!
//! A bouncing contact never produces seven identical readings in a row, so
//! it never reaches an edge pattern. Each pattern occurs once per
//! transition, so edges fire exactly once.

/// Time a switch must stay pressed before [`Switch::held`] fires.
pub const DEFAULT_HOLD_THRESHOLD_MS: u32 = 2000;

/// Which raw level means "closed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    /// High reads as pressed.
    Normal,
    /// Low reads as pressed (pull-up wiring, the footswitch default).
    #[default]
    Inverted,
}

/// Debounced momentary switch.
///
/// # Example
///
/// ```rust
/// use stompbox_platform::Switch;
///
/// // pull-up wiring: the pin reads low while the switch is closed
/// let mut sw = Switch::default();
/// let mut rising = 0;
/// for t in 0..20 {
///     sw.debounce(false, t);
///     rising += usize::from(sw.rising_edge());
/// }
/// assert_eq!(rising, 1);
/// assert!(sw.pressed());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Switch {
    polarity: Polarity,
    history: u8,
    raw: bool,
    now_ms: u32,
    rising_edge_ms: u32,
    hold_threshold_ms: u32,
    hold_fired: bool,
}

impl Default for Switch {
    fn default() -> Self {
        Self::new(Polarity::default())
    }
}

impl Switch {
    /// Creates a released switch.
    pub fn new(polarity: Polarity) -> Self {
        Self {
            polarity,
            history: 0,
            raw: false,
            now_ms: 0,
            rising_edge_ms: 0,
            hold_threshold_ms: DEFAULT_HOLD_THRESHOLD_MS,
            hold_fired: false,
        }
    }

    /// Builder: overrides the hold threshold.
    pub fn with_hold_threshold(mut self, ms: u32) -> Self {
        self.hold_threshold_ms = ms;
        self
    }

    /// Shifts in one raw reading taken at `now_ms`.
    pub fn debounce(&mut self, raw: bool, now_ms: u32) {
        self.raw = raw;
        self.now_ms = now_ms;
        let closed = match self.polarity {
            Polarity::Normal => raw,
            Polarity::Inverted => !raw,
        };
        self.history = (self.history << 1) | u8::from(closed);

        if self.rising_edge() {
            self.rising_edge_ms = now_ms;
            self.hold_fired = false;
        } else if self.falling_edge() {
            self.hold_fired = false;
        }
    }

    /// True on the one reading that completes a press.
    #[inline]
    pub fn rising_edge(&self) -> bool {
        self.history == 0x7f
    }

    /// True on the one reading that completes a release.
    #[inline]
    pub fn falling_edge(&self) -> bool {
        self.history == 0x80
    }

    /// True while the last eight readings were all closed.
    #[inline]
    pub fn pressed(&self) -> bool {
        self.history == 0xff
    }

    /// Milliseconds since the rising edge while pressed, otherwise 0.
    pub fn time_held_ms(&self) -> u32 {
        if self.pressed() {
            self.now_ms.wrapping_sub(self.rising_edge_ms)
        } else {
            0
        }
    }

    /// Returns true once per press, when the press outlasts the hold
    /// threshold.
    pub fn held(&mut self) -> bool {
        if !self.hold_fired && self.pressed() && self.time_held_ms() >= self.hold_threshold_ms {
            self.hold_fired = true;
            return true;
        }
        false
    }

    /// Last raw reading before polarity correction.
    pub fn raw_state(&self) -> bool {
        self.raw
    }

    /// Raw shift-register contents.
    pub fn debounced_state(&self) -> u8 {
        self.history
    }

    /// Wiring polarity.
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Changes the wiring polarity.
    pub fn set_polarity(&mut self, polarity: Polarity) {
        self.polarity = polarity;
    }

    /// Hold threshold in milliseconds.
    pub fn hold_threshold_ms(&self) -> u32 {
        self.hold_threshold_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(sw: &mut Switch, levels: &[bool], start_ms: u32) -> (usize, usize) {
        let (mut rising, mut falling) = (0, 0);
        for (i, &level) in levels.iter().enumerate() {
            sw.debounce(level, start_ms + i as u32);
            rising += usize::from(sw.rising_edge());
            falling += usize::from(sw.falling_edge());
        }
        (rising, falling)
    }

    #[test]
    fn test_seven_closed_readings_make_one_rising_edge() {
        let mut sw = Switch::new(Polarity::Normal);
        sw.debounce(false, 0);
        let (rising, _) = feed(&mut sw, &[true; 7], 1);
        assert_eq!(rising, 1);
        assert!(sw.rising_edge());

        let (again, _) = feed(&mut sw, &[true; 20], 8);
        assert_eq!(again, 0);
        assert!(sw.pressed());
    }

    #[test]
    fn test_bounce_is_ignored() {
        let mut sw = Switch::new(Polarity::Normal);
        let (rising, falling) = feed(&mut sw, &[true, false, true, true, false, true, false], 0);
        assert_eq!((rising, falling), (0, 0));
        assert!(!sw.pressed());
    }

    #[test]
    fn test_release_makes_one_falling_edge() {
        let mut sw = Switch::new(Polarity::Normal);
        feed(&mut sw, &[true; 10], 0);
        let (_, falling) = feed(&mut sw, &[false; 10], 10);
        assert_eq!(falling, 1);
        assert!(!sw.pressed());
    }

    #[test]
    fn test_default_is_pull_up() {
        let mut sw = Switch::default();
        assert_eq!(sw.polarity(), Polarity::Inverted);
        feed(&mut sw, &[true; 8], 0);
        assert!(!sw.pressed());
        let (rising, _) = feed(&mut sw, &[false; 8], 8);
        assert_eq!(rising, 1);
        assert!(sw.pressed());
    }

    #[test]
    fn test_inverted_polarity() {
        let mut sw = Switch::new(Polarity::Inverted);
        feed(&mut sw, &[false; 8], 0);
        assert!(sw.pressed());
        assert!(!sw.raw_state());
        assert_eq!(sw.debounced_state(), 0xff);
    }

    #[test]
    fn test_hold_fires_once_per_press() {
        let mut sw = Switch::new(Polarity::Normal).with_hold_threshold(100);
        let mut holds = 0;
        for t in 0..400 {
            sw.debounce(true, t);
            holds += usize::from(sw.held());
        }
        assert_eq!(holds, 1);

        // release and press again: hold re-arms
        feed(&mut sw, &[false; 8], 400);
        for t in 408..700 {
            sw.debounce(true, t);
            holds += usize::from(sw.held());
        }
        assert_eq!(holds, 2);
    }

    #[test]
    fn test_time_held() {
        let mut sw = Switch::new(Polarity::Normal);
        for t in 0..7 {
            sw.debounce(true, t * 10);
        }
        assert!(sw.rising_edge());
        assert_eq!(sw.time_held_ms(), 0);
        sw.debounce(true, 560);
        assert_eq!(sw.time_held_ms(), 500);
        sw.debounce(false, 570);
        assert_eq!(sw.time_held_ms(), 0);
    }
}
