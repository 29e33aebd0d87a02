//! Tap tempo and tempo-synced delay times.
//!
//! Tap tempo turns two consecutive button presses into a tempo in Hz
//! (beats per second). A synced delay turns a tempo, or a 0–1 knob position
//! standing in for one, into seconds via a [`Subdivision`] multiplier.

use crate::param::Parameter;

/// Default inter-tap window in milliseconds.
pub const DEFAULT_TAP_TIMEOUT_MS: u32 = 2000;
/// Slowest tempo a synced delay accepts.
pub const MIN_BPM: f32 = 60.0;
/// Fastest tempo a synced delay accepts.
pub const MAX_BPM: f32 = 240.0;

/// Tap-tempo detector.
///
/// Every tap is remembered; a tempo comes out only when the previous tap is
/// recent enough. A stale tap is not an error, it just starts a new pair.
///
/// # Example
///
/// ```rust
/// use stompbox_core::TapTempo;
///
/// let mut tap = TapTempo::default();
/// assert_eq!(tap.tap(1000), None);
/// assert_eq!(tap.tap(1500), Some(2.0));
/// // too slow: no tempo, but this tap starts the next pair
/// assert_eq!(tap.tap(4500), None);
/// assert_eq!(tap.tap(5000), Some(2.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapTempo {
    last_tap_ms: Option<u32>,
    timeout_ms: u32,
}

impl Default for TapTempo {
    fn default() -> Self {
        Self::new(DEFAULT_TAP_TIMEOUT_MS)
    }
}

impl TapTempo {
    /// Creates a detector with the given inter-tap window.
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            last_tap_ms: None,
            timeout_ms,
        }
    }

    /// Registers a tap at `now_ms` and returns the tempo in Hz if the
    /// previous tap lies within the window.
    ///
    /// Millisecond clocks wrap; the interval is computed modulo 2³².
    pub fn tap(&mut self, now_ms: u32) -> Option<f32> {
        let tempo = self.last_tap_ms.and_then(|last| {
            let interval = now_ms.wrapping_sub(last);
            (interval > 0 && interval < self.timeout_ms).then(|| 1000.0 / interval as f32)
        });
        self.last_tap_ms = Some(now_ms);
        tempo
    }

    /// Timestamp of the most recent tap.
    pub fn last_tap_ms(&self) -> Option<u32> {
        self.last_tap_ms
    }

    /// Inter-tap window.
    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Forgets the stored tap.
    pub fn reset(&mut self) {
        self.last_tap_ms = None;
    }
}

/// Note length a synced delay repeats at, as a multiple of one beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Subdivision {
    /// 1/16 (0.25 beat)
    Sixteenth,
    /// 1/8 (0.5 beat)
    Eighth,
    /// Dotted 1/8 (0.75 beat)
    DottedEighth,
    /// 1/4 (1 beat)
    #[default]
    Quarter,
    /// 5/16 (1.25 beats)
    FiveSixteenths,
    /// Dotted 1/4 (1.5 beats)
    DottedQuarter,
    /// 1/2 (2 beats)
    Half,
}

impl Subdivision {
    /// Every subdivision, in knob order.
    pub const ALL: [Subdivision; 7] = [
        Subdivision::Sixteenth,
        Subdivision::Eighth,
        Subdivision::DottedEighth,
        Subdivision::Quarter,
        Subdivision::FiveSixteenths,
        Subdivision::DottedQuarter,
        Subdivision::Half,
    ];

    /// Highest knob bucket index.
    pub const MAX_INDEX: u32 = 6;

    /// Delay length in beats.
    pub fn multiplier(&self) -> f32 {
        match self {
            Subdivision::Sixteenth => 0.25,
            Subdivision::Eighth => 0.5,
            Subdivision::DottedEighth => 0.75,
            Subdivision::Quarter => 1.0,
            Subdivision::FiveSixteenths => 1.25,
            Subdivision::DottedQuarter => 1.5,
            Subdivision::Half => 2.0,
        }
    }

    /// Bucket index; `Quarter` is 3.
    pub fn index(&self) -> u32 {
        match self {
            Subdivision::Sixteenth => 0,
            Subdivision::Eighth => 1,
            Subdivision::DottedEighth => 2,
            Subdivision::Quarter => 3,
            Subdivision::FiveSixteenths => 4,
            Subdivision::DottedQuarter => 5,
            Subdivision::Half => 6,
        }
    }

    /// Subdivision for a bucket index; out-of-range indices give `Quarter`.
    pub fn from_index(index: u32) -> Self {
        Self::ALL
            .get(index as usize)
            .copied()
            .unwrap_or_default()
    }

    /// Quantizes a parameter into one of the seven buckets.
    pub fn from_param(param: &Parameter) -> Self {
        Self::from_index(param.value_as_int(Self::MAX_INDEX))
    }

    /// Short label such as `"1/8."`.
    pub fn label(&self) -> &'static str {
        match self {
            Subdivision::Sixteenth => "1/16",
            Subdivision::Eighth => "1/8",
            Subdivision::DottedEighth => "1/8.",
            Subdivision::Quarter => "1/4",
            Subdivision::FiveSixteenths => "5/16",
            Subdivision::DottedQuarter => "1/4.",
            Subdivision::Half => "1/2",
        }
    }
}

/// Maps a 0–1 knob position linearly onto 60–240 BPM.
pub fn bpm_from_normalized(normalized: f32) -> f32 {
    let x = if normalized.is_nan() { 0.0 } else { normalized.clamp(0.0, 1.0) };
    MIN_BPM + x * (MAX_BPM - MIN_BPM)
}

/// Converts a tempo in Hz to BPM, clamped to 60–240.
pub fn bpm_from_tempo_hz(tempo_hz: f32) -> f32 {
    (tempo_hz * 60.0).clamp(MIN_BPM, MAX_BPM)
}

/// Delay time in seconds for `subdivision` at `bpm`.
///
/// # Example
///
/// ```rust
/// use stompbox_core::{Subdivision, delay_seconds};
///
/// assert_eq!(delay_seconds(120.0, Subdivision::from_index(3)), 0.5);
/// ```
pub fn delay_seconds(bpm: f32, subdivision: Subdivision) -> f32 {
    let bpm = bpm.clamp(MIN_BPM, MAX_BPM);
    60.0 / bpm * subdivision.multiplier()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::Curve;

    #[test]
    fn taps_500ms_apart_give_2hz() {
        let mut tap = TapTempo::default();
        assert_eq!(tap.tap(10_000), None);
        assert_eq!(tap.tap(10_500), Some(2.0));
    }

    #[test]
    fn slow_taps_only_store_timestamp() {
        let mut tap = TapTempo::default();
        tap.tap(0);
        assert_eq!(tap.tap(3000), None);
        assert_eq!(tap.last_tap_ms(), Some(3000));
    }

    #[test]
    fn interval_equal_to_timeout_is_stale() {
        let mut tap = TapTempo::new(1000);
        tap.tap(0);
        assert_eq!(tap.tap(1000), None);
        assert_eq!(tap.tap(1999), Some(1000.0 / 999.0));
    }

    #[test]
    fn clock_wraparound() {
        let mut tap = TapTempo::default();
        tap.tap(u32::MAX - 249);
        assert_eq!(tap.tap(250), Some(2.0));
    }

    #[test]
    fn duplicate_timestamp_gives_no_tempo() {
        let mut tap = TapTempo::default();
        tap.tap(42);
        assert_eq!(tap.tap(42), None);
    }

    #[test]
    fn quarter_at_120_is_half_second() {
        assert_eq!(Subdivision::from_index(3), Subdivision::Quarter);
        assert_eq!(Subdivision::Quarter.multiplier(), 1.0);
        assert_eq!(delay_seconds(120.0, Subdivision::Quarter), 0.5);
        assert_eq!(delay_seconds(120.0, Subdivision::Half), 1.0);
        assert_eq!(delay_seconds(120.0, Subdivision::Sixteenth), 0.125);
    }

    #[test]
    fn index_round_trip_and_default() {
        for sub in Subdivision::ALL {
            assert_eq!(Subdivision::from_index(sub.index()), sub);
        }
        assert_eq!(Subdivision::from_index(99), Subdivision::Quarter);
    }

    #[test]
    fn from_param_quantizes_seven_buckets() {
        let mut p = Parameter::continuous("Division", 0.0, 1.0, 0.5, Curve::Linear);
        assert_eq!(Subdivision::from_param(&p), Subdivision::Quarter);
        p.set_normalized(0.0);
        assert_eq!(Subdivision::from_param(&p), Subdivision::Sixteenth);
        p.set_normalized(1.0);
        assert_eq!(Subdivision::from_param(&p), Subdivision::Half);
    }

    #[test]
    fn bpm_mapping_clamps() {
        assert_eq!(bpm_from_normalized(0.0), 60.0);
        assert_eq!(bpm_from_normalized(0.5), 150.0);
        assert_eq!(bpm_from_normalized(2.0), 240.0);
        assert_eq!(bpm_from_tempo_hz(2.0), 120.0);
        assert_eq!(bpm_from_tempo_hz(0.1), 60.0);
        assert_eq!(bpm_from_tempo_hz(10.0), 240.0);
    }
}
