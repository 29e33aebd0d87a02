//! Potentiometer sampling with decoupled smoothing.
//!
//! Capturing and smoothing are separate steps. [`Knob::process`] stores the
//! raw ADC word every tick and costs nothing else; [`Knob::filter`] advances
//! the one-pole low-pass and runs only when the scheduler decides the knob
//! actually moved. The scale/offset/flip/invert transform is applied when
//! the value is read.

/// Default smoothing time constant in seconds.
pub const DEFAULT_SLEW_SECONDS: f32 = 0.002;

/// Sampled potentiometer.
///
/// # Example
///
/// ```rust
/// use stompbox_platform::Knob;
///
/// let mut knob = Knob::new(10.0);
/// knob.process(u16::MAX);
/// knob.filter();
/// assert_eq!(knob.value(), 1.0);
///
/// let mut cv = Knob::bipolar(10.0);
/// cv.process(u16::MAX);
/// cv.filter();
/// assert_eq!(cv.value(), -1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Knob {
    raw: u16,
    smoothed: f32,
    coeff: f32,
    slew_seconds: f32,
    update_rate: f32,
    scale: f32,
    offset: f32,
    flip: bool,
    invert: bool,
}

impl Knob {
    /// Unipolar knob sampled at `update_rate` Hz.
    pub fn new(update_rate: f32) -> Self {
        let mut knob = Self {
            raw: 0,
            smoothed: 0.0,
            coeff: 1.0,
            slew_seconds: DEFAULT_SLEW_SECONDS,
            update_rate,
            scale: 1.0,
            offset: 0.0,
            flip: false,
            invert: false,
        };
        knob.recompute_coeff();
        knob
    }

    /// Bipolar control-voltage input: scale 2, offset 0.5, inverted.
    pub fn bipolar(update_rate: f32) -> Self {
        Self::new(update_rate)
            .with_transform(2.0, 0.5)
            .with_invert(true)
    }

    /// Builder: `value = (x - offset) * scale`.
    pub fn with_transform(mut self, scale: f32, offset: f32) -> Self {
        self.scale = scale;
        self.offset = offset;
        self
    }

    /// Builder: reverses travel (`x → 1 − x`) before the transform.
    pub fn with_flip(mut self, flip: bool) -> Self {
        self.flip = flip;
        self
    }

    /// Builder: negates the transformed value.
    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Builder: smoothing time constant in seconds.
    pub fn with_slew(mut self, seconds: f32) -> Self {
        self.slew_seconds = seconds;
        self.recompute_coeff();
        self
    }

    /// Captures one raw ADC word.
    #[inline]
    pub fn process(&mut self, raw: u16) {
        self.raw = raw;
    }

    /// Advances the low-pass one step toward the captured reading.
    #[inline]
    pub fn filter(&mut self) {
        self.smoothed += self.coeff * (self.raw_normalized() - self.smoothed);
    }

    /// Last capture mapped onto [0, 1].
    #[inline]
    pub fn raw_normalized(&self) -> f32 {
        f32::from(self.raw) / f32::from(u16::MAX)
    }

    /// Last raw ADC word.
    pub fn raw(&self) -> u16 {
        self.raw
    }

    /// Smoothed position before the transform, in [0, 1].
    pub fn smoothed(&self) -> f32 {
        self.smoothed
    }

    /// Smoothed position after flip, offset, scale and invert.
    pub fn value(&self) -> f32 {
        let mut t = self.smoothed;
        if self.flip {
            t = 1.0 - t;
        }
        t = (t - self.offset) * self.scale;
        if self.invert { -t } else { t }
    }

    /// Sets the filter coefficient directly (clamped to [0, 1]).
    pub fn set_coeff(&mut self, coeff: f32) {
        self.coeff = coeff.clamp(0.0, 1.0);
    }

    /// Current filter coefficient.
    pub fn coeff(&self) -> f32 {
        self.coeff
    }

    /// Changes the sampling rate and recomputes the coefficient.
    pub fn set_update_rate(&mut self, update_rate: f32) {
        self.update_rate = update_rate;
        self.recompute_coeff();
    }

    /// Sampling rate in Hz.
    pub fn update_rate(&self) -> f32 {
        self.update_rate
    }

    fn recompute_coeff(&mut self) {
        let denom = self.slew_seconds * self.update_rate * 0.5;
        self.coeff = if denom > 0.0 { (1.0 / denom).clamp(0.0, 1.0) } else { 1.0 };
    }
}
