//! Circular-buffer delay line for time-based effects.
//!
//! The buffer is sized once from a maximum delay time and never reallocates,
//! so reads and writes are safe on the audio path.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

/// Heap-allocated delay line with linear interpolation for fractional reads.
///
/// # Example
///
/// ```rust
/// use stompbox_core::DelayLine;
///
/// let mut line = DelayLine::new(8);
/// line.write(1.0);
/// line.write(0.0);
/// assert_eq!(line.read(1.0), 1.0);
/// assert_eq!(line.read(0.5), 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// Creates a delay line holding `max_delay_samples` samples.
    ///
    /// # Panics
    ///
    /// Panics if `max_delay_samples` is 0.
    pub fn new(max_delay_samples: usize) -> Self {
        assert!(max_delay_samples > 0, "Delay size must be > 0");
        Self {
            buffer: vec![0.0; max_delay_samples],
            write_pos: 0,
        }
    }

    /// Creates a delay line long enough for `max_seconds` at `sample_rate`.
    pub fn from_time(sample_rate: f32, max_seconds: f32) -> Self {
        let max_samples = (sample_rate * max_seconds) as usize + 1;
        Self::new(max_samples.max(1))
    }

    /// Reads the sample written `delay_samples` writes ago (0 = most recent).
    ///
    /// Fractional delays interpolate linearly; delays beyond capacity clamp.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.clamp(0.0, (len - 1) as f32);
        let delay_int = delay as usize;
        let frac = delay - delay_int as f32;

        // delay_int samples before the last written one
        let read_pos = (self.write_pos + len - delay_int - 1) % len;
        let older_pos = (read_pos + len - 1) % len;
        let a = self.buffer[read_pos];
        let b = self.buffer[older_pos];
        a + (b - a) * frac
    }

    /// Writes a sample and advances the write position.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Zeroes the buffer.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Capacity in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_comes_back_after_delay() {
        let mut line = DelayLine::new(16);
        line.write(1.0);
        for _ in 0..4 {
            line.write(0.0);
        }
        assert_eq!(line.read(4.0), 1.0);
        assert_eq!(line.read(3.0), 0.0);
    }

    #[test]
    fn delay_clamps_to_capacity() {
        let mut line = DelayLine::new(4);
        for i in 0..4 {
            line.write(i as f32);
        }
        assert_eq!(line.read(100.0), 0.0);
        assert_eq!(line.read(-1.0), 3.0);
    }

    #[test]
    fn from_time_sizes_buffer() {
        let line = DelayLine::from_time(48000.0, 2.0);
        assert_eq!(line.capacity(), 96001);
    }

    #[test]
    fn clear_resets() {
        let mut line = DelayLine::new(4);
        line.write(1.0);
        line.clear();
        assert_eq!(line.read(0.0), 0.0);
    }
}
