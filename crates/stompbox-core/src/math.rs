//! Small sample-level helpers shared by effect kernels.

/// Replaces values below 1e-20 with zero.
///
/// Feedback loops decay toward the subnormal range, where many CPUs slow
/// down drastically.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Crossfade: 0.0 = all dry, 1.0 = all wet.
#[inline]
pub fn wet_dry_mix(dry: f32, wet: f32, mix: f32) -> f32 {
    dry + (wet - dry) * mix
}

/// Adds `src * gain` into `dst` sample by sample.
#[inline]
pub fn mix_into(dst: &mut [f32], src: &[f32], gain: f32) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d += *s * gain;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denormals_flush_to_zero() {
        assert_eq!(flush_denormal(1e-25), 0.0);
        assert_eq!(flush_denormal(-1e-30), 0.0);
        assert_eq!(flush_denormal(0.5), 0.5);
    }

    #[test]
    fn wet_dry_endpoints() {
        assert_eq!(wet_dry_mix(0.2, 0.8, 0.0), 0.2);
        assert_eq!(wet_dry_mix(0.2, 0.8, 1.0), 0.8);
        assert!((wet_dry_mix(0.2, 0.8, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn mix_into_accumulates() {
        let mut dst = [1.0, 1.0, 1.0];
        mix_into(&mut dst, &[2.0, 4.0], 0.5);
        assert_eq!(dst, [2.0, 3.0, 1.0]);
    }
}
