//! Thiran fractional-delay tuning filter.

#[allow(unused_imports)]
use num_traits::float::Float;

/// First-order all-pass approximating a fractional sample delay, one history
/// cell per lane.
#[derive(Debug)]
pub struct TuningFilter<const LANES: usize> {
    latch: [f32; LANES],
}

impl<const LANES: usize> Default for TuningFilter<LANES> {
    fn default() -> Self {
        Self {
            latch: [0.0; LANES],
        }
    }
}

impl<const LANES: usize> TuningFilter<LANES> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.latch = [0.0; LANES];
    }

    #[inline]
    pub fn tick(&mut self, x: &[f32; LANES], alpha: &[f32; LANES]) -> [f32; LANES] {
        let mut out = [0.0; LANES];
        for i in 0..LANES {
            let v = self.latch[i];
            let t = x[i] - alpha[i] * v;
            self.latch[i] = t;
            out[i] = v + alpha[i] * t;
        }
        out
    }
}

/// Splits a delay in samples into the integer part handled by buffer
/// addressing and the all-pass coefficient covering the fractional residual.
///
/// The residual is kept in [0.5, 1.5) by borrowing one sample from the
/// integer part when the fraction falls below 0.5; the Thiran approximation
/// behaves best in that range. Delays below half a sample degenerate to the
/// plain one-sample latch (`alpha == 0`).
#[inline]
pub fn thiran_coefficients(delay: f32) -> (u32, f32) {
    if delay < 0.5 {
        (0, 0.0)
    } else {
        let mut integral = delay.floor();
        let mut fractional = delay - integral;
        if fractional < 0.5 {
            fractional += 1.0;
            integral -= 1.0;
        }
        (integral as u32, (1.0 - fractional) / (1.0 + fractional))
    }
}
