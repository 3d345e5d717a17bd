//! All-pass dispersion chain modelling frequency-dependent propagation speed.

#[allow(unused_imports)]
use num_traits::float::Float;

/// Number of all-pass stages in the chain.
pub const NUM_STAGES: usize = 8;

/// Cascade of identical first-order all-pass stages across parallel lanes.
///
/// Pure all-pass, so signal energy is preserved; only the phase response
/// changes, stretching the upper partials sharp of the harmonic series.
#[derive(Debug)]
pub struct DispersionChain<const LANES: usize> {
    lag1: [[f32; LANES]; NUM_STAGES],
    lag2: [[f32; LANES]; NUM_STAGES],
}

impl<const LANES: usize> Default for DispersionChain<LANES> {
    fn default() -> Self {
        Self {
            lag1: [[0.0; LANES]; NUM_STAGES],
            lag2: [[0.0; LANES]; NUM_STAGES],
        }
    }
}

impl<const LANES: usize> DispersionChain<LANES> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.lag1 = [[0.0; LANES]; NUM_STAGES];
        self.lag2 = [[0.0; LANES]; NUM_STAGES];
    }

    #[inline]
    pub fn tick(&mut self, x: &[f32; LANES], a1: &[f32; LANES]) -> [f32; LANES] {
        let mut x = *x;
        for stage in 0..NUM_STAGES {
            for i in 0..LANES {
                let y = self.lag1[stage][i] + a1[i] * (x[i] - self.lag2[stage][i]);
                self.lag1[stage][i] = x[i];
                self.lag2[stage][i] = y;
                x[i] = y;
            }
        }
        x
    }
}

/// Shared stage coefficient for a per-stage group delay `delay` in samples.
/// Delays below one sample disable the chain (coefficient 0).
#[inline]
pub fn stage_coefficient(delay: f32) -> f32 {
    if delay < 1.0 {
        0.0
    } else {
        (1.0 - delay) / (1.0 + delay)
    }
}

/// Phase delay in samples contributed by the whole cascade at angular
/// frequency `w`, evaluated from the stage response
/// `H(z) = (a1 * z + 1) / (z + a1)` on the unit circle.
#[inline]
pub fn phase_delay(a1: f32, w: f32) -> f32 {
    let (sin_w, cos_w) = w.sin_cos();
    let phase = (a1 * sin_w).atan2(1.0 + a1 * cos_w) - sin_w.atan2(cos_w + a1);
    -phase * NUM_STAGES as f32 / w
}
