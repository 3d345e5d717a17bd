//! Zero-delay-feedback one-pole filter, processed across parallel lanes.

#[allow(unused_imports)]
use num_traits::float::Float;

/// Coefficient of a TPT one-pole for a cutoff at angular frequency `w`
/// (radians per sample). Out-of-range cutoffs clamp to a fully open or fully
/// closed filter.
#[inline]
pub fn tpt_coefficient(w: f32) -> f32 {
    const MAX_W: f32 = core::f32::consts::PI - 1e-5;
    if w < 0.0 {
        0.0
    } else if w > MAX_W {
        1.0
    } else {
        let k = (w / 2.0).tan();
        k / (1.0 + k)
    }
}

/// TPT one-pole over `LANES` parallel signals, one history cell per lane.
///
/// Coefficients are passed per tick so the same state can serve lanes that
/// are retuned at control rate.
#[derive(Debug)]
pub struct OnePoleTpt<const LANES: usize> {
    lag: [f32; LANES],
}

impl<const LANES: usize> Default for OnePoleTpt<LANES> {
    fn default() -> Self {
        Self { lag: [0.0; LANES] }
    }
}

impl<const LANES: usize> OnePoleTpt<LANES> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.lag = [0.0; LANES];
    }

    #[inline]
    pub fn tick_low_pass(&mut self, x: &[f32; LANES], coeff: &[f32; LANES]) -> [f32; LANES] {
        let mut out = [0.0; LANES];
        for i in 0..LANES {
            let delta = coeff[i] * (x[i] - self.lag[i]);
            self.lag[i] += delta;
            out[i] = self.lag[i];
            self.lag[i] += delta;
        }
        out
    }

    /// High-pass with a single coefficient shared by all lanes.
    #[inline]
    pub fn tick_high_pass(&mut self, x: &[f32; LANES], coeff: f32) -> [f32; LANES] {
        let mut out = [0.0; LANES];
        for i in 0..LANES {
            let delta = coeff * (x[i] - self.lag[i]);
            self.lag[i] += delta;
            let lp = self.lag[i];
            self.lag[i] += delta;
            out[i] = x[i] - lp;
        }
        out
    }

    /// High-shelf built from the low-pass split: `lp + gain * (x - lp)`.
    #[inline]
    pub fn tick_high_shelf(
        &mut self,
        x: &[f32; LANES],
        coeff: &[f32; LANES],
        gain: &[f32; LANES],
    ) -> [f32; LANES] {
        let mut out = self.tick_low_pass(x, coeff);
        for i in 0..LANES {
            out[i] += gain[i] * (x[i] - out[i]);
        }
        out
    }
}
