//! Masked multi-lane delay line.

use alloc::vec;
use alloc::vec::Vec;

/// Circular buffer storing one frame of `LANES` parallel samples per slot.
///
/// The length is always a power of two so positions wrap with a mask instead
/// of a modulo. Each lane reads at its own integer delay while all lanes
/// share the write cursor.
#[derive(Debug, Default)]
pub struct LaneDelayLine<const LANES: usize> {
    line: Vec<[f32; LANES]>,
    write_pos: u32,
    mask: u32,
}

impl<const LANES: usize> LaneDelayLine<LANES> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates at least `min_samples` slots, rounded up to a power of two.
    /// Not safe to call while streaming.
    pub fn resize(&mut self, min_samples: usize) {
        let len = min_samples.next_power_of_two();
        self.line = vec![[0.0; LANES]; len];
        self.mask = (len - 1) as u32;
        self.write_pos = 0;
    }

    pub fn reset(&mut self) {
        for frame in self.line.iter_mut() {
            *frame = [0.0; LANES];
        }
        self.write_pos = 0;
    }

    pub fn len(&self) -> usize {
        self.line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    /// Writes one frame at the cursor and advances it.
    #[inline]
    pub fn write(&mut self, frame: [f32; LANES]) {
        self.line[self.write_pos as usize] = frame;
        self.write_pos = (self.write_pos + 1) & self.mask;
    }

    /// Reads every lane at its own integer delay. A delay of 0 addresses the
    /// most recently written frame.
    #[inline]
    pub fn read(&self, delays: &[u32; LANES]) -> [f32; LANES] {
        let mut out = [0.0; LANES];
        for (lane, sample) in out.iter_mut().enumerate() {
            let pos = self
                .write_pos
                .wrapping_add(self.mask)
                .wrapping_sub(delays[lane])
                & self.mask;
            *sample = self.line[pos as usize][lane];
        }
        out
    }
}
