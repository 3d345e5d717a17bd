//! Lossless scattering ring exchanging energy between resonators.

use super::NUM_RESONATORS;

/// Junctions of the first rotation stage: lanes paired within each group.
pub const INNER_JUNCTIONS: [[usize; 2]; NUM_RESONATORS / 2] =
    [[0, 1], [2, 3], [4, 5], [6, 7]];

/// Junctions of the second stage: neighboring pairs offset by one lane, with
/// the last junction wrapping back to lane 0 and closing the ring.
pub const OUTER_JUNCTIONS: [[usize; 2]; NUM_RESONATORS / 2] =
    [[1, 2], [3, 4], [5, 6], [7, 0]];

/// Redistributes energy between the lanes of one channel.
///
/// Each junction applies a Givens rotation, `a' = cos * a - sin * b` and
/// `b' = sin * a + cos * b`, so `a'^2 + b'^2 == a^2 + b^2` holds per junction
/// and the network as a whole is lossless. The two stages give every
/// resonator an exchange path with both of its ring neighbors (lane i
/// couples with i +/- 1 mod 8). Inner junction k rotates by the angle of
/// reflection k, outer junction k by the angle of reflection k + 4; `sin`
/// and `cos` hold those angles in reflection order. Lanes stay in index
/// order throughout.
#[inline]
pub fn scatter(
    lanes: &mut [f32; NUM_RESONATORS],
    sin: &[f32; NUM_RESONATORS],
    cos: &[f32; NUM_RESONATORS],
) {
    for (k, &[i, j]) in INNER_JUNCTIONS.iter().enumerate() {
        rotate(lanes, i, j, sin[k], cos[k]);
    }
    for (k, &[i, j]) in OUTER_JUNCTIONS.iter().enumerate() {
        rotate(lanes, i, j, sin[NUM_RESONATORS / 2 + k], cos[NUM_RESONATORS / 2 + k]);
    }
}

#[inline]
fn rotate(lanes: &mut [f32; NUM_RESONATORS], i: usize, j: usize, sin: f32, cos: f32) {
    let a = lanes[i];
    let b = lanes[j];
    lanes[i] = cos * a - sin * b;
    lanes[j] = sin * a + cos * b;
}
