//! Musical unit conversions.

#[allow(unused_imports)]
use num_traits::float::Float;

const A4_PITCH: f32 = 69.0;
const A4_FREQUENCY: f32 = 440.0;

/// Frequency in Hz of a pitch in semitones (MIDI note numbering, A4 = 440 Hz).
#[inline]
pub fn pitch_to_frequency(pitch: f32) -> f32 {
    A4_FREQUENCY * ((pitch - A4_PITCH) / 12.0).exp2()
}

/// Linear amplitude of a level in dB.
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Angular frequency in radians per sample.
#[inline]
pub fn frequency_to_omega(frequency: f32, sample_rate: f32) -> f32 {
    2.0 * core::f32::consts::PI * frequency / sample_rate
}
