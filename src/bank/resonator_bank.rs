//! Resonator bank orchestration and parameter derivation.

#[allow(unused_imports)]
use num_traits::float::Float;

use super::dispersion::{self, DispersionChain, NUM_STAGES};
use super::scattering::scatter;
use super::tuning::{thiran_coefficients, TuningFilter};
use super::NUM_RESONATORS;
use crate::utils::delay_line::LaneDelayLine;
use crate::utils::filter::{tpt_coefficient, OnePoleTpt};
use crate::utils::units::{db_to_gain, frequency_to_omega, pitch_to_frequency};

const NUM_CHANNELS: usize = 2;

/// Output taps below this level are muted entirely.
const MIX_FLOOR_DB: f32 = -60.0;

/// Decay times at or below this produce no sustain: the feedback gain is
/// forced to exactly 0 and the excitation decays as a single pluck.
const MIN_DECAY_MS: f32 = 0.5;

/// Fixed coefficient of the DC-blocking high-pass inside the feedback loop.
const DC_BLOCKER_COEFF: f32 = 0.0005;

/// Musical parameters of one resonator. Mutate through
/// [`ResonatorBank::params_mut`], then commit with
/// [`ResonatorBank::update_all_pitches`] or
/// [`ResonatorBank::update_basic_params`].
#[derive(Debug, Clone, Copy)]
pub struct ResonatorParams {
    /// Pitch in semitones (MIDI note numbering).
    pub pitch: f32,
    /// Fine tune in cents.
    pub fine_tune: f32,
    /// Dispersion (inharmonicity) amount, 0.0 - 1.0.
    pub dispersion: f32,
    /// Time for the resonance to decay by 60 dB, in milliseconds.
    pub decay_ms: f32,
    /// Cutoff pitch of the damping high-shelf, in semitones.
    pub damp_pitch: f32,
    /// Gain of the damping high-shelf in dB. 0 dB leaves the loop undamped.
    pub damp_gain_db: f32,
    /// Output tap level in dB. Levels below -60 dB mute the tap.
    pub mix_db: f32,
    /// Normalized reflection angle of this resonator's scattering junction,
    /// -1.0 - 1.0 (scaled by pi). 0 decouples the junction.
    pub reflection: f32,
    /// Inverts the feedback path and shifts the pitch up one octave.
    pub polarity: bool,
}

impl Default for ResonatorParams {
    fn default() -> Self {
        Self {
            pitch: 60.0,
            fine_tune: 0.0,
            dispersion: 0.0,
            decay_ms: 0.0,
            damp_pitch: 130.0,
            damp_gain_db: 0.0,
            mix_db: 0.0,
            reflection: 0.0,
            polarity: false,
        }
    }
}

/// Coefficients cached at control rate, one entry per resonator.
#[derive(Debug)]
struct Derived {
    delay_samples: [u32; NUM_RESONATORS],
    tuning_alpha: [f32; NUM_RESONATORS],
    dispersion_a1: [f32; NUM_RESONATORS],
    damp_coeff: [f32; NUM_RESONATORS],
    damp_gain: [f32; NUM_RESONATORS],
    feedback_gain: [f32; NUM_RESONATORS],
    input_level: [f32; NUM_RESONATORS],
    output_level: [f32; NUM_RESONATORS],
    scatter_sin: [f32; NUM_RESONATORS],
    scatter_cos: [f32; NUM_RESONATORS],
}

impl Default for Derived {
    fn default() -> Self {
        Self {
            delay_samples: [0; NUM_RESONATORS],
            tuning_alpha: [0.0; NUM_RESONATORS],
            dispersion_a1: [0.0; NUM_RESONATORS],
            damp_coeff: [0.0; NUM_RESONATORS],
            damp_gain: [1.0; NUM_RESONATORS],
            feedback_gain: [0.0; NUM_RESONATORS],
            input_level: [0.0; NUM_RESONATORS],
            output_level: [0.0; NUM_RESONATORS],
            scatter_sin: [0.0; NUM_RESONATORS],
            scatter_cos: [1.0; NUM_RESONATORS],
        }
    }
}

/// Waveguide state of one audio channel, all resonators in parallel lanes.
#[derive(Debug, Default)]
struct ChannelLanes {
    delay: LaneDelayLine<NUM_RESONATORS>,
    tuning: TuningFilter<NUM_RESONATORS>,
    dispersion: DispersionChain<NUM_RESONATORS>,
    damping: OnePoleTpt<NUM_RESONATORS>,
    dc_blocker: OnePoleTpt<NUM_RESONATORS>,
    feedback: [f32; NUM_RESONATORS],
}

impl ChannelLanes {
    fn reset(&mut self) {
        self.delay.reset();
        self.tuning.reset();
        self.dispersion.reset();
        self.damping.reset();
        self.dc_blocker.reset();
        self.feedback = [0.0; NUM_RESONATORS];
    }
}

/// Bank of coupled waveguide resonators, stereo in, stereo out.
///
/// [`ResonatorBank::init`] must run before streaming; it is the only
/// allocating call. [`ResonatorBank::process`] is allocation- and lock-free.
#[derive(Debug)]
pub struct ResonatorBank {
    sample_rate: f32,
    /// Dry input level mixed into the output, 0.0 - 1.0.
    pub dry: f32,
    params: [ResonatorParams; NUM_RESONATORS],
    derived: Derived,
    channels: [ChannelLanes; NUM_CHANNELS],
}

impl Default for ResonatorBank {
    fn default() -> Self {
        Self {
            sample_rate: 0.0,
            dry: 1.0,
            params: [ResonatorParams::default(); NUM_RESONATORS],
            derived: Derived::default(),
            channels: Default::default(),
        }
    }
}

impl ResonatorBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sizes the delay buffers for pitches down to `min_pitch` (semitones)
    /// and stores the sample rate. Allocates; call before streaming, never
    /// from the audio thread. Pitches played below `min_pitch` wrap the
    /// delay buffer and alias.
    pub fn init(&mut self, sample_rate: f32, min_pitch: f32) {
        self.sample_rate = sample_rate;
        let min_frequency = pitch_to_frequency(min_pitch);
        let max_samples = (sample_rate / min_frequency).ceil() as usize;
        for channel in self.channels.iter_mut() {
            channel.delay.resize(max_samples);
        }
    }

    /// Zeroes all audio state. Parameters and cached coefficients survive.
    pub fn reset(&mut self) {
        for channel in self.channels.iter_mut() {
            channel.reset();
        }
    }

    /// Length of the per-channel delay buffer, a power of two.
    pub fn delay_buffer_len(&self) -> usize {
        self.channels[0].delay.len()
    }

    pub fn params(&self, index: usize) -> &ResonatorParams {
        debug_assert!(index < NUM_RESONATORS);
        &self.params[index]
    }

    pub fn params_mut(&mut self, index: usize) -> &mut ResonatorParams {
        debug_assert!(index < NUM_RESONATORS);
        &mut self.params[index]
    }

    /// Signed feedback gain currently applied to one resonator's loop.
    pub fn feedback_gain(&self, index: usize) -> f32 {
        debug_assert!(index < NUM_RESONATORS);
        self.derived.feedback_gain[index]
    }

    /// Sets the pitch and input level of one resonator and recomputes its
    /// tuning, dispersion and feedback coefficients.
    pub fn note_on(&mut self, index: usize, pitch: f32, velocity: f32) {
        debug_assert!(index < NUM_RESONATORS);
        self.params[index].pitch = pitch;
        self.derived.input_level[index] = velocity;
        self.update_pitch(index);
    }

    /// Closes one resonator's input. The delay buffer and feedback keep
    /// ringing, so the tail decays without a discontinuity.
    pub fn note_off(&mut self, index: usize) {
        debug_assert!(index < NUM_RESONATORS);
        self.derived.input_level[index] = 0.0;
    }

    /// Opens or closes every resonator's input at once, e.g. when switching
    /// between audio-driven and note-driven operation.
    pub fn set_all_input_levels(&mut self, level: f32) {
        self.derived.input_level = [level; NUM_RESONATORS];
    }

    /// Recomputes tuning, dispersion and feedback coefficients for every
    /// resonator from the current parameters. Control rate only.
    pub fn update_all_pitches(&mut self) {
        for index in 0..NUM_RESONATORS {
            self.update_pitch(index);
        }
    }

    /// Recomputes output levels, scattering angles and damping coefficients
    /// from the current parameters. Control rate only.
    pub fn update_basic_params(&mut self) {
        for (i, p) in self.params.iter().enumerate() {
            self.derived.output_level[i] = if p.mix_db < MIX_FLOOR_DB {
                0.0
            } else {
                db_to_gain(p.mix_db)
            };

            let angle = p.reflection * core::f32::consts::PI;
            self.derived.scatter_sin[i] = angle.sin();
            self.derived.scatter_cos[i] = angle.cos();

            let cutoff = pitch_to_frequency(p.damp_pitch);
            self.derived.damp_coeff[i] =
                tpt_coefficient(frequency_to_omega(cutoff, self.sample_rate));
            self.derived.damp_gain[i] = db_to_gain(p.damp_gain_db);
        }
    }

    /// Runs the bank for a block of stereo samples, reading the excitation
    /// input from the buffers and replacing it with the output mix.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            *l = self.process_channel(0, *l);
            *r = self.process_channel(1, *r);
        }
    }

    fn update_pitch(&mut self, index: usize) {
        let p = &self.params[index];
        let mut pitch = p.pitch + p.fine_tune / 100.0;
        if p.polarity {
            pitch += 12.0;
        }
        let frequency = pitch_to_frequency(pitch);
        let omega = core::f32::consts::PI * frequency / self.sample_rate;
        let loop_samples = self.sample_rate / frequency;

        let stage_delay = loop_samples * p.dispersion / (NUM_STAGES as f32 + 0.1);
        let a1 = dispersion::stage_coefficient(stage_delay);
        self.derived.dispersion_a1[index] = a1;

        // The chain eats part of the loop period; only the rest goes to the
        // tuning filter.
        let residual = (loop_samples - dispersion::phase_delay(a1, omega)).max(0.0);
        let (delay, alpha) = thiran_coefficients(residual);
        self.derived.delay_samples[index] = delay;
        self.derived.tuning_alpha[index] = alpha;

        let mut gain = if p.decay_ms > MIN_DECAY_MS {
            let exponent = -3.0 * loop_samples / (self.sample_rate * p.decay_ms / 1000.0);
            10.0_f32.powf(exponent).min(1.0)
        } else {
            0.0
        };
        if p.polarity {
            gain = -gain;
        }
        self.derived.feedback_gain[index] = gain;
    }

    #[inline]
    fn process_channel(&mut self, channel: usize, x: f32) -> f32 {
        let derived = &self.derived;
        let lanes = &mut self.channels[channel];

        // Output and the new delay inputs both use the feedback carried over
        // from the previous sample.
        let mut out = self.dry * x;
        let mut frame = [0.0; NUM_RESONATORS];
        for i in 0..NUM_RESONATORS {
            out += lanes.feedback[i] * derived.output_level[i];
            frame[i] = derived.input_level[i] * x + lanes.feedback[i];
        }

        lanes.delay.write(frame);
        let delayed = lanes.delay.read(&derived.delay_samples);
        let tuned = lanes.tuning.tick(&delayed, &derived.tuning_alpha);
        let dispersed = lanes.dispersion.tick(&tuned, &derived.dispersion_a1);
        let damped =
            lanes
                .damping
                .tick_high_shelf(&dispersed, &derived.damp_coeff, &derived.damp_gain);
        let mut scattered = lanes.dc_blocker.tick_high_pass(&damped, DC_BLOCKER_COEFF);

        scatter(&mut scattered, &derived.scatter_sin, &derived.scatter_cos);

        for i in 0..NUM_RESONATORS {
            lanes.feedback[i] = derived.feedback_gain[i] * scattered[i];
        }

        out
    }
}
