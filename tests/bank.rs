//! Tests for the resonator bank

mod wav_writer;

use waveguide_bank::bank::{ResonatorBank, NUM_RESONATORS};

const SAMPLE_RATE: f32 = 48000.0;

fn rms(samples: &[f32]) -> f32 {
    (samples.iter().map(|x| x * x).sum::<f32>() / samples.len() as f32).sqrt()
}

/// Bank with every tap muted and every input closed, resonance only.
fn silent_bank() -> ResonatorBank {
    let mut bank = ResonatorBank::new();
    bank.init(SAMPLE_RATE, 0.0);
    bank.dry = 0.0;
    for i in 0..NUM_RESONATORS {
        bank.params_mut(i).mix_db = -61.0;
    }
    bank
}

#[test]
fn init_sizes_delay_buffer_to_a_power_of_two() {
    let mut bank = ResonatorBank::new();
    bank.init(48000.0, 0.0);
    // Lowest supported pitch 0 is 8.18 Hz: 5871 samples, rounded up to 8192.
    assert_eq!(bank.delay_buffer_len(), 8192);

    bank.init(48000.0, 20.0);
    assert_eq!(bank.delay_buffer_len(), 2048);
    assert!(bank.delay_buffer_len().is_power_of_two());
}

#[test]
fn short_decay_forces_feedback_gain_to_zero() {
    let mut bank = silent_bank();

    bank.params_mut(0).decay_ms = 0.5;
    bank.update_all_pitches();
    assert_eq!(bank.feedback_gain(0), 0.0);

    bank.params_mut(0).decay_ms = 0.51;
    bank.update_all_pitches();
    assert!(bank.feedback_gain(0) > 0.0);
    assert!(bank.feedback_gain(0) <= 1.0);
}

#[test]
fn polarity_inverts_the_feedback_path() {
    let mut bank = silent_bank();
    bank.params_mut(0).decay_ms = 1000.0;
    bank.params_mut(0).polarity = true;
    bank.update_all_pitches();
    assert!(bank.feedback_gain(0) < 0.0);
    assert!(bank.feedback_gain(0) >= -1.0);
}

#[test]
fn impulse_decays_sixty_db_in_decay_time() {
    let mut bank = silent_bank();
    bank.params_mut(0).mix_db = 0.0;
    bank.params_mut(0).decay_ms = 1000.0;
    bank.update_basic_params();
    bank.note_on(0, 69.0, 1.0);

    let len = 60000;
    let mut left = vec![0.0; len];
    let mut right = vec![0.0; len];
    left[0] = 1.0;
    right[0] = 1.0;
    bank.process(&mut left, &mut right);

    let early = rms(&left[..2048]);
    let late = rms(&left[48000..50048]);
    assert!(early > 0.0);
    let drop_db = 20.0 * (late / early).log10();
    // The DC blocker adds a few dB of loss per second on top of the feedback
    // gain, and the envelope windows quantize the measurement.
    assert!(drop_db < -55.0 && drop_db > -68.0, "drop was {drop_db} dB");

    wav_writer::write("bank/pluck_a440.wav", SAMPLE_RATE as u32, &left, &right).ok();
}

#[test]
fn note_off_leaves_the_tail_untouched() {
    let make = || {
        let mut bank = silent_bank();
        bank.params_mut(3).mix_db = 0.0;
        bank.params_mut(3).decay_ms = 800.0;
        bank.update_basic_params();
        bank.note_on(3, 57.0, 1.0);
        let mut left = vec![0.0; 1024];
        let mut right = vec![0.0; 1024];
        left[0] = 1.0;
        right[0] = 1.0;
        bank.process(&mut left, &mut right);
        bank
    };

    let mut held = make();
    let mut released = make();
    released.note_off(3);

    // The input is silent from here on, so zeroing the input level must not
    // change a single sample of the tail.
    let mut left_a = vec![0.0; 4096];
    let mut right_a = vec![0.0; 4096];
    let mut left_b = vec![0.0; 4096];
    let mut right_b = vec![0.0; 4096];
    held.process(&mut left_a, &mut right_a);
    released.process(&mut left_b, &mut right_b);

    assert!(rms(&left_a) > 0.0);
    assert_eq!(left_a, left_b);
    assert_eq!(right_a, right_b);
}

#[test]
fn reflection_couples_neighboring_resonators() {
    let render = |reflection: f32| {
        let mut bank = silent_bank();
        // Resonator 0 is excited, only resonator 1's tap is open: any output
        // energy must have crossed the scattering junction between them.
        bank.params_mut(0).decay_ms = 1000.0;
        bank.params_mut(1).decay_ms = 1000.0;
        bank.params_mut(1).mix_db = 0.0;
        bank.params_mut(0).reflection = reflection;
        bank.update_all_pitches();
        bank.update_basic_params();
        bank.note_on(0, 69.0, 1.0);

        let mut left = vec![0.0; 4800];
        let mut right = vec![0.0; 4800];
        left[0] = 1.0;
        right[0] = 1.0;
        bank.process(&mut left, &mut right);
        left
    };

    let decoupled = render(0.0);
    assert!(decoupled.iter().all(|x| *x == 0.0));

    let coupled = render(0.25);
    assert!(rms(&coupled) > 1e-6);
}

#[test]
fn damping_shelf_speeds_up_the_decay() {
    let render = |damp_gain_db: f32| {
        let mut bank = silent_bank();
        bank.params_mut(0).mix_db = 0.0;
        bank.params_mut(0).decay_ms = 1000.0;
        bank.params_mut(0).damp_pitch = 90.0;
        bank.params_mut(0).damp_gain_db = damp_gain_db;
        bank.update_basic_params();
        bank.note_on(0, 69.0, 1.0);

        let mut left = vec![0.0; 48000];
        let mut right = vec![0.0; 48000];
        left[0] = 1.0;
        right[0] = 1.0;
        bank.process(&mut left, &mut right);
        left
    };

    let undamped = render(0.0);
    let damped = render(-12.0);
    let tail = 40000..48000;
    assert!(rms(&damped[tail.clone()]) < rms(&undamped[tail]));
}

#[test]
fn all_inputs_can_be_opened_for_audio_drive() {
    let mut bank = silent_bank();
    for i in 0..NUM_RESONATORS {
        bank.params_mut(i).mix_db = 0.0;
        bank.params_mut(i).decay_ms = 500.0;
    }
    bank.update_all_pitches();
    bank.update_basic_params();
    bank.set_all_input_levels(1.0);

    let mut left = vec![0.0; 4800];
    let mut right = vec![0.0; 4800];
    left[0] = 1.0;
    right[0] = 1.0;
    bank.process(&mut left, &mut right);
    assert!(rms(&left) > 1e-4);

    // Closing the inputs again mutes new excitation but not the tails.
    bank.set_all_input_levels(0.0);
    let mut left2 = vec![0.0; 4800];
    let mut right2 = vec![0.0; 4800];
    left2[0] = 1.0;
    bank.process(&mut left2, &mut right2);
    assert!(rms(&left2) > 0.0);
}

#[test]
fn dispersion_stretches_the_partials() {
    let render = |dispersion: f32| {
        let mut bank = silent_bank();
        bank.params_mut(0).mix_db = 0.0;
        bank.params_mut(0).decay_ms = 2000.0;
        bank.params_mut(0).dispersion = dispersion;
        bank.update_basic_params();
        bank.note_on(0, 45.0, 1.0);

        let mut left = vec![0.0; 48000];
        let mut right = vec![0.0; 48000];
        left[0] = 1.0;
        right[0] = 1.0;
        bank.process(&mut left, &mut right);
        left
    };

    let harmonic = render(0.0);
    let inharmonic = render(0.8);
    assert!(rms(&harmonic) > 0.0);
    assert!(rms(&inharmonic) > 0.0);
    // Same total delay budget, different phase response: the waveforms must
    // diverge while neither one blows up.
    let diff: f32 = harmonic
        .iter()
        .zip(inharmonic.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f32::max);
    assert!(diff > 1e-3);
    assert!(harmonic.iter().all(|x| x.abs() < 10.0));
    assert!(inharmonic.iter().all(|x| x.abs() < 10.0));

    wav_writer::write("bank/dispersion_a110.wav", SAMPLE_RATE as u32, &inharmonic, &inharmonic)
        .ok();
}
