//! Renders a strummed chord across the resonator bank to a WAV file.

use simple_logger::SimpleLogger;

use waveguide_bank::bank::{ResonatorBank, NUM_RESONATORS};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZE: usize = 64;

fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .unwrap();

    // A minor add9, low to high.
    let notes = [45.0, 52.0, 57.0, 60.0, 64.0, 69.0, 72.0, 76.0];

    let mut bank = ResonatorBank::new();
    bank.init(SAMPLE_RATE, 0.0);
    bank.dry = 0.0;
    for i in 0..NUM_RESONATORS {
        let params = bank.params_mut(i);
        params.decay_ms = 1500.0;
        params.mix_db = -6.0;
        params.damp_pitch = 110.0;
        params.damp_gain_db = -4.0;
        params.dispersion = 0.2;
        params.reflection = 0.05;
    }
    bank.update_basic_params();

    let duration = 4.0;
    let strum_interval = 0.12;
    let num_samples = (duration * SAMPLE_RATE) as usize;
    let mut left = Vec::with_capacity(num_samples);
    let mut right = Vec::with_capacity(num_samples);

    let mut next_note = 0;
    for block_start in (0..num_samples).step_by(BLOCK_SIZE) {
        let mut block_l = [0.0; BLOCK_SIZE];
        let mut block_r = [0.0; BLOCK_SIZE];

        if next_note < NUM_RESONATORS {
            let strum_sample = (next_note as f32 * strum_interval * SAMPLE_RATE) as usize;
            if strum_sample < block_start + BLOCK_SIZE {
                let offset = strum_sample.saturating_sub(block_start);
                bank.note_on(next_note, notes[next_note], 1.0);
                block_l[offset] = 0.8;
                block_r[offset] = 0.8;
                log::info!("note_on {next_note}: pitch {}", notes[next_note]);
                next_note += 1;
            }
        }

        bank.process(&mut block_l, &mut block_r);
        left.extend_from_slice(&block_l);
        right.extend_from_slice(&block_r);
    }

    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE as u32,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let path = "out/render_pluck.wav";
    std::fs::create_dir_all("out").ok();
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for (l, r) in left.iter().zip(right.iter()) {
        writer.write_sample(*l).unwrap();
        writer.write_sample(*r).unwrap();
    }
    writer.finalize().unwrap();
    log::info!("wrote {path}");
}
