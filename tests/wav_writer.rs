//! Writer for WAV files

use std::path::Path;

use hound::*;

/// Writes stereo sample data as WAV file in 32-bit float format.
pub fn write(
    filename: impl AsRef<std::path::Path> + core::fmt::Display,
    sample_rate: u32,
    left: &[f32],
    right: &[f32],
) -> std::io::Result<()> {
    let path = format!("out/{filename}");
    let path = Path::new(path.as_str());

    // Create parent directories to the path if they don't exist.
    let parent = path.parent().unwrap();
    std::fs::create_dir_all(parent).ok();

    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();

    for (l, r) in left.iter().zip(right.iter()) {
        writer.write_sample(*l).unwrap();
        writer.write_sample(*r).unwrap();
    }

    Ok(())
}
