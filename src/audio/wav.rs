//! WAV encoding and decoding.

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use super::util::convert_to_mono;

/// Decoded mono audio together with its sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Speech {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Speech {
    /// Length of the audio in seconds.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Decode an in-memory WAV stream into mono f32 samples.
///
/// Integer PCM of any bit depth hound supports is scaled to [-1.0, 1.0];
/// float PCM is passed through. Multi-channel audio is mixed down.
///
/// # Errors
/// Returns an error if the bytes are not a WAV stream or a sample cannot be read.
pub fn decode_wav(bytes: &[u8]) -> Result<Speech> {
    let mut reader = WavReader::new(Cursor::new(bytes)).context("Failed to parse WAV header")?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>().context("Failed to read float samples")?,
        SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .context("Failed to read integer samples")?
        }
    };

    let samples = convert_to_mono(&interleaved, spec.channels.max(1) as usize);
    Ok(Speech { samples, sample_rate: spec.sample_rate })
}

/// Save audio samples to a 16-bit mono WAV file.
///
/// # Arguments
/// * `samples` - Audio samples in range [-1.0, 1.0]
/// * `path` - Output file path
/// * `sample_rate` - Sample rate in Hz
pub fn save_wav(samples: &[f32], path: &Path, sample_rate: u32) -> Result<()> {
    let spec = WavSpec { channels: 1, sample_rate, bits_per_sample: 16, sample_format: SampleFormat::Int };

    let mut writer = WavWriter::create(path, spec).with_context(|| format!("Failed to create WAV file {}", path.display()))?;

    for &sample in samples {
        let int_sample = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(int_sample).context("Failed to write sample")?;
    }

    writer.finalize().context("Failed to finalize WAV file")?;
    Ok(())
}
