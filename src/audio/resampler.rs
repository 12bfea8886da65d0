//! Output resampling using rubato's FFT-based resampler.

use anyhow::{Context, Result};
use audioadapter_buffers::direct::InterleavedSlice;
use rubato::{Fft, FixedSync, Resampler};

/// Chunk size for FFT-based resampling (provides good quality and performance).
const CHUNK_SIZE: usize = 1024;

/// Number of sub-chunks for FFT processing (higher = better quality but more CPU).
const SUB_CHUNKS: usize = 2;

/// Resample a whole mono buffer from one sample rate to another.
///
/// Used to write the synthesized waveform at a rate other than the model's
/// native one. The last chunk is zero-padded and the padding trimmed again.
///
/// # Arguments
/// * `samples` - Input audio samples
/// * `from_rate` - Input sample rate (the model's native rate)
/// * `to_rate` - Requested output sample rate
///
/// # Returns
/// Resampled audio samples at the target rate
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler = Fft::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        CHUNK_SIZE,
        SUB_CHUNKS,
        1, // mono
        FixedSync::Input,
    )
    .context("Failed to create resampler")?;

    let output_frames_max = resampler.output_frames_max();
    let mut output_buffer = vec![0.0f32; output_frames_max];

    let expected_len = (samples.len() as f64 * to_rate as f64 / from_rate as f64).round() as usize;
    let mut output = Vec::with_capacity(expected_len + output_frames_max);

    for chunk in samples.chunks(CHUNK_SIZE) {
        let mut input_chunk = chunk.to_vec();
        input_chunk.resize(CHUNK_SIZE, 0.0);

        let input_adapter = InterleavedSlice::new(&input_chunk, 1, CHUNK_SIZE).context("Failed to create input adapter")?;
        let mut output_adapter = InterleavedSlice::new_mut(&mut output_buffer, 1, output_frames_max).context("Failed to create output adapter")?;

        let (_, frames_written) = resampler
            .process_into_buffer(&input_adapter, &mut output_adapter, None)
            .map_err(|e| anyhow::anyhow!("Resampling error: {}", e))?;
        output.extend_from_slice(&output_buffer[..frames_written]);
    }

    output.resize(expected_len, 0.0);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_rate_is_identity() {
        let samples = vec![0.1, -0.2, 0.3];
        assert_eq!(resample(&samples, 24000, 24000).unwrap(), samples);
    }

    #[test]
    fn test_upsample_length() {
        // Chatterbox native 24kHz to 48kHz
        let samples = vec![0.0; 24000];
        let result = resample(&samples, 24000, 48000).unwrap();
        assert_eq!(result.len(), 48000);
    }

    #[test]
    fn test_downsample_length() {
        let samples = vec![0.0; 24000];
        let result = resample(&samples, 24000, 16000).unwrap();
        assert_eq!(result.len(), 16000);
    }

    #[test]
    fn test_empty_input() {
        assert!(resample(&[], 24000, 48000).unwrap().is_empty());
    }
}
