//! Shared sample-buffer helpers.

/// Convert interleaved f32 samples to mono.
///
/// Handles both mono and multi-channel input:
/// - Mono: Returns a copy of the input
/// - Otherwise: Mixes channels by averaging each frame
///
/// # Arguments
/// * `data` - Raw f32 samples (interleaved for multi-channel)
/// * `channels` - Number of channels
///
/// # Returns
/// Vector of mono f32 samples
pub fn convert_to_mono(data: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        data.to_vec()
    } else {
        data.chunks(channels).map(|frame| frame.iter().sum::<f32>() / channels as f32).collect()
    }
}

/// Append `next` to `output`, keeping the time axis contiguous.
pub fn concatenate(output: &mut Vec<f32>, next: &[f32]) {
    output.reserve(next.len());
    output.extend_from_slice(next);
}
