use crate::{CoreResult, payload::decode_wav};

use tracing::{debug, instrument};

/// Envelope length attached to saved notes.
pub const NOTE_ENVELOPE_POINTS: usize = 100;

/// Fixed-length normalized amplitude envelope of a mono buffer.
///
/// The buffer is cut into `points` contiguous blocks of `max(1, len / points)`
/// samples. When `len` is not a multiple of `points` the trailing partial
/// block is dropped; when `len < points` the blocks past the end are empty
/// and read as 0. Each block contributes its mean absolute amplitude, and the
/// result is scaled so the loudest block is exactly 1.0. Silent input yields
/// all zeros. Runs in O(len).
pub fn summarize(samples: &[f32], points: usize) -> Vec<f32> {
    if points == 0 {
        return Vec::new();
    }

    let block_size = (samples.len() / points).max(1);

    let means: Vec<f32> = (0..points)
        .map(|i| {
            let start = i * block_size;
            if start >= samples.len() {
                return 0.0;
            }
            let end = (start + block_size).min(samples.len());
            let block = &samples[start..end];
            block.iter().map(|s| s.abs()).sum::<f32>() / block.len() as f32
        })
        .collect();

    let max = means.iter().copied().fold(0.0f32, f32::max);

    if max > 0.0 {
        means.into_iter().map(|m| m / max).collect()
    } else {
        vec![0.0; points]
    }
}

/// Decode a WAV payload and summarize its first channel.
///
/// # Errors
///
/// `DecodeFailure` when the payload is not a readable WAV container.
#[track_caller]
#[instrument(skip(payload), fields(byte_len = payload.len()))]
pub fn envelope_from_payload(payload: &[u8], points: usize) -> CoreResult<Vec<f32>> {
    let decoded = decode_wav(payload)?;
    let envelope = summarize(&decoded.samples, points);

    debug!(
        sample_count = decoded.samples.len(),
        points, "Envelope computed"
    );

    Ok(envelope)
}
