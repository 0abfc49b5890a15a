use crate::{AudioError, CoreResult};

use std::{io::Cursor, panic::Location};

use error_location::ErrorLocation;
use hound::{SampleFormat, WavReader};

/// First channel of a decoded payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Sample rate of the payload.
    pub sample_rate: u32,
    /// Channel count of the payload (only the first is kept).
    pub channels: u16,
    /// First-channel samples in [-1, 1].
    pub samples: Vec<f32>,
}

/// Decode a WAV payload into normalized first-channel samples.
///
/// # Errors
///
/// `DecodeFailure` for anything that is not a readable PCM or float WAV.
#[track_caller]
pub fn decode_wav(payload: &[u8]) -> CoreResult<DecodedAudio> {
    let reader = WavReader::new(Cursor::new(payload)).map_err(|e| AudioError::DecodeFailure {
        reason: format!("Failed to read WAV header: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| AudioError::DecodeFailure {
                reason: format!("Failed to read float samples: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?,
        SampleFormat::Int => {
            let scale = (1u64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(|e| AudioError::DecodeFailure {
                    reason: format!("Failed to read integer samples: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?
        }
    };

    let samples = interleaved.into_iter().step_by(channels).collect();

    Ok(DecodedAudio {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        samples,
    })
}
