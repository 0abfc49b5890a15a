use crate::{AudioError, CoreResult};

use std::{io::Cursor, panic::Location, time::Duration};

use error_location::ErrorLocation;
use hound::WavReader;
use tracing::{debug, instrument, warn};

/// Bounded wait for duration metadata before falling back to the estimate.
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(3);

/// Rough encoded bytes per second used when metadata is unavailable.
pub const BYTES_PER_SECOND_ESTIMATE: f64 = 16_000.0;

/// Duration guess from payload size: `max(1, byte_len / 16000)` seconds.
pub fn estimate_duration(byte_len: usize) -> f64 {
    (byte_len as f64 / BYTES_PER_SECOND_ESTIMATE).max(1.0)
}

/// Read the duration recorded in a WAV payload's header.
///
/// # Errors
///
/// `MetadataUnavailable` if the header cannot be parsed or yields a
/// non-finite or negative duration.
#[track_caller]
pub fn read_duration(payload: &[u8]) -> CoreResult<f64> {
    let reader =
        WavReader::new(Cursor::new(payload)).map_err(|e| AudioError::MetadataUnavailable {
            reason: format!("Failed to read WAV header: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let sample_rate = reader.spec().sample_rate;
    if sample_rate == 0 {
        return Err(AudioError::MetadataUnavailable {
            reason: "Sample rate is zero".to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let seconds = f64::from(reader.duration()) / f64::from(sample_rate);

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(AudioError::MetadataUnavailable {
            reason: format!("Invalid duration: {}", seconds),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Ok(seconds)
}

/// Payload duration in seconds, never failing.
///
/// Reads the header off the event loop and waits at most `timeout`; any
/// failure or timeout falls back to [`estimate_duration`].
#[instrument(skip(payload), fields(byte_len = payload.len()))]
pub async fn measure_duration(payload: &[u8], timeout: Duration) -> f64 {
    let byte_len = payload.len();
    let owned = payload.to_vec();

    let measured = tokio::time::timeout(
        timeout,
        tokio::task::spawn_blocking(move || read_duration(&owned)),
    )
    .await;

    match measured {
        Ok(Ok(Ok(seconds))) => {
            debug!(duration_secs = seconds, "Duration read from metadata");
            seconds
        }
        Ok(Ok(Err(e))) => {
            warn!(error = ?e, "Duration metadata unavailable, estimating from size");
            estimate_duration(byte_len)
        }
        Ok(Err(e)) => {
            warn!(error = ?e, "Duration measure task failed, estimating from size");
            estimate_duration(byte_len)
        }
        Err(_) => {
            warn!(
                timeout_ms = timeout.as_millis(),
                "Duration measure timed out, estimating from size"
            );
            estimate_duration(byte_len)
        }
    }
}
