use crate::{AudioError, CoreResult, audio::Resampler};

use std::{io::Cursor, panic::Location};

use error_location::ErrorLocation;
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{debug, instrument};

/// Buffers timeslice chunks of 16-bit PCM at the storage rate and wraps them
/// in a WAV container on [`PcmEncoder::finish`].
pub struct PcmEncoder {
    resampler: Option<Resampler>,
    storage_rate: u32,
    samples: Vec<i16>,
    chunk_count: usize,
}

impl PcmEncoder {
    /// Create an encoder converting from `input_rate` to `storage_rate`.
    #[track_caller]
    #[instrument]
    pub fn new(input_rate: u32, storage_rate: u32) -> CoreResult<Self> {
        let resampler = if input_rate != storage_rate {
            Some(Resampler::new(input_rate, storage_rate)?)
        } else {
            None
        };

        Ok(Self {
            resampler,
            storage_rate,
            samples: Vec::new(),
            chunk_count: 0,
        })
    }

    /// Encode one timeslice of input samples. Returns the bytes added.
    #[track_caller]
    pub fn push_chunk(&mut self, chunk: &[f32]) -> CoreResult<usize> {
        if chunk.is_empty() {
            return Ok(0);
        }

        let converted = match self.resampler.as_mut() {
            Some(resampler) => resampler.push(chunk)?,
            None => chunk.to_vec(),
        };

        self.append(&converted);
        self.chunk_count += 1;

        Ok(converted.len() * 2)
    }

    /// Number of samples encoded so far.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when nothing has been encoded.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Flush the resampler tail and produce the WAV payload.
    ///
    /// Returns `None` when no audio was ever captured.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn finish(mut self) -> CoreResult<Option<Vec<u8>>> {
        if let Some(resampler) = self.resampler.as_mut() {
            let tail = resampler.flush()?;
            self.append(&tail);
        }

        if self.samples.is_empty() {
            debug!("No audio captured, skipping container");
            return Ok(None);
        }

        let spec = WavSpec {
            channels: 1,
            sample_rate: self.storage_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::with_capacity(44 + self.samples.len() * 2));

        {
            let mut writer =
                WavWriter::new(&mut cursor, spec).map_err(|e| AudioError::EncodingError {
                    reason: format!("Failed to create WAV writer: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            for &sample in &self.samples {
                writer
                    .write_sample(sample)
                    .map_err(|e| AudioError::EncodingError {
                        reason: format!("Failed to write sample: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?;
            }

            writer.finalize().map_err(|e| AudioError::EncodingError {
                reason: format!("Failed to finalize WAV: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;
        }

        let payload = cursor.into_inner();

        debug!(
            chunk_count = self.chunk_count,
            sample_count = self.samples.len(),
            byte_len = payload.len(),
            "Payload encoded"
        );

        Ok(Some(payload))
    }

    fn append(&mut self, samples: &[f32]) {
        self.samples.extend(
            samples
                .iter()
                .map(|&s| (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16),
        );
    }
}
