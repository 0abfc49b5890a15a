use crate::{AudioError, CoreResult};

use std::panic::Location;

use audioadapter_buffers::direct::InterleavedSlice;
use error_location::ErrorLocation;
use rubato::{Fft, FixedSync, Resampler as RubatoResampler};
use tracing::{debug, instrument};

/// Upper bound on zero chunks fed by [`Resampler::flush`] to drain the filter.
const MAX_FLUSH_CHUNKS: usize = 16;

/// Streaming mono sample-rate converter.
///
/// Input arrives in arbitrary timeslice-sized blocks; only whole
/// `chunk_size` blocks reach rubato until [`Resampler::flush`] pads the tail.
/// The filter's leading delay is dropped from the output, so output sample
/// `n` lines up with input time `n / output_rate`.
pub struct Resampler {
    resampler: Fft<f32>,
    input_rate: u32,
    output_rate: u32,
    chunk_size: usize,
    pending: Vec<f32>,
    delay_remaining: usize,
    total_input: usize,
    total_output: usize,
}

impl Resampler {
    #[track_caller]
    #[instrument]
    pub fn new(input_rate: u32, output_rate: u32) -> CoreResult<Self> {
        let chunk_size = 1024;
        let sub_chunks = 2; // Sub-chunks for processing

        let resampler = Fft::<f32>::new(
            input_rate as usize,  // sample_rate_input
            output_rate as usize, // sample_rate_output
            chunk_size,           // chunk_size
            sub_chunks,           // sub_chunks
            1,                    // nbr_channels (mono)
            FixedSync::Input,     // fixed
        )
        .map_err(|e| AudioError::ResamplingError {
            reason: format!("Failed to create resampler: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let output_delay = resampler.output_delay();

        debug!(
            input_rate = input_rate,
            output_rate = output_rate,
            chunk_size = chunk_size,
            output_delay = output_delay,
            "Resampler initialized"
        );

        Ok(Self {
            resampler,
            input_rate,
            output_rate,
            chunk_size,
            pending: Vec::with_capacity(chunk_size * 2),
            delay_remaining: output_delay,
            total_input: 0,
            total_output: 0,
        })
    }

    /// Feed a block of input and return whatever output is ready.
    #[track_caller]
    pub fn push(&mut self, samples: &[f32]) -> CoreResult<Vec<f32>> {
        self.total_input += samples.len();
        self.pending.extend_from_slice(samples);

        let mut output = Vec::new();
        let mut offset = 0;

        while self.pending.len() - offset >= self.chunk_size {
            let chunk = self.pending[offset..offset + self.chunk_size].to_vec();
            self.process_chunk(&chunk, &mut output)?;
            offset += self.chunk_size;
        }

        self.pending.drain(..offset);
        self.total_output += output.len();

        Ok(output)
    }

    /// Zero-pad the remaining input and push silence through the filter until
    /// every input sample has come out, then drop the padding's output.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn flush(&mut self) -> CoreResult<Vec<f32>> {
        let mut output = Vec::new();

        let expected_total = (self.total_input as f64 * self.output_rate as f64
            / self.input_rate as f64) as usize;
        let remaining = expected_total.saturating_sub(self.total_output);

        if !self.pending.is_empty() {
            let mut padded = std::mem::take(&mut self.pending);
            padded.resize(self.chunk_size, 0.0);
            self.process_chunk(&padded, &mut output)?;
        }

        let silence = vec![0.0f32; self.chunk_size];
        for _ in 0..MAX_FLUSH_CHUNKS {
            if output.len() >= remaining {
                break;
            }
            self.process_chunk(&silence, &mut output)?;
        }

        output.truncate(remaining);
        self.total_output += output.len();

        debug!(
            input_len = self.total_input,
            output_len = self.total_output,
            input_rate = self.input_rate,
            output_rate = self.output_rate,
            "Resampler flushed"
        );

        Ok(output)
    }

    #[track_caller]
    fn process_chunk(&mut self, chunk: &[f32], output: &mut Vec<f32>) -> CoreResult<()> {
        // Create adapter for input (frames, channels)
        let input_adapter = InterleavedSlice::new(chunk, 1, self.chunk_size).map_err(|e| {
            AudioError::ResamplingError {
                reason: format!("Failed to create input adapter: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        let output_frames = self.resampler.output_frames_max();
        let mut output_chunk = vec![0.0f32; output_frames];

        let mut output_adapter = InterleavedSlice::new_mut(&mut output_chunk, 1, output_frames)
            .map_err(|e| AudioError::ResamplingError {
                reason: format!("Failed to create output adapter: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let (_input_frames, output_frames_written) = self
            .resampler
            .process_into_buffer(&input_adapter, &mut output_adapter, None)
            .map_err(|e| AudioError::ResamplingError {
                reason: format!("Resampling failed: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let skip = self.delay_remaining.min(output_frames_written);
        self.delay_remaining -= skip;
        output.extend_from_slice(&output_chunk[skip..output_frames_written]);

        Ok(())
    }
}
