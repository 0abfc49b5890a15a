use crate::{
    CoreResult,
    audio::{CaptureConstraints, DeviceProvider, InputDevice, PcmEncoder},
};

use tracing::{debug, info, instrument, warn};

/// A microphone stream plus the encoder buffering its timeslices.
///
/// Owns the device exclusively for one recording. [`CaptureSession::close`]
/// is idempotent and also runs on drop, so the device is released on every
/// exit path including failed finalization.
pub struct CaptureSession<D: InputDevice> {
    device: Option<D>,
    encoder: Option<PcmEncoder>,
    paused: bool,
}

impl<D: InputDevice> CaptureSession<D> {
    /// Acquire the microphone and prepare an encoder at `storage_rate`.
    #[track_caller]
    #[instrument(skip(provider))]
    pub fn open<P>(
        provider: &P,
        constraints: &CaptureConstraints,
        storage_rate: u32,
    ) -> CoreResult<Self>
    where
        P: DeviceProvider<Input = D>,
    {
        let device = provider.acquire(constraints)?;
        let input_rate = device.sample_rate();

        let mut session = Self {
            device: Some(device),
            encoder: None,
            paused: false,
        };

        // On failure `session` drops here and releases the device.
        session.encoder = Some(PcmEncoder::new(input_rate, storage_rate)?);

        info!(input_rate, storage_rate, "Capture session opened");

        Ok(session)
    }

    /// True until [`CaptureSession::close`] has run.
    pub fn is_open(&self) -> bool {
        self.device.is_some()
    }

    /// True while collection is suspended.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Suspend collection. Samples captured before the pause are encoded first.
    #[instrument(skip(self))]
    pub fn pause(&mut self) -> CoreResult<()> {
        if self.paused || !self.is_open() {
            return Ok(());
        }

        self.collect()?;

        if let Some(device) = self.device.as_mut() {
            device.pause()?;
        }

        self.paused = true;
        debug!("Capture paused");

        Ok(())
    }

    /// Resume collection after [`CaptureSession::pause`].
    #[instrument(skip(self))]
    pub fn resume(&mut self) -> CoreResult<()> {
        if !self.paused {
            return Ok(());
        }

        if let Some(device) = self.device.as_mut() {
            device.resume()?;

            // Anything a backend delivered while paused is not part of the memo.
            match device.drain() {
                Ok(stale) if !stale.is_empty() => {
                    debug!(sample_count = stale.len(), "Discarded samples captured while paused");
                }
                Ok(_) => {}
                Err(e) => warn!(error = ?e, "Failed to discard samples captured while paused"),
            }
        }

        self.paused = false;
        debug!("Capture resumed");

        Ok(())
    }

    /// Encode one timeslice of whatever the device captured since the last call.
    ///
    /// Returns the number of encoded bytes added. No-op while paused or closed.
    pub fn collect(&mut self) -> CoreResult<usize> {
        if self.paused {
            return Ok(0);
        }

        let (Some(device), Some(encoder)) = (self.device.as_mut(), self.encoder.as_mut()) else {
            return Ok(0);
        };

        let samples = device.drain()?;
        encoder.push_chunk(&samples)
    }

    /// Copy the most recent device samples into `window` for live analysis.
    pub fn analysis_window(&self, window: &mut [f32]) -> usize {
        self.device
            .as_ref()
            .map(|device| device.recent(window))
            .unwrap_or(0)
    }

    /// Flush buffered data into the final payload and release the device.
    ///
    /// Returns `None` if nothing was captured or the session was already
    /// finalized.
    #[instrument(skip(self))]
    pub fn finalize(&mut self) -> CoreResult<Option<Vec<u8>>> {
        let Some(mut encoder) = self.encoder.take() else {
            self.close();
            return Ok(None);
        };

        if !self.paused {
            if let Some(device) = self.device.as_mut() {
                match device.drain() {
                    Ok(samples) => {
                        if let Err(e) = encoder.push_chunk(&samples) {
                            warn!(error = ?e, "Failed to encode final timeslice");
                        }
                    }
                    Err(e) => warn!(error = ?e, "Failed to drain final timeslice"),
                }
            }
        }

        // Release the device before the container is written so a failing
        // encoder cannot keep the microphone open.
        self.close();

        encoder.finish()
    }

    /// Release the device. Safe to call any number of times.
    pub fn close(&mut self) {
        if let Some(mut device) = self.device.take() {
            device.release();
            info!("Capture session closed");
        }
        self.paused = false;
    }
}

impl<D: InputDevice> Drop for CaptureSession<D> {
    fn drop(&mut self) {
        self.close();
    }
}
