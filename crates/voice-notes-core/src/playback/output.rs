use crate::{
    AudioError, CoreResult,
    audio::capture::classify_backend_error,
    playback::{SharedTrack, lock_track},
};

use std::{
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use cpal::{
    BuildStreamError, DefaultStreamConfigError, Device, FromSample, Host, SampleFormat, SizedSample,
    Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument};

/// A live, exclusively owned speaker stream pulling from a [`SharedTrack`].
pub trait OutputDevice {
    /// Rate the stream consumes samples at; tracks must be loaded at this rate.
    fn sample_rate(&self) -> u32;

    /// Stop pulling from the track.
    fn pause(&mut self) -> CoreResult<()>;

    /// Continue pulling after [`OutputDevice::pause`].
    fn resume(&mut self) -> CoreResult<()>;

    /// Stop the stream and release the hardware. Must tolerate repeated calls.
    fn release(&mut self);
}

/// Source of [`OutputDevice`]s.
pub trait OutputProvider {
    /// Device handle produced by this provider.
    type Output: OutputDevice;

    /// Open the speaker and start rendering `track`.
    fn acquire(&self, track: SharedTrack) -> CoreResult<Self::Output>;
}

/// Speaker access through the platform's default audio host.
pub struct CpalOutputProvider {
    host: Host,
}

impl CpalOutputProvider {
    /// Wrap the platform's default audio host.
    #[instrument]
    pub fn new() -> Self {
        let host = cpal::default_host();
        debug!(host = ?host.id(), "Output host initialized");
        Self { host }
    }
}

impl Default for CpalOutputProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputProvider for CpalOutputProvider {
    type Output = CpalOutput;

    #[track_caller]
    #[instrument(skip(self, track))]
    fn acquire(&self, track: SharedTrack) -> CoreResult<CpalOutput> {
        let device = self
            .host
            .default_output_device()
            .ok_or_else(|| AudioError::DeviceUnavailable {
                reason: "No speaker found".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let supported = device
            .default_output_config()
            .map_err(|e| match e {
                DefaultStreamConfigError::DeviceNotAvailable => AudioError::DeviceUnavailable {
                    reason: e.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                },
                other => classify_backend_error(format!("Failed to get config: {}", other)),
            })?;

        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();

        let mut output = CpalOutput {
            stream: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            sample_rate: config.sample_rate,
        };

        let stream = match sample_format {
            SampleFormat::F32 => output.build_stream::<f32>(&device, &config, track)?,
            SampleFormat::I16 => output.build_stream::<i16>(&device, &config, track)?,
            SampleFormat::U16 => output.build_stream::<u16>(&device, &config, track)?,
            other => {
                return Err(AudioError::DeviceUnavailable {
                    reason: format!("Unsupported sample format: {:?}", other),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        stream
            .play()
            .map_err(|e| classify_backend_error(format!("Failed to start stream: {}", e)))?;

        output.stream = Some(stream);

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate,
            channels = config.channels,
            "Speaker acquired"
        );

        Ok(output)
    }
}

/// Speaker stream opened through cpal.
pub struct CpalOutput {
    stream: Option<Stream>,
    /// Set before the stream is dropped so no in-flight callback reads the track.
    shutdown: Arc<AtomicBool>,
    sample_rate: u32,
}

impl CpalOutput {
    #[track_caller]
    fn build_stream<T>(
        &self,
        device: &Device,
        config: &StreamConfig,
        track: SharedTrack,
    ) -> CoreResult<Stream>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        let shutdown = Arc::clone(&self.shutdown);
        let channels = usize::from(config.channels.max(1));
        let mut mono: Vec<f32> = Vec::new();

        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let frames = data.len() / channels;
                    mono.resize(frames, 0.0);

                    if shutdown.load(Ordering::Acquire) {
                        mono.fill(0.0);
                    } else {
                        lock_track(&track).render(&mut mono);
                    }

                    for (frame, &sample) in data.chunks_mut(channels).zip(&mono) {
                        let value = <T as cpal::Sample>::from_sample(sample);
                        frame.fill(value);
                    }
                },
                |err| {
                    error!("Playback stream error: {}", err);
                },
                None,
            )
            .map_err(|e| match e {
                BuildStreamError::DeviceNotAvailable => AudioError::DeviceUnavailable {
                    reason: e.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                },
                other => classify_backend_error(format!("Failed to build stream: {}", other)),
            })
    }
}

impl OutputDevice for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[track_caller]
    fn pause(&mut self) -> CoreResult<()> {
        if let Some(stream) = &self.stream {
            stream.pause().map_err(|e| AudioError::DeviceError {
                reason: format!("Failed to pause playback: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;
        }
        Ok(())
    }

    #[track_caller]
    fn resume(&mut self) -> CoreResult<()> {
        if let Some(stream) = &self.stream {
            stream.play().map_err(|e| AudioError::DeviceError {
                reason: format!("Failed to resume playback: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;
        }
        Ok(())
    }

    fn release(&mut self) {
        self.shutdown.store(true, Ordering::Release);

        if let Some(stream) = self.stream.take() {
            drop(stream);
            info!("Speaker released");
        }
    }
}

impl Drop for CpalOutput {
    fn drop(&mut self) {
        self.release();
    }
}
