use crate::{
    AudioError, CoreResult,
    audio::{CaptureConstraints, DeviceProvider, InputDevice},
};

use std::{
    collections::VecDeque,
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use cpal::{
    BuildStreamError, DefaultStreamConfigError, Device, FromSample, Host, SampleFormat, SizedSample,
    Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// Maximum samples held between two drains (5 minutes at 48kHz mono).
/// Prevents unbounded memory growth if the collector stalls.
///
/// **Memory footprint at max capacity:**
/// - 48,000 Hz * 60s * 5 min * 4 bytes/f32 = ~58MB
/// - In practice the session drains every timeslice (100ms)
pub(crate) const MAX_BUFFER_SAMPLES: usize = 48_000 * 60 * 5;

/// Samples kept for the live analysis window.
pub(crate) const RECENT_CAPACITY: usize = 2048;

/// Buffers shared between the cpal callback thread and the owner.
#[derive(Debug, Default)]
pub(crate) struct CaptureBuffers {
    pub(crate) pending: VecDeque<f32>,
    pub(crate) recent: VecDeque<f32>,
}

impl CaptureBuffers {
    /// Append a mono block, dropping the oldest samples past both bounds.
    pub(crate) fn push_block(&mut self, mono: impl Iterator<Item = f32> + Clone) {
        self.pending.extend(mono.clone());
        while self.pending.len() > MAX_BUFFER_SAMPLES {
            self.pending.pop_front();
        }

        self.recent.extend(mono);
        while self.recent.len() > RECENT_CAPACITY {
            self.recent.pop_front();
        }
    }
}

/// Process-wide handle on the platform audio host.
///
/// Long-lived capability: creating it does not touch any device, and it
/// needs no teardown beyond releasing the streams it hands out.
pub struct CpalProvider {
    host: Host,
}

impl CpalProvider {
    /// Wrap the platform's default audio host.
    #[instrument]
    pub fn new() -> Self {
        let host = cpal::default_host();
        debug!(host = ?host.id(), "Audio host initialized");
        Self { host }
    }

    #[track_caller]
    fn select_device(&self, constraints: &CaptureConstraints) -> CoreResult<Device> {
        if let Some(wanted) = &constraints.device_name {
            let devices = self
                .host
                .input_devices()
                .map_err(|e| AudioError::DeviceUnavailable {
                    reason: format!("Failed to enumerate input devices: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            for device in devices {
                #[allow(deprecated)]
                let name = device.name().unwrap_or_default();
                if &name == wanted {
                    return Ok(device);
                }
            }

            warn!(device = %wanted, "Configured input device not found, using default");
        }

        self.host
            .default_input_device()
            .ok_or_else(|| AudioError::DeviceUnavailable {
                reason: "No microphone found".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

impl Default for CpalProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceProvider for CpalProvider {
    type Input = CpalInput;

    #[track_caller]
    #[instrument(skip(self))]
    fn acquire(&self, constraints: &CaptureConstraints) -> CoreResult<CpalInput> {
        let device = self.select_device(constraints)?;

        let supported = device
            .default_input_config()
            .map_err(|e| match e {
                DefaultStreamConfigError::DeviceNotAvailable => AudioError::DeviceUnavailable {
                    reason: e.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                },
                other => classify_backend_error(format!("Failed to get config: {}", other)),
            })?;

        // cpal exposes the raw signal only; the processing flags are advisory.
        if constraints.echo_cancellation
            || constraints.noise_suppression
            || constraints.auto_gain_control
        {
            debug!(
                echo_cancellation = constraints.echo_cancellation,
                noise_suppression = constraints.noise_suppression,
                auto_gain_control = constraints.auto_gain_control,
                "Voice processing not available on this backend, capturing raw signal"
            );
        }

        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();

        let mut input = CpalInput {
            stream: None,
            buffers: Arc::new(Mutex::new(CaptureBuffers::default())),
            shutdown: Arc::new(AtomicBool::new(false)),
            paused: Arc::new(AtomicBool::new(false)),
            sample_rate: config.sample_rate,
        };

        let stream = match sample_format {
            SampleFormat::F32 => input.build_stream::<f32>(&device, &config)?,
            SampleFormat::I16 => input.build_stream::<i16>(&device, &config)?,
            SampleFormat::U16 => input.build_stream::<u16>(&device, &config)?,
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

        input.stream = Some(stream);

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate,
            channels = config.channels,
            "Microphone acquired"
        );

        Ok(input)
    }
}

/// Microphone stream opened through cpal.
pub struct CpalInput {
    stream: Option<Stream>,
    buffers: Arc<Mutex<CaptureBuffers>>,
    /// Signals the audio callback to stop writing. Set to `true` before
    /// dropping the stream so no in-flight callback writes after release.
    shutdown: Arc<AtomicBool>,
    /// Checked by the callback so paused backends that keep firing drop data.
    paused: Arc<AtomicBool>,
    sample_rate: u32,
}

impl CpalInput {
    #[track_caller]
    fn build_stream<T>(&self, device: &Device, config: &StreamConfig) -> CoreResult<Stream>
    where
        T: SizedSample + Send + 'static,
        f32: FromSample<T>,
    {
        let buffers = Arc::clone(&self.buffers);
        let shutdown = Arc::clone(&self.shutdown);
        let paused = Arc::clone(&self.paused);
        let channels = usize::from(config.channels.max(1));

        device
            .build_input_stream(
                config,
                move |data: &[T], _: &cpal::InputCallbackInfo| {
                    if shutdown.load(Ordering::Acquire) || paused.load(Ordering::Acquire) {
                        return;
                    }

                    let mono = data.chunks(channels).map(|frame| {
                        frame
                            .iter()
                            .map(|&s| <f32 as cpal::Sample>::from_sample(s))
                            .sum::<f32>()
                            / frame.len() as f32
                    });

                    // A poisoned mutex still holds valid samples.
                    let mut buf = buffers.lock().unwrap_or_else(|e| {
                        error!("Capture buffer lock poisoned, recovering: {}", e);
                        e.into_inner()
                    });
                    buf.push_block(mono);
                },
                |err| {
                    error!("Audio stream error: {}", err);
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

impl InputDevice for CpalInput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[track_caller]
    fn pause(&mut self) -> CoreResult<()> {
        self.paused.store(true, Ordering::Release);

        if let Some(stream) = &self.stream {
            // Not every backend can pause; the flag above already gates data.
            if let Err(e) = stream.pause() {
                debug!(error = %e, "Stream pause unsupported, relying on callback gate");
            }
        }

        Ok(())
    }

    #[track_caller]
    fn resume(&mut self) -> CoreResult<()> {
        if let Some(stream) = &self.stream {
            stream.play().map_err(|e| AudioError::DeviceError {
                reason: format!("Failed to resume stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;
        }

        self.paused.store(false, Ordering::Release);
        Ok(())
    }

    #[track_caller]
    fn drain(&mut self) -> CoreResult<Vec<f32>> {
        let mut buf = self.buffers.lock().map_err(|e| AudioError::DeviceError {
            reason: format!("Failed to lock samples: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(buf.pending.drain(..).collect())
    }

    fn recent(&self, window: &mut [f32]) -> usize {
        let buf = self.buffers.lock().unwrap_or_else(|e| e.into_inner());
        let count = buf.recent.len().min(window.len());
        let offset = window.len() - count;

        for (slot, sample) in window[offset..]
            .iter_mut()
            .zip(buf.recent.iter().skip(buf.recent.len() - count))
        {
            *slot = *sample;
        }

        count
    }

    fn release(&mut self) {
        self.shutdown.store(true, Ordering::Release);

        if let Some(stream) = self.stream.take() {
            drop(stream);
            info!("Microphone released");
        }
    }
}

impl Drop for CpalInput {
    fn drop(&mut self) {
        self.release();
    }
}

/// Map a backend failure onto the user-facing taxonomy.
#[track_caller]
pub(crate) fn classify_backend_error(reason: String) -> AudioError {
    let lowered = reason.to_lowercase();
    let location = ErrorLocation::from(Location::caller());

    if lowered.contains("permission")
        || lowered.contains("denied")
        || lowered.contains("not authorized")
    {
        AudioError::PermissionDenied { reason, location }
    } else {
        AudioError::DeviceUnavailable { reason, location }
    }
}
