use crate::{
    AudioError, CoreResult,
    audio::{
        CaptureConstraints, CaptureSession, CapturedAudio, Clock, DeviceProvider, InputDevice,
        LiveAnalyser, RecordingState, RecordingTimer, SystemClock,
        analyser::{DEFAULT_FFT_SIZE, DEFAULT_WAVEFORM_POINTS},
    },
};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// Hard cutoff for a single recording (5 minutes).
pub const MAX_RECORDING_DURATION: Duration = Duration::from_secs(300);

/// Sample rate of encoded payloads.
pub const STORAGE_SAMPLE_RATE: u32 = 16_000;

/// Tunables for [`RecordingManager`].
#[derive(Debug, Clone)]
pub struct RecorderSettings {
    /// Active duration at which a recording stops itself.
    pub max_duration: Duration,
    /// Processing requested from the microphone.
    pub constraints: CaptureConstraints,
    /// Sample rate of the encoded payload.
    pub storage_sample_rate: u32,
    /// Live analysis window length.
    pub fft_size: usize,
    /// Points in each live waveform snapshot.
    pub waveform_points: usize,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            max_duration: MAX_RECORDING_DURATION,
            constraints: CaptureConstraints::default(),
            storage_sample_rate: STORAGE_SAMPLE_RATE,
            fft_size: DEFAULT_FFT_SIZE,
            waveform_points: DEFAULT_WAVEFORM_POINTS,
        }
    }
}

/// Result of one timer tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No recording is open.
    Idle,
    /// The recording is paused; duration is frozen.
    Paused {
        /// Frozen active duration in seconds.
        duration: f64,
    },
    /// The recording is running.
    Running {
        /// Active duration in seconds.
        duration: f64,
    },
    /// The cutoff was reached and the recording stopped itself.
    LimitReached(Option<CapturedAudio>),
}

struct ActiveRecording<D: InputDevice> {
    session: CaptureSession<D>,
    timer: RecordingTimer,
    analyser: LiveAnalyser,
    window: Vec<f32>,
}

/// Recording state machine: `Idle -> Recording -> (Paused <-> Recording) -> Idle`.
///
/// Owns the capture session, timer and live analyser for the duration of one
/// recording. The owner drives two scheduling sources:
///
/// - [`RecordingManager::tick`] every timeslice (~100ms): collects encoded
///   audio, updates `duration`, enforces the cutoff.
/// - [`RecordingManager::frame`] every display frame while
///   [`RecordingManager::wants_frames`] is true: updates level and waveform.
///
/// # Thread Safety
///
/// Not thread-safe by design of the platform streams it holds. Keep it on
/// the event loop that drives it.
pub struct RecordingManager<P: DeviceProvider, C: Clock = SystemClock> {
    provider: P,
    clock: C,
    settings: RecorderSettings,
    state: RecordingState,
    active: Option<ActiveRecording<P::Input>>,
}

impl<P: DeviceProvider> RecordingManager<P> {
    /// Create an idle manager on the system clock.
    pub fn new(provider: P, settings: RecorderSettings) -> Self {
        Self::with_clock(provider, SystemClock, settings)
    }
}

impl<P: DeviceProvider, C: Clock> RecordingManager<P, C> {
    /// Create an idle manager on an explicit clock.
    pub fn with_clock(provider: P, clock: C, settings: RecorderSettings) -> Self {
        Self {
            provider,
            clock,
            settings,
            state: RecordingState::idle(),
            active: None,
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> &RecordingState {
        &self.state
    }

    /// Active settings.
    pub fn settings(&self) -> &RecorderSettings {
        &self.settings
    }

    /// Acquire the microphone and begin recording.
    ///
    /// Level and waveform stay empty until the first [`RecordingManager::frame`].
    ///
    /// # Errors
    ///
    /// `AlreadyRecording` if a session is open (no device is touched),
    /// `PermissionDenied`/`DeviceUnavailable` if acquisition fails. The
    /// manager stays idle on every error.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start(&mut self) -> CoreResult<()> {
        if self.active.is_some() {
            return Err(AudioError::AlreadyRecording {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let session = CaptureSession::open(
            &self.provider,
            &self.settings.constraints,
            self.settings.storage_sample_rate,
        )?;

        let analyser =
            LiveAnalyser::with_sizes(self.settings.fft_size, self.settings.waveform_points);
        let window = vec![0.0; analyser.fft_size()];

        self.active = Some(ActiveRecording {
            session,
            timer: RecordingTimer::start(self.clock.now(), self.settings.max_duration),
            analyser,
            window,
        });
        self.state = RecordingState::started();

        info!(
            max_duration_secs = self.settings.max_duration.as_secs(),
            "Recording started"
        );

        Ok(())
    }

    /// Pause a running recording. Returns whether a transition happened.
    #[instrument(skip(self))]
    pub fn pause(&mut self) -> bool {
        let now = self.clock.now();
        let Some(active) = self.active.as_mut() else {
            return false;
        };

        if active.timer.is_paused() {
            return false;
        }

        if let Err(e) = active.session.pause() {
            warn!(error = ?e, "Failed to pause capture");
            return false;
        }

        active.timer.pause(now);
        let duration = active.timer.elapsed(now).as_secs_f64();

        self.state = RecordingState {
            is_recording: true,
            is_paused: true,
            duration,
            audio_level: self.state.audio_level,
            waveform_data: std::mem::take(&mut self.state.waveform_data),
        };

        info!(duration_secs = duration, "Recording paused");

        true
    }

    /// Resume a paused recording. Returns whether a transition happened.
    #[instrument(skip(self))]
    pub fn resume(&mut self) -> bool {
        let now = self.clock.now();
        let Some(active) = self.active.as_mut() else {
            return false;
        };

        if !active.timer.is_paused() {
            return false;
        }

        if let Err(e) = active.session.resume() {
            warn!(error = ?e, "Failed to resume capture");
            return false;
        }

        active.timer.resume(now);
        let duration = active.timer.elapsed(now).as_secs_f64();

        self.state = RecordingState {
            is_recording: true,
            is_paused: false,
            duration,
            audio_level: self.state.audio_level,
            waveform_data: std::mem::take(&mut self.state.waveform_data),
        };

        info!(
            duration_secs = duration,
            paused_total_ms = active.timer.paused_total().as_millis(),
            "Recording resumed"
        );

        self.frame();

        true
    }

    /// Finish the recording and hand over its payload.
    ///
    /// Always releases the device and returns to idle, even when encoding
    /// fails. Returns `Ok(None)` from idle or when nothing was captured.
    #[instrument(skip(self))]
    pub fn stop(&mut self) -> CoreResult<Option<CapturedAudio>> {
        let Some(mut active) = self.active.take() else {
            debug!("Stop requested while idle");
            return Ok(None);
        };

        let now = self.clock.now();
        let duration = active
            .timer
            .elapsed(now)
            .min(active.timer.max_duration())
            .as_secs_f64();

        self.state = RecordingState::idle();

        let payload = active.session.finalize();
        drop(active);

        let captured = payload?.map(|payload| CapturedAudio { payload, duration });

        info!(
            duration_secs = duration,
            byte_len = captured.as_ref().map(CapturedAudio::byte_len).unwrap_or(0),
            "Recording stopped"
        );

        Ok(captured)
    }

    /// Release everything without producing a result.
    #[instrument(skip(self))]
    pub fn abandon(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.session.close();
            warn!("Recording abandoned, captured audio discarded");
        }
        self.state = RecordingState::idle();
    }

    /// Timeslice tick: collect audio, update duration, enforce the cutoff.
    pub fn tick(&mut self) -> CoreResult<TickOutcome> {
        let now = self.clock.now();
        let Some(active) = self.active.as_mut() else {
            return Ok(TickOutcome::Idle);
        };

        if active.timer.is_paused() {
            return Ok(TickOutcome::Paused {
                duration: self.state.duration,
            });
        }

        active.session.collect()?;

        if active.timer.limit_reached(now) {
            let max_duration = active.timer.max_duration().as_secs_f64();
            self.state = RecordingState {
                duration: max_duration,
                ..std::mem::take(&mut self.state)
            };

            info!(max_duration_secs = max_duration, "Maximum duration reached");

            let captured = self.stop()?;
            return Ok(TickOutcome::LimitReached(captured));
        }

        let duration = active.timer.elapsed(now).as_secs_f64();
        self.state = RecordingState {
            duration,
            ..std::mem::take(&mut self.state)
        };

        Ok(TickOutcome::Running { duration })
    }

    /// True while the live analysis loop should be scheduled.
    pub fn wants_frames(&self) -> bool {
        self.active.is_some() && self.state.is_active()
    }

    /// Run one live analysis tick. Returns `false` (and does nothing) unless
    /// recording and not paused.
    pub fn frame(&mut self) -> bool {
        if !self.wants_frames() {
            return false;
        }

        let Some(active) = self.active.as_mut() else {
            return false;
        };

        active.window.fill(0.0);
        active.session.analysis_window(&mut active.window);
        let frame = active.analyser.analyse(&active.window);

        self.state = RecordingState {
            is_recording: true,
            is_paused: false,
            duration: self.state.duration,
            audio_level: frame.level,
            waveform_data: frame.waveform,
        };

        true
    }
}

impl<P: DeviceProvider, C: Clock> Drop for RecordingManager<P, C> {
    fn drop(&mut self) {
        self.abandon();
    }
}
