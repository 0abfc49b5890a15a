use crate::{
    CoreResult,
    audio::Resampler,
    payload::decode_wav,
    playback::{
        OutputDevice, OutputProvider, PlaybackTrack, SharedTrack, clamp_rate, clamp_volume,
        lock_track, next_rate,
    },
};

use tracing::{debug, info, instrument, warn};

/// Playhead snapshot of an open playback.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackProgress {
    /// Playhead position in seconds.
    pub elapsed: f64,
    /// Length of the audio in seconds.
    pub duration: f64,
    /// Speed multiplier.
    pub rate: f32,
    /// Gain in [0, 1].
    pub volume: f32,
}

/// Result of observing the player.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackStatus {
    /// Nothing is loaded.
    Idle,
    /// Audio is being rendered.
    Playing(PlaybackProgress),
    /// Output is held at the playhead.
    Paused(PlaybackProgress),
    /// The end was reached and the speaker released.
    Finished,
}

struct ActivePlayback<D: OutputDevice> {
    device: D,
    track: SharedTrack,
}

impl<D: OutputDevice> Drop for ActivePlayback<D> {
    fn drop(&mut self) {
        self.device.release();
    }
}

/// Plays saved payloads one at a time: `Idle -> Playing (<-> Paused) -> Idle`.
///
/// Speed and volume persist across notes. Like the recorder, the player is
/// owned by the event loop; the owner calls [`Player::poll`] on its
/// timeslice to notice the end of a note and release the speaker.
pub struct Player<O: OutputProvider> {
    provider: O,
    rate: f32,
    volume: f32,
    active: Option<ActivePlayback<O::Output>>,
}

impl<O: OutputProvider> Player<O> {
    /// Create an idle player at normal speed and full volume.
    pub fn new(provider: O) -> Self {
        Self {
            provider,
            rate: 1.0,
            volume: 1.0,
            active: None,
        }
    }

    /// True while a note is loaded, playing or paused.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Current speed multiplier.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Current gain.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Decode `payload`, open the speaker and start from the beginning.
    ///
    /// Any playback already open is stopped first. Returns the duration of
    /// the loaded audio in seconds.
    ///
    /// # Errors
    ///
    /// `DecodeFailure` before any device is touched, `DeviceUnavailable` or
    /// `PermissionDenied` from the speaker, `ResamplingError` while
    /// converting to the speaker's rate. The player is idle on every error.
    #[track_caller]
    #[instrument(skip(self, payload), fields(byte_len = payload.len()))]
    pub fn play(&mut self, payload: &[u8]) -> CoreResult<f64> {
        self.stop();

        let decoded = decode_wav(payload)?;

        let mut paused = PlaybackTrack::empty();
        paused.set_paused(true);
        let track = paused.shared();

        let device = self.provider.acquire(SharedTrack::clone(&track))?;
        let device_rate = device.sample_rate();

        // Dropping `active` on a conversion error releases the speaker.
        let active = ActivePlayback { device, track };

        let samples = convert_rate(decoded.samples, decoded.sample_rate, device_rate)?;

        let duration = {
            let mut track = lock_track(&active.track);
            track.load(samples, device_rate);
            track.set_rate(self.rate);
            track.set_volume(self.volume);
            track.set_paused(false);
            track.duration()
        };

        self.active = Some(active);

        info!(
            duration_secs = duration,
            source_rate = decoded.sample_rate,
            device_rate,
            "Playback started"
        );

        Ok(duration)
    }

    /// Hold output at the playhead. Returns whether a transition happened.
    #[instrument(skip(self))]
    pub fn pause(&mut self) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };

        let mut track = lock_track(&active.track);
        if track.is_paused() {
            return false;
        }
        track.set_paused(true);
        drop(track);

        // The track gate already holds output if the backend cannot pause.
        if let Err(e) = active.device.pause() {
            debug!(error = ?e, "Stream pause unsupported, relying on track gate");
        }

        info!("Playback paused");
        true
    }

    /// Continue after [`Player::pause`]. Returns whether a transition happened.
    #[instrument(skip(self))]
    pub fn resume(&mut self) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };

        if !lock_track(&active.track).is_paused() {
            return false;
        }

        if let Err(e) = active.device.resume() {
            warn!(error = ?e, "Failed to resume playback");
            return false;
        }

        lock_track(&active.track).set_paused(false);

        info!("Playback resumed");
        true
    }

    /// Release the speaker. Returns whether anything was playing.
    #[instrument(skip(self))]
    pub fn stop(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                drop(active);
                info!("Playback stopped");
                true
            }
            None => false,
        }
    }

    /// Move the playhead, clamped to the note. Returns the new position.
    pub fn seek(&mut self, seconds: f64) -> Option<f64> {
        let active = self.active.as_ref()?;
        let mut track = lock_track(&active.track);
        track.seek(seconds);
        debug!(position_secs = track.elapsed(), "Playback seek");
        Some(track.elapsed())
    }

    /// Jump back to the start of the note.
    pub fn restart(&mut self) -> bool {
        self.seek(0.0).is_some()
    }

    /// Set the speed for this and later notes. Returns the applied speed.
    pub fn set_rate(&mut self, rate: f32) -> f32 {
        self.rate = clamp_rate(rate);
        if let Some(active) = self.active.as_ref() {
            lock_track(&active.track).set_rate(self.rate);
        }
        self.rate
    }

    /// Step to the next speed in the cycle. Returns the applied speed.
    pub fn cycle_rate(&mut self) -> f32 {
        self.set_rate(next_rate(self.rate))
    }

    /// Set the gain for this and later notes. Returns the applied gain.
    pub fn set_volume(&mut self, volume: f32) -> f32 {
        self.volume = clamp_volume(volume);
        if let Some(active) = self.active.as_ref() {
            lock_track(&active.track).set_volume(self.volume);
        }
        self.volume
    }

    /// Snapshot without side effects.
    pub fn status(&self) -> PlaybackStatus {
        let Some(active) = self.active.as_ref() else {
            return PlaybackStatus::Idle;
        };

        let track = lock_track(&active.track);
        let progress = PlaybackProgress {
            elapsed: track.elapsed(),
            duration: track.duration(),
            rate: track.rate(),
            volume: track.volume(),
        };

        if track.is_finished() {
            PlaybackStatus::Finished
        } else if track.is_paused() {
            PlaybackStatus::Paused(progress)
        } else {
            PlaybackStatus::Playing(progress)
        }
    }

    /// Snapshot, releasing the speaker once the end has been reached.
    pub fn poll(&mut self) -> PlaybackStatus {
        let status = self.status();
        if status == PlaybackStatus::Finished {
            self.active = None;
            info!("Playback finished");
        }
        status
    }
}

impl<O: OutputProvider> Drop for Player<O> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[track_caller]
fn convert_rate(samples: Vec<f32>, from: u32, to: u32) -> CoreResult<Vec<f32>> {
    if from == to {
        return Ok(samples);
    }

    let mut resampler = Resampler::new(from, to)?;
    let mut converted = resampler.push(&samples)?;
    converted.extend(resampler.flush()?);
    Ok(converted)
}
