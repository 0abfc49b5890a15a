use std::sync::{Arc, Mutex, MutexGuard};

use tracing::error;

/// Speeds offered by [`next_rate`], slowest first.
pub const PLAYBACK_RATES: [f32; 6] = [0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

/// Decoded mono audio plus the playhead, shared with the output callback.
///
/// Samples are stored at the output device's rate. The playhead is
/// fractional so any speed can be rendered by linear interpolation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackTrack {
    samples: Vec<f32>,
    sample_rate: u32,
    position: f64,
    rate: f32,
    volume: f32,
    paused: bool,
}

/// Track handle shared between the player and the output stream.
pub type SharedTrack = Arc<Mutex<PlaybackTrack>>;

impl PlaybackTrack {
    /// A track with nothing loaded; renders silence.
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    /// A track ready to play `samples` at `sample_rate`, full volume, normal speed.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            position: 0.0,
            rate: 1.0,
            volume: 1.0,
            paused: false,
        }
    }

    /// Wrap a track for sharing with an output stream.
    pub fn shared(self) -> SharedTrack {
        Arc::new(Mutex::new(self))
    }

    /// Replace the audio and rewind, keeping speed and volume.
    pub fn load(&mut self, samples: Vec<f32>, sample_rate: u32) {
        self.samples = samples;
        self.sample_rate = sample_rate;
        self.position = 0.0;
    }

    /// Fill `out` with mono frames, advancing the playhead by the speed per
    /// frame. Paused or finished tracks write silence.
    ///
    /// Returns the number of frames taken from the audio.
    pub fn render(&mut self, out: &mut [f32]) -> usize {
        let mut rendered = 0;

        for slot in out.iter_mut() {
            if self.paused || self.is_finished() {
                *slot = 0.0;
                continue;
            }

            let index = self.position.floor() as usize;
            let frac = (self.position - index as f64) as f32;
            let a = self.samples[index];
            let b = self.samples.get(index + 1).copied().unwrap_or(a);

            *slot = (a + (b - a) * frac) * self.volume;
            self.position += f64::from(self.rate);
            rendered += 1;
        }

        rendered
    }

    /// The playhead has passed the last sample.
    pub fn is_finished(&self) -> bool {
        self.position >= self.samples.len() as f64
    }

    /// Number of loaded samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when nothing is loaded.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playhead position in seconds.
    pub fn elapsed(&self) -> f64 {
        self.seconds(self.position.min(self.samples.len() as f64))
    }

    /// Length of the loaded audio in seconds.
    pub fn duration(&self) -> f64 {
        self.seconds(self.samples.len() as f64)
    }

    /// Move the playhead, clamped to the loaded audio.
    pub fn seek(&mut self, seconds: f64) {
        let seconds = if seconds.is_finite() { seconds } else { 0.0 };
        let target = seconds.clamp(0.0, self.duration()) * f64::from(self.sample_rate);
        self.position = target.min(self.samples.len() as f64);
    }

    /// Whether output is held.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Hold or release output without moving the playhead.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Current speed multiplier.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Set the speed, clamped to the slowest and fastest [`PLAYBACK_RATES`].
    pub fn set_rate(&mut self, rate: f32) {
        self.rate = clamp_rate(rate);
    }

    /// Current gain in [0, 1].
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Set the gain, clamped to [0, 1].
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
    }

    fn seconds(&self, frames: f64) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        frames / f64::from(self.sample_rate)
    }
}

impl Default for PlaybackTrack {
    fn default() -> Self {
        Self::empty()
    }
}

/// The speed after `current` in [`PLAYBACK_RATES`], wrapping to the slowest.
/// A speed not in the list restarts the cycle.
pub fn next_rate(current: f32) -> f32 {
    let index = PLAYBACK_RATES
        .iter()
        .position(|&r| (r - current).abs() < f32::EPSILON)
        .map(|i| i + 1)
        .unwrap_or(0);
    PLAYBACK_RATES[index % PLAYBACK_RATES.len()]
}

pub(crate) fn clamp_rate(rate: f32) -> f32 {
    if !rate.is_finite() {
        return 1.0;
    }
    rate.clamp(PLAYBACK_RATES[0], PLAYBACK_RATES[PLAYBACK_RATES.len() - 1])
}

pub(crate) fn clamp_volume(volume: f32) -> f32 {
    if !volume.is_finite() {
        return 1.0;
    }
    volume.clamp(0.0, 1.0)
}

/// Lock a shared track; a poisoned lock still holds a valid track.
pub fn lock_track(track: &SharedTrack) -> MutexGuard<'_, PlaybackTrack> {
    track.lock().unwrap_or_else(|e| {
        error!("Playback track lock poisoned, recovering: {}", e);
        e.into_inner()
    })
}
