mod audio_config;
#[allow(clippy::module_inception)]
mod config;
mod library_config;
mod recording_config;

pub(crate) use {
    audio_config::AudioConfig, config::Config, library_config::LibraryConfig,
    recording_config::RecordingConfig,
};

pub(crate) const DEFAULT_MAX_DURATION_SECS: u64 = 300;
pub(crate) const DEFAULT_TIMESLICE_MS: u64 = 100;
pub(crate) const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;
pub(crate) const DEFAULT_VOICE_PROCESSING: bool = true;

pub(crate) fn default_max_duration_secs() -> u64 {
    DEFAULT_MAX_DURATION_SECS
}

pub(crate) fn default_timeslice_ms() -> u64 {
    DEFAULT_TIMESLICE_MS
}

pub(crate) fn default_frame_interval_ms() -> u64 {
    DEFAULT_FRAME_INTERVAL_MS
}

pub(crate) fn default_voice_processing() -> bool {
    DEFAULT_VOICE_PROCESSING
}
