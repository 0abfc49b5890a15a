mod output;
mod player;
mod track;

pub(crate) use track::{clamp_rate, clamp_volume};

pub use {
    output::{CpalOutput, CpalOutputProvider, OutputDevice, OutputProvider},
    player::{PlaybackProgress, PlaybackStatus, Player},
    track::{PLAYBACK_RATES, PlaybackTrack, SharedTrack, lock_track, next_rate},
};
