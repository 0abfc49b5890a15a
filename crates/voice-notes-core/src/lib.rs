//! Voice Notes Core Library
//!
//! Microphone capture, pause-aware recording timer, live level/waveform
//! analysis, post-hoc envelope summaries and speaker playback for short
//! voice memos, using CPAL, Rubato, RustFFT and Hound.
//!
//! # Example
//!
//! ```no_run
//! use voice_notes_core::{
//!     CoreResult, CpalProvider, RecorderSettings, RecordingManager, TickOutcome,
//! };
//!
//! use std::{thread::sleep, time::Duration};
//!
//! fn main() -> CoreResult<()> {
//!     let mut recorder = RecordingManager::new(CpalProvider::new(), RecorderSettings::default());
//!
//!     recorder.start()?;
//!     for _ in 0..30 {
//!         sleep(Duration::from_millis(100));
//!         if let TickOutcome::LimitReached(_) = recorder.tick()? {
//!             break;
//!         }
//!     }
//!
//!     if let Some(captured) = recorder.stop()? {
//!         println!("Captured {:.1}s, {} bytes", captured.duration, captured.byte_len());
//!     }
//!     Ok(())
//! }
//! ```

mod audio;
mod error;
mod payload;
mod playback;
mod waveform;

pub use {
    audio::{
        CaptureConstraints, CaptureSession, CapturedAudio, Clock, CpalInput, CpalProvider,
        DeviceProvider, InputDevice, LiveAnalyser, LiveFrame, MAX_RECORDING_DURATION,
        RecorderSettings, RecordingManager, RecordingState, RecordingTimer, STORAGE_SAMPLE_RATE,
        SystemClock, TickOutcome, time_domain_deviation,
    },
    error::{AudioError, Result as CoreResult},
    payload::{
        BYTES_PER_SECOND_ESTIMATE, DecodedAudio, METADATA_TIMEOUT, decode_wav, estimate_duration,
        measure_duration, read_duration,
    },
    playback::{
        CpalOutput, CpalOutputProvider, OutputDevice, OutputProvider, PLAYBACK_RATES,
        PlaybackProgress, PlaybackStatus, PlaybackTrack, Player, SharedTrack, lock_track,
        next_rate,
    },
    waveform::{NOTE_ENVELOPE_POINTS, envelope_from_payload, summarize},
};
