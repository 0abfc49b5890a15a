use voice_notes_core::AudioError;

use std::{panic::Location, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;
use uuid::Uuid;

/// Application-level errors for the voice-notes binary.
///
/// All variants include `ErrorLocation` for call-site tracking.
#[derive(Error, Debug)]
pub enum AppError {
    /// Audio subsystem error from voice-notes-core.
    #[error("Audio error: {source} {location}")]
    Audio {
        /// The underlying audio error.
        #[source]
        source: AudioError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Configuration loading or saving error.
    #[error("Configuration error: {reason} {location}")]
    ConfigError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Note library could not be read or written.
    #[error("Library error: {reason} {location}")]
    LibraryError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// No note matches the given id or id prefix.
    #[error("Note not found: {query} {location}")]
    NoteNotFound {
        /// The id or prefix that was looked up.
        query: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// An id prefix matched more than one note.
    #[error("Ambiguous note id {query}: matches {candidates:?} {location}")]
    AmbiguousNoteId {
        /// The prefix that was looked up.
        query: String,
        /// Every note id sharing the prefix.
        candidates: Vec<Uuid>,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {source} {location}")]
    SerializationError {
        /// The underlying serde_json error.
        #[source]
        source: serde_json::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// A terminal command could not be parsed or executed.
    #[error("Command error: {reason} {location}")]
    CommandError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

// Manual From<AudioError> with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<AudioError> for AppError {
    #[track_caller]
    fn from(source: AudioError) -> Self {
        AppError::Audio {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        AppError::IoError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        AppError::SerializationError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl AppError {
    /// Short message for the terminal, without source locations.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Audio { source, .. } => match source {
                AudioError::PermissionDenied { .. } => {
                    "Microphone access denied. Allow microphone access and try again.".to_string()
                }
                AudioError::DeviceUnavailable { reason, .. } => {
                    format!("No usable microphone: {}", reason)
                }
                AudioError::AlreadyRecording { .. } => "A recording is already running.".to_string(),
                other => format!("Audio failure: {}", other),
            },
            AppError::NoteNotFound { query, .. } => format!("No note matches '{}'.", query),
            AppError::AmbiguousNoteId {
                query, candidates, ..
            } => format!(
                "'{}' matches {} notes, type more of the id.",
                query,
                candidates.len()
            ),
            AppError::CommandError { reason, .. } => reason.clone(),
            AppError::ConfigError { reason, .. } | AppError::LibraryError { reason, .. } => {
                reason.clone()
            }
            AppError::SerializationError { source, .. } => format!("Bad data: {}", source),
            AppError::IoError { source, .. } => format!("File error: {}", source),
        }
    }
}

/// Convenience type alias for Results using `AppError`.
pub type Result<T> = StdResult<T, AppError>;
