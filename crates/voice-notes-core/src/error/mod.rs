use error_location::ErrorLocation;
use thiserror::Error;

/// Recording pipeline errors with source location tracking.
#[derive(Error, Debug)]
pub enum AudioError {
    /// The platform refused access to the microphone.
    #[error("Microphone permission denied: {reason} {location}")]
    PermissionDenied {
        /// Description reported by the audio backend.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No usable input device, or the device disappeared.
    #[error("Input device unavailable: {reason} {location}")]
    DeviceUnavailable {
        /// Description of why the device could not be used.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A recording is already in progress.
    #[error("A recording is already in progress {location}")]
    AlreadyRecording {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio resampling failed.
    #[error("Resampling error: {reason} {location}")]
    ResamplingError {
        /// Description of the resampling error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Writing the audio container failed.
    #[error("Encoding error: {reason} {location}")]
    EncodingError {
        /// Description of the encoding error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Captured audio could not be decoded back into samples.
    #[error("Failed to decode audio: {reason} {location}")]
    DecodeFailure {
        /// Description of the decoding error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Duration metadata could not be read from a payload.
    #[error("Audio metadata unavailable: {reason} {location}")]
    MetadataUnavailable {
        /// Description of why the metadata is missing or invalid.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`AudioError`].
pub type Result<T> = std::result::Result<T, AudioError>;
