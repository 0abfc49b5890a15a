/// Read-only snapshot of the recorder, replaced wholesale on every change.
///
/// Invariant: `is_paused` implies `is_recording`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingState {
    /// A recording session is open (running or paused).
    pub is_recording: bool,
    /// The open session is paused.
    pub is_paused: bool,
    /// Active (non-paused) recording time in seconds.
    pub duration: f64,
    /// Most recent instantaneous loudness in [0, 1].
    pub audio_level: f32,
    /// Most recent live waveform snapshot, values in [0, 1]. Empty until the
    /// first analysis frame of a recording.
    pub waveform_data: Vec<f32>,
}

impl RecordingState {
    /// The idle state.
    pub fn idle() -> Self {
        Self::default()
    }

    /// A freshly started recording.
    pub(crate) fn started() -> Self {
        Self {
            is_recording: true,
            ..Self::default()
        }
    }

    /// Neither recording nor paused.
    pub fn is_idle(&self) -> bool {
        !self.is_recording
    }

    /// Recording and not paused.
    pub fn is_active(&self) -> bool {
        self.is_recording && !self.is_paused
    }
}

/// Encoded audio of one completed recording.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedAudio {
    /// WAV container, 16-bit PCM mono.
    pub payload: Vec<u8>,
    /// Active recording time in seconds.
    pub duration: f64,
}

impl CapturedAudio {
    /// Size of the encoded payload.
    pub fn byte_len(&self) -> usize {
        self.payload.len()
    }
}
