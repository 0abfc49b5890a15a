pub(crate) mod analyser;
pub(crate) mod capture;
mod clock;
mod device;
mod encoder;
mod manager;
mod resampler;
mod session;
mod state;
mod timer;

pub(crate) use {encoder::PcmEncoder, resampler::Resampler};

pub use {
    analyser::{LiveAnalyser, LiveFrame, time_domain_deviation},
    capture::{CpalInput, CpalProvider},
    clock::{Clock, SystemClock},
    device::{CaptureConstraints, DeviceProvider, InputDevice},
    manager::{
        MAX_RECORDING_DURATION, RecorderSettings, RecordingManager, STORAGE_SAMPLE_RATE,
        TickOutcome,
    },
    session::CaptureSession,
    state::{CapturedAudio, RecordingState},
    timer::RecordingTimer,
};
