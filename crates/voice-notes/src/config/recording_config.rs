use crate::config::{default_frame_interval_ms, default_max_duration_secs, default_timeslice_ms};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Recording limits and scheduling intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Active seconds after which a recording stops itself.
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: u64,

    /// Collection and timer tick period in milliseconds.
    #[serde(default = "default_timeslice_ms")]
    pub timeslice_ms: u64,

    /// Live meter refresh period in milliseconds.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

impl RecordingConfig {
    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs.max(1))
    }

    pub fn timeslice(&self) -> Duration {
        Duration::from_millis(self.timeslice_ms.max(1))
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            max_duration_secs: default_max_duration_secs(),
            timeslice_ms: default_timeslice_ms(),
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}
