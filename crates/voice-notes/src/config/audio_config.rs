use crate::config::default_voice_processing;

use serde::{Deserialize, Serialize};

/// Audio device configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Selected audio device name (None = default device).
    #[serde(default)]
    pub selected_device: Option<String>,

    /// Request echo cancellation from the input device.
    #[serde(default = "default_voice_processing")]
    pub echo_cancellation: bool,

    /// Request noise suppression from the input device.
    #[serde(default = "default_voice_processing")]
    pub noise_suppression: bool,

    /// Request automatic gain control from the input device.
    #[serde(default = "default_voice_processing")]
    pub auto_gain_control: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            selected_device: None,
            echo_cancellation: default_voice_processing(),
            noise_suppression: default_voice_processing(),
            auto_gain_control: default_voice_processing(),
        }
    }
}
