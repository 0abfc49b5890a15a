use crate::CoreResult;

/// Processing requested from the platform when acquiring the microphone.
///
/// Backends that cannot honour a flag log it and continue with the raw
/// signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConstraints {
    /// Preferred input device name (`None` = system default).
    pub device_name: Option<String>,
    /// Request acoustic echo cancellation.
    pub echo_cancellation: bool,
    /// Request background noise suppression.
    pub noise_suppression: bool,
    /// Request automatic gain control.
    pub auto_gain_control: bool,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            device_name: None,
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
        }
    }
}

/// A live, exclusively owned microphone stream producing mono `f32` samples.
pub trait InputDevice {
    /// Native sample rate of the delivered samples.
    fn sample_rate(&self) -> u32;

    /// Stop delivering samples until [`InputDevice::resume`].
    fn pause(&mut self) -> CoreResult<()>;

    /// Continue delivering samples after [`InputDevice::pause`].
    fn resume(&mut self) -> CoreResult<()>;

    /// Take every sample captured since the previous drain.
    fn drain(&mut self) -> CoreResult<Vec<f32>>;

    /// Copy the most recent samples into the tail of `window`.
    ///
    /// Returns how many samples were written; the head of `window` is left
    /// untouched when fewer samples than `window.len()` exist.
    fn recent(&self, window: &mut [f32]) -> usize;

    /// Stop the stream and release the hardware. Must tolerate repeated calls.
    fn release(&mut self);
}

/// Source of [`InputDevice`]s.
pub trait DeviceProvider {
    /// Device handle produced by this provider.
    type Input: InputDevice;

    /// Acquire the microphone, failing with `PermissionDenied` or
    /// `DeviceUnavailable`.
    fn acquire(&self, constraints: &CaptureConstraints) -> CoreResult<Self::Input>;
}
