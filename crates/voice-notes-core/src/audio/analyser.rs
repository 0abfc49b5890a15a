//! Live level and waveform analysis over the most recent capture window.
//!
//! Mirrors the byte-scaled frequency and time-domain readings of a browser
//! analyser node so levels look the same as the web recorder they replace:
//! Blackman window, magnitude smoothing, dB range mapped onto 0..=255.

use std::sync::Arc;

use rustfft::{Fft, FftPlanner, num_complex::Complex};

/// Analysis window length.
pub const DEFAULT_FFT_SIZE: usize = 256;

/// Points in a live waveform snapshot.
pub const DEFAULT_WAVEFORM_POINTS: usize = 50;

const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;
const SMOOTHING_TIME_CONSTANT: f32 = 0.8;

/// One analysis tick's output.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveFrame {
    /// Mean byte-scaled spectrum magnitude, normalized to [0, 1].
    pub level: f32,
    /// Downsampled time-domain deviation from midpoint, each in [0, 1].
    pub waveform: Vec<f32>,
}

/// Per-frame analyser holding FFT state between ticks.
pub struct LiveAnalyser {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    points: usize,
    window: Vec<f32>,
    smoothed: Vec<f32>,
    buffer: Vec<Complex<f32>>,
}

impl LiveAnalyser {
    /// Analyser with the default window (256) and snapshot length (50).
    pub fn new() -> Self {
        Self::with_sizes(DEFAULT_FFT_SIZE, DEFAULT_WAVEFORM_POINTS)
    }

    /// Analyser with explicit window and snapshot sizes.
    pub fn with_sizes(fft_size: usize, points: usize) -> Self {
        let fft_size = fft_size.max(2);
        let fft = FftPlanner::<f32>::new().plan_fft_forward(fft_size);

        // Blackman window, alpha = 0.16
        let n = fft_size as f32;
        let window = (0..fft_size)
            .map(|i| {
                let x = i as f32 / n;
                0.42 - 0.5 * (2.0 * std::f32::consts::PI * x).cos()
                    + 0.08 * (4.0 * std::f32::consts::PI * x).cos()
            })
            .collect();

        Self {
            fft,
            fft_size,
            points,
            window,
            smoothed: vec![0.0; fft_size / 2],
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
        }
    }

    /// Number of samples [`LiveAnalyser::analyse`] expects.
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Compute level and waveform from the latest `fft_size` samples.
    ///
    /// Shorter input is treated as silence-padded at the front.
    pub fn analyse(&mut self, samples: &[f32]) -> LiveFrame {
        let start = samples.len().saturating_sub(self.fft_size);
        let recent = &samples[start..];
        let offset = self.fft_size - recent.len();

        let mut time_domain = vec![0.0f32; self.fft_size];
        time_domain[offset..].copy_from_slice(recent);

        LiveFrame {
            level: self.level(&time_domain),
            waveform: self.waveform(&time_domain),
        }
    }

    fn level(&mut self, time_domain: &[f32]) -> f32 {
        for ((slot, &sample), &w) in self.buffer.iter_mut().zip(time_domain).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }

        self.fft.process(&mut self.buffer);

        let scale = 1.0 / self.fft_size as f32;
        let range = MAX_DECIBELS - MIN_DECIBELS;
        let bins = self.smoothed.len();
        let mut sum = 0.0f32;

        for (bin, smoothed) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.buffer[bin].norm() * scale;
            *smoothed =
                SMOOTHING_TIME_CONSTANT * *smoothed + (1.0 - SMOOTHING_TIME_CONSTANT) * magnitude;

            let db = if *smoothed > 0.0 {
                20.0 * smoothed.log10()
            } else {
                f32::NEG_INFINITY
            };
            let byte = (255.0 / range * (db - MIN_DECIBELS)).clamp(0.0, 255.0).floor();
            sum += byte;
        }

        if bins == 0 {
            return 0.0;
        }

        (sum / bins as f32 / 255.0).clamp(0.0, 1.0)
    }

    fn waveform(&self, time_domain: &[f32]) -> Vec<f32> {
        if self.points == 0 {
            return Vec::new();
        }

        let step = (self.fft_size / self.points).max(1);

        (0..self.points)
            .map(|i| {
                let sample = time_domain.get(i * step).copied().unwrap_or(0.0);
                time_domain_deviation(sample)
            })
            .collect()
    }
}

impl Default for LiveAnalyser {
    fn default() -> Self {
        Self::new()
    }
}

/// Quantize a sample to a byte around midpoint 128 and return `|byte - 128| / 128`.
pub fn time_domain_deviation(sample: f32) -> f32 {
    let byte = (128.0 * (1.0 + sample)).floor().clamp(0.0, 255.0);
    ((byte - 128.0) / 128.0).abs()
}
