use std::time::{Duration, Instant};

/// Active-duration tracker with pause accounting and a hard cutoff.
///
/// Reported duration is `now - started_at - paused_total`, frozen at the
/// pause instant while paused. Every pause/resume interval adds its exact
/// wall-clock length to `paused_total`.
#[derive(Debug, Clone)]
pub struct RecordingTimer {
    started_at: Instant,
    paused_total: Duration,
    paused_at: Option<Instant>,
    max_duration: Duration,
}

impl RecordingTimer {
    /// Start a timer at `now` with zero elapsed time.
    pub fn start(now: Instant, max_duration: Duration) -> Self {
        Self {
            started_at: now,
            paused_total: Duration::ZERO,
            paused_at: None,
            max_duration,
        }
    }

    /// Freeze the active duration. No-op if already paused.
    pub fn pause(&mut self, now: Instant) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    /// Add the paused interval to the running total. No-op if not paused.
    pub fn resume(&mut self, now: Instant) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += now.saturating_duration_since(paused_at);
        }
    }

    /// True between [`RecordingTimer::pause`] and [`RecordingTimer::resume`].
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Active duration at `now`, never negative.
    pub fn elapsed(&self, now: Instant) -> Duration {
        let reference = self.paused_at.unwrap_or(now);
        reference
            .saturating_duration_since(self.started_at)
            .saturating_sub(self.paused_total)
    }

    /// Sum of all completed pause intervals.
    pub fn paused_total(&self) -> Duration {
        self.paused_total
    }

    /// Configured cutoff.
    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    /// True once active time has reached the cutoff while running.
    pub fn limit_reached(&self, now: Instant) -> bool {
        !self.is_paused() && self.elapsed(now) >= self.max_duration
    }
}
