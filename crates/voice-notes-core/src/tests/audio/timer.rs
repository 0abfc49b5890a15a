use crate::RecordingTimer;

use std::time::{Duration, Instant};

const MAX: Duration = Duration::from_secs(300);

/// WHAT: Elapsed time excludes every paused interval
/// WHY: Duration must equal wall clock minus the sum of pauses across cycles
#[test]
fn given_several_pause_cycles_when_reading_elapsed_then_pauses_excluded() {
    // Given: A timer started at t0
    let t0 = Instant::now();
    let mut timer = RecordingTimer::start(t0, MAX);

    // When: Three pause/resume cycles of different lengths interleave with recording
    let mut now = t0;
    let mut active = Duration::ZERO;
    let mut paused = Duration::ZERO;
    for (run_ms, pause_ms) in [(1_250u64, 400u64), (30, 9_000), (2_000, 1)] {
        now += Duration::from_millis(run_ms);
        active += Duration::from_millis(run_ms);
        timer.pause(now);
        now += Duration::from_millis(pause_ms);
        paused += Duration::from_millis(pause_ms);
        timer.resume(now);
    }
    now += Duration::from_millis(500);
    active += Duration::from_millis(500);

    // Then: Elapsed equals wall clock minus total paused time
    assert_eq!(timer.elapsed(now), active);
    assert_eq!(timer.paused_total(), paused);
    assert_eq!(timer.elapsed(now), (now - t0) - paused);
}

/// WHAT: Elapsed time is frozen while paused
/// WHY: The UI keeps showing the duration reached at the pause instant
#[test]
fn given_paused_timer_when_time_passes_then_elapsed_frozen() {
    // Given: A timer paused after 4 seconds
    let t0 = Instant::now();
    let mut timer = RecordingTimer::start(t0, MAX);
    timer.pause(t0 + Duration::from_secs(4));

    // When: Reading long after the pause
    let elapsed = timer.elapsed(t0 + Duration::from_secs(60));

    // Then: Still 4 seconds
    assert_eq!(elapsed, Duration::from_secs(4));
    assert!(timer.is_paused());
}

/// WHAT: Repeated pause or resume calls are ignored
/// WHY: A second pause must not move the pause anchor forward
#[test]
fn given_double_pause_when_resuming_then_first_anchor_used() {
    // Given: A timer paused twice
    let t0 = Instant::now();
    let mut timer = RecordingTimer::start(t0, MAX);
    timer.pause(t0 + Duration::from_secs(1));
    timer.pause(t0 + Duration::from_secs(3));

    // When: Resuming twice
    timer.resume(t0 + Duration::from_secs(5));
    timer.resume(t0 + Duration::from_secs(8));

    // Then: Only the 1s..5s interval counts as paused
    assert_eq!(timer.paused_total(), Duration::from_secs(4));
    assert_eq!(
        timer.elapsed(t0 + Duration::from_secs(10)),
        Duration::from_secs(6)
    );
}

/// WHAT: Limit triggers only while running
/// WHY: A paused recording must never auto-stop
#[test]
fn given_timer_at_limit_when_paused_then_limit_not_reported() {
    // Given: A timer exactly at the cutoff
    let t0 = Instant::now();
    let mut timer = RecordingTimer::start(t0, MAX);
    let at_limit = t0 + MAX;

    // Then: Limit reached while running
    assert!(timer.limit_reached(at_limit));

    // When: Paused one tick earlier
    timer.pause(at_limit - Duration::from_millis(100));

    // Then: No limit while paused
    assert!(!timer.limit_reached(at_limit + Duration::from_secs(30)));
}

/// WHAT: Elapsed never goes negative
/// WHY: Readings taken with a stale instant must clamp to zero
#[test]
fn given_instant_before_start_when_reading_elapsed_then_zero() {
    // Given: A timer started one second in the future
    let t0 = Instant::now();
    let timer = RecordingTimer::start(t0 + Duration::from_secs(1), MAX);

    // When/Then: Reading at t0 clamps to zero
    assert_eq!(timer.elapsed(t0), Duration::ZERO);
}
