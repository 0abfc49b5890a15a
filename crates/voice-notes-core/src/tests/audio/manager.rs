use crate::{
    AudioError, RecorderSettings, RecordingManager, TickOutcome,
    tests::support::{Failure, FakeProvider, ManualClock, feed, tone},
};

use std::time::Duration;

fn recorder(provider: FakeProvider, clock: &ManualClock) -> RecordingManager<FakeProvider, ManualClock> {
    RecordingManager::with_clock(provider, clock.clone(), RecorderSettings::default())
}

/// WHAT: start() acquires the microphone and enters Recording
/// WHY: The happy path must open exactly one device
#[test]
#[allow(clippy::unwrap_used)]
fn given_idle_recorder_when_starting_then_recording_with_one_device() {
    // Given: An idle recorder
    let provider = FakeProvider::new(16_000);
    let log = provider.log();
    let clock = ManualClock::new();
    let mut recorder = recorder(provider, &clock);
    assert!(recorder.state().is_idle());

    // When: Starting
    recorder.start().unwrap();

    // Then: Recording, not paused, device open
    let state = recorder.state();
    assert!(state.is_recording);
    assert!(!state.is_paused);
    assert_eq!(state.duration, 0.0);
    assert_eq!(log.borrow().acquisitions, 1);
    assert!(log.borrow().open);
}

/// WHAT: start() while recording is rejected without a second acquisition
/// WHY: Only one recording may own the microphone
#[test]
#[allow(clippy::unwrap_used)]
fn given_recording_when_starting_again_then_rejected_without_acquiring() {
    // Given: A running recording
    let provider = FakeProvider::new(16_000);
    let log = provider.log();
    let clock = ManualClock::new();
    let mut recorder = recorder(provider, &clock);
    recorder.start().unwrap();

    // When: Starting again, also from Paused
    let first = recorder.start();
    recorder.pause();
    let second = recorder.start();

    // Then: Both rejected, still one acquisition
    assert!(matches!(first, Err(AudioError::AlreadyRecording { .. })));
    assert!(matches!(second, Err(AudioError::AlreadyRecording { .. })));
    assert_eq!(log.borrow().acquisitions, 1);
    assert!(recorder.state().is_paused);
}

/// WHAT: Permission failures leave the recorder idle
/// WHY: A denied prompt must not leak state or resources
#[test]
fn given_denied_permission_when_starting_then_idle_and_nothing_open() {
    // Given: A provider whose prompt is refused
    let provider = FakeProvider::failing(Failure::PermissionDenied);
    let log = provider.log();
    let clock = ManualClock::new();
    let mut recorder = recorder(provider, &clock);

    // When: Starting
    let result = recorder.start();

    // Then: PermissionDenied, idle, no device
    assert!(matches!(result, Err(AudioError::PermissionDenied { .. })));
    assert!(recorder.state().is_idle());
    assert!(!recorder.wants_frames());
    assert!(!log.borrow().open);
}

/// WHAT: Missing hardware surfaces as DeviceUnavailable
/// WHY: The UI distinguishes "no microphone" from "access refused"
#[test]
fn given_no_device_when_starting_then_device_unavailable() {
    // Given: A provider with no microphone
    let clock = ManualClock::new();
    let mut recorder = recorder(FakeProvider::failing(Failure::DeviceUnavailable), &clock);

    // When/Then: Start fails with DeviceUnavailable and stays idle
    assert!(matches!(
        recorder.start(),
        Err(AudioError::DeviceUnavailable { .. })
    ));
    assert_eq!(recorder.tick().ok(), Some(TickOutcome::Idle));
}

/// WHAT: stop() from Idle returns nothing and touches no device
/// WHY: Stray stop requests must be harmless
#[test]
#[allow(clippy::unwrap_used)]
fn given_idle_recorder_when_stopping_then_none_and_no_device_ops() {
    // Given: An idle recorder
    let provider = FakeProvider::new(16_000);
    let log = provider.log();
    let clock = ManualClock::new();
    let mut recorder = recorder(provider, &clock);

    // When: Stopping
    let result = recorder.stop().unwrap();

    // Then: No result and no device activity
    assert!(result.is_none());
    let log = log.borrow();
    assert_eq!(log.acquisitions, 0);
    assert_eq!(log.releases, 0);
}

/// WHAT: pause()/resume() outside their valid states are no-ops
/// WHY: Invalid transitions must not disturb state or the device
#[test]
#[allow(clippy::unwrap_used)]
fn given_invalid_states_when_pausing_or_resuming_then_no_op() {
    // Given: An idle recorder
    let provider = FakeProvider::new(16_000);
    let log = provider.log();
    let clock = ManualClock::new();
    let mut recorder = recorder(provider, &clock);

    // When/Then: Pause and resume from Idle do nothing
    assert!(!recorder.pause());
    assert!(!recorder.resume());
    assert!(recorder.state().is_idle());

    // When/Then: Resume while running does nothing
    recorder.start().unwrap();
    assert!(!recorder.resume());

    // When/Then: Second pause does nothing
    assert!(recorder.pause());
    assert!(!recorder.pause());
    assert_eq!(log.borrow().pauses, 1);
    assert_eq!(log.borrow().resumes, 0);
}

/// WHAT: Duration at stop excludes every paused interval
/// WHY: Reported length must match what was actually recorded
#[test]
#[allow(clippy::unwrap_used)]
fn given_pause_cycles_when_stopping_then_duration_excludes_pauses() {
    // Given: A recording with samples flowing
    let provider = FakeProvider::new(16_000);
    let log = provider.log();
    let clock = ManualClock::new();
    let mut recorder = recorder(provider, &clock);
    recorder.start().unwrap();

    // When: Run 2s, pause 5s, run 3s, pause 1s, run 0.5s
    feed(&log, &tone(32_000, 0.5));
    clock.advance(Duration::from_secs(2));
    recorder.tick().unwrap();
    recorder.pause();
    clock.advance(Duration::from_secs(5));
    assert_eq!(
        recorder.tick().unwrap(),
        TickOutcome::Paused { duration: 2.0 }
    );
    recorder.resume();
    feed(&log, &tone(48_000, 0.5));
    clock.advance(Duration::from_secs(3));
    assert_eq!(
        recorder.tick().unwrap(),
        TickOutcome::Running { duration: 5.0 }
    );
    recorder.pause();
    clock.advance(Duration::from_secs(1));
    recorder.resume();
    clock.advance(Duration::from_millis(500));
    let captured = recorder.stop().unwrap().unwrap();

    // Then: 5.5s active, state idle, device released
    assert!((captured.duration - 5.5).abs() < 1e-9);
    assert!(recorder.state().is_idle());
    assert_eq!(log.borrow().releases, 1);
    assert!(!log.borrow().open);
}

/// WHAT: Recording stops itself at the 300s cutoff
/// WHY: Bounded recordings; duration never exceeds the limit
#[allow(clippy::panic)]
#[test]
#[allow(clippy::unwrap_used)]
fn given_running_recording_when_cutoff_reached_then_auto_stops_at_limit() {
    // Given: A recording with some audio
    let provider = FakeProvider::new(16_000);
    let log = provider.log();
    let clock = ManualClock::new();
    let mut recorder = recorder(provider, &clock);
    recorder.start().unwrap();
    feed(&log, &tone(16_000, 0.3));

    // When: A tick arrives just past 300s
    clock.advance(Duration::from_millis(300_050));
    let outcome = recorder.tick().unwrap();

    // Then: Stopped with duration clamped to 300s, device released
    match outcome {
        TickOutcome::LimitReached(Some(captured)) => {
            assert_eq!(captured.duration, 300.0);
            assert!(!captured.payload.is_empty());
        }
        other => panic!("expected LimitReached, got {:?}", other),
    }
    assert!(recorder.state().is_idle());
    assert!(recorder.state().duration <= 300.0);
    assert!(!log.borrow().open);
}

/// WHAT: Paused time does not count toward the cutoff
/// WHY: Only active duration is bounded
#[test]
#[allow(clippy::unwrap_used)]
fn given_long_pause_when_ticking_then_no_auto_stop() {
    // Given: A recording paused after 10s
    let clock = ManualClock::new();
    let mut recorder = recorder(FakeProvider::new(16_000), &clock);
    recorder.start().unwrap();
    clock.advance(Duration::from_secs(10));
    recorder.pause();

    // When: Ten minutes pass while paused
    clock.advance(Duration::from_secs(600));
    let outcome = recorder.tick().unwrap();

    // Then: Still paused at 10s
    assert_eq!(outcome, TickOutcome::Paused { duration: 10.0 });
    assert!(recorder.state().is_recording);
}

/// WHAT: The live analysis loop produces no updates while paused
/// WHY: Waveform and level freeze at their last values
#[test]
#[allow(clippy::unwrap_used)]
fn given_paused_recording_when_frame_requested_then_no_update() {
    // Given: A recording with a live frame computed from a tone
    let provider = FakeProvider::new(16_000);
    let log = provider.log();
    let clock = ManualClock::new();
    let mut recorder = recorder(provider, &clock);
    recorder.start().unwrap();
    feed(&log, &tone(512, 0.8));
    assert!(recorder.frame());
    let before = recorder.state().clone();
    assert_eq!(before.waveform_data.len(), 50);
    assert!(before.audio_level > 0.0);

    // When: Paused, then louder audio arrives and a frame is requested
    recorder.pause();
    log.borrow_mut().recent = tone(512, 1.0);
    let ran = recorder.frame();

    // Then: Frame refused, scheduling off, snapshot frozen
    assert!(!ran);
    assert!(!recorder.wants_frames());
    assert_eq!(recorder.state().waveform_data, before.waveform_data);
    assert_eq!(recorder.state().audio_level, before.audio_level);

    // When: Resumed
    recorder.resume();

    // Then: Frames are wanted again
    assert!(recorder.wants_frames());
}

/// WHAT: Stop with no captured audio yields None but still releases
/// WHY: An empty recording is not a note, and the device must close
#[test]
#[allow(clippy::unwrap_used)]
fn given_recording_without_audio_when_stopping_then_none_and_released() {
    // Given: A recording that never received samples
    let provider = FakeProvider::new(16_000);
    let log = provider.log();
    let clock = ManualClock::new();
    let mut recorder = recorder(provider, &clock);
    recorder.start().unwrap();

    // When: Stopping
    let result = recorder.stop().unwrap();

    // Then: None, device released once
    assert!(result.is_none());
    assert_eq!(log.borrow().releases, 1);
}

/// WHAT: Dropping a recording manager releases the microphone
/// WHY: Abandoned recordings must never leave the device open
#[test]
#[allow(clippy::unwrap_used)]
fn given_active_recording_when_manager_dropped_then_device_released() {
    // Given: A running recording
    let provider = FakeProvider::new(16_000);
    let log = provider.log();
    let clock = ManualClock::new();
    {
        let mut recorder = recorder(provider, &clock);
        recorder.start().unwrap();
        feed(&log, &tone(1_600, 0.5));

        // When: The manager goes out of scope
    }

    // Then: Released exactly once
    assert_eq!(log.borrow().releases, 1);
    assert!(!log.borrow().open);
}

/// WHAT: abandon() returns to idle and releases the device
/// WHY: Navigating away must be equivalent to stop + close
#[test]
#[allow(clippy::unwrap_used)]
fn given_paused_recording_when_abandoned_then_idle_and_released() {
    // Given: A paused recording
    let provider = FakeProvider::new(16_000);
    let log = provider.log();
    let clock = ManualClock::new();
    let mut recorder = recorder(provider, &clock);
    recorder.start().unwrap();
    recorder.pause();

    // When: Abandoning twice
    recorder.abandon();
    recorder.abandon();

    // Then: Idle, released once, and a new recording can start
    assert!(recorder.state().is_idle());
    assert_eq!(log.borrow().releases, 1);
    recorder.start().unwrap();
    assert_eq!(log.borrow().acquisitions, 2);
}

/// WHAT: The live waveform is empty at start and filled by the first frame
/// WHY: Observers must not mistake an unanalysed recording for silence
#[test]
#[allow(clippy::unwrap_used)]
fn given_new_recording_when_first_frame_runs_then_waveform_goes_from_empty_to_full() {
    // Given: A recorder with audio waiting on the device
    let provider = FakeProvider::new(16_000);
    let log = provider.log();
    let clock = ManualClock::new();
    let mut recorder = recorder(provider, &clock);

    // When: Starting
    recorder.start().unwrap();

    // Then: No snapshot yet, but frames are wanted
    assert!(recorder.state().waveform_data.is_empty());
    assert_eq!(recorder.state().audio_level, 0.0);
    assert!(recorder.wants_frames());

    // When: The first frame runs over a tone
    feed(&log, &tone(512, 0.8));
    assert!(recorder.frame());

    // Then: Full-length snapshot
    assert_eq!(recorder.state().waveform_data.len(), 50);
}
