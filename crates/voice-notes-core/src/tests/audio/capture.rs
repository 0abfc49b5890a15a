use crate::{
    AudioError, CaptureConstraints, CpalProvider, DeviceProvider, InputDevice,
    audio::capture::{CaptureBuffers, MAX_BUFFER_SAMPLES, RECENT_CAPACITY, classify_backend_error},
};

use std::sync::{Arc, Mutex};

/// WHAT: Pending samples respect MAX_BUFFER_SAMPLES
/// WHY: Prevents unbounded memory growth if the collector stalls
#[test]
fn given_pending_at_max_capacity_when_pushing_block_then_oldest_discarded() {
    // Given: Buffers with pending full of 0.0
    let mut buffers = CaptureBuffers::default();
    buffers.push_block(std::iter::repeat_n(0.0f32, MAX_BUFFER_SAMPLES));
    assert_eq!(buffers.pending.len(), MAX_BUFFER_SAMPLES);

    // When: Pushing 1024 new samples (value 1.0) beyond the limit
    buffers.push_block(std::iter::repeat_n(1.0f32, 1024));

    // Then: Pending stays at MAX_BUFFER_SAMPLES and the newest samples survive
    assert_eq!(buffers.pending.len(), MAX_BUFFER_SAMPLES);
    assert!((buffers.pending[MAX_BUFFER_SAMPLES - 1] - 1.0).abs() < f32::EPSILON);
    assert!((buffers.pending[MAX_BUFFER_SAMPLES - 1024] - 1.0).abs() < f32::EPSILON);
    assert!(buffers.pending[MAX_BUFFER_SAMPLES - 1025].abs() < f32::EPSILON);
}

/// WHAT: The analysis ring keeps only the most recent samples
/// WHY: Live analysis needs the latest window, not the whole recording
#[test]
fn given_many_blocks_when_pushing_then_recent_bounded_and_newest_last() {
    // Given: Empty buffers
    let mut buffers = CaptureBuffers::default();

    // When: Pushing ascending values well past the ring capacity
    buffers.push_block((0..(RECENT_CAPACITY * 3)).map(|i| i as f32));

    // Then: Ring holds exactly the last RECENT_CAPACITY samples
    assert_eq!(buffers.recent.len(), RECENT_CAPACITY);
    assert_eq!(buffers.recent.back().copied(), Some((RECENT_CAPACITY * 3 - 1) as f32));
    assert_eq!(buffers.recent.front().copied(), Some((RECENT_CAPACITY * 2) as f32));
    assert_eq!(buffers.pending.len(), RECENT_CAPACITY * 3);
}

/// WHAT: Lock poison recovery preserves buffered samples
/// WHY: The callback recovers a poisoned lock rather than losing audio
#[allow(clippy::panic)]
#[test]
fn given_poisoned_mutex_when_recovering_then_samples_preserved() {
    // Given: Shared buffers poisoned by a panic while holding the lock
    let shared = Arc::new(Mutex::new(CaptureBuffers::default()));
    shared
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .push_block(std::iter::repeat_n(0.5f32, 100));
    let clone = Arc::clone(&shared);

    let _ = std::thread::spawn(move || {
        let _guard = clone.lock().unwrap_or_else(|e| e.into_inner());
        panic!("intentional panic to poison mutex");
    })
    .join();

    // When: Recovering the poisoned lock
    let recovered = shared.lock().unwrap_or_else(|e| e.into_inner());

    // Then: All samples are still there
    assert_eq!(recovered.pending.len(), 100);
    assert!(recovered.pending.iter().all(|&s| (s - 0.5).abs() < f32::EPSILON));
}

/// WHAT: Concurrent callbacks produce a consistent buffer
/// WHY: Validates the shared buffer under callback contention
#[test]
fn given_concurrent_writers_when_pushing_blocks_then_no_corruption() {
    // Given: Shared buffers
    let shared = Arc::new(Mutex::new(CaptureBuffers::default()));
    let mut handles = vec![];

    // When: 4 threads push 1000 blocks of 48 samples each
    for i in 0..4u8 {
        let clone = Arc::clone(&shared);
        handles.push(std::thread::spawn(move || {
            for _ in 0..1000 {
                let mut b = clone.lock().unwrap_or_else(|e| e.into_inner());
                b.push_block(std::iter::repeat_n(f32::from(i), 48));
            }
        }));
    }

    for h in handles {
        let _ = h.join();
    }

    // Then: Every sample arrived and the ring is bounded
    let b = shared.lock().unwrap_or_else(|e| e.into_inner());
    assert_eq!(b.pending.len(), 4 * 1000 * 48);
    assert_eq!(b.recent.len(), RECENT_CAPACITY);
    assert!(b.pending.iter().all(|s| s.is_finite()));
}

/// WHAT: Backend errors mentioning access are classified as PermissionDenied
/// WHY: The UI shows a different message for refused access
#[test]
fn given_backend_error_texts_when_classifying_then_permission_or_unavailable() {
    // Given/When: Several backend error strings
    let denied = [
        "Permission denied (os error 13)",
        "Access DENIED by policy",
        "Microphone access not authorized",
    ];
    let unavailable = ["The requested device is no longer available", "ALSA lib error"];

    // Then: Access errors map to PermissionDenied, the rest to DeviceUnavailable
    for reason in denied {
        assert!(
            matches!(
                classify_backend_error(reason.to_string()),
                AudioError::PermissionDenied { .. }
            ),
            "{reason}"
        );
    }
    for reason in unavailable {
        assert!(
            matches!(
                classify_backend_error(reason.to_string()),
                AudioError::DeviceUnavailable { .. }
            ),
            "{reason}"
        );
    }
}

/// WHAT: Default constraints request voice processing
/// WHY: Echo cancellation, noise suppression and gain control are on by default
#[test]
fn given_default_constraints_then_processing_flags_enabled() {
    let constraints = CaptureConstraints::default();

    assert!(constraints.device_name.is_none());
    assert!(constraints.echo_cancellation);
    assert!(constraints.noise_suppression);
    assert!(constraints.auto_gain_control);
}

/// WHAT: A real microphone can be acquired, read and released
/// WHY: Validates the cpal stream wiring on hardware
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
#[allow(clippy::unwrap_used)]
fn given_default_microphone_when_acquiring_then_samples_flow_and_release_is_idempotent() {
    // Given: The platform host
    let provider = CpalProvider::new();

    // When: Acquiring, waiting, draining
    let mut input = provider.acquire(&CaptureConstraints::default()).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(300));
    let samples = input.drain().unwrap();

    // Then: Audio arrived at the reported rate and release can repeat
    assert!(input.sample_rate() > 0);
    assert!(!samples.is_empty());
    input.release();
    input.release();
}
