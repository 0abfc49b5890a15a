use crate::{PLAYBACK_RATES, PlaybackTrack, next_rate};

const EPSILON: f32 = 1e-6;

/// WHAT: Half speed interpolates between neighbouring samples
/// WHY: Slow playback must not repeat samples as audible steps
#[test]
fn given_half_speed_when_rendering_then_interpolated_until_end() {
    // Given: Two samples at 1 Hz, half speed
    let mut track = PlaybackTrack::new(vec![0.0, 1.0], 1);
    track.set_rate(0.5);

    // When: Rendering six frames
    let mut out = [9.0f32; 6];
    let rendered = track.render(&mut out);

    // Then: Ramp, hold, then silence once finished
    assert_eq!(rendered, 4);
    let expected = [0.0, 0.5, 1.0, 1.0, 0.0, 0.0];
    for (got, want) in out.iter().zip(expected) {
        assert!((got - want).abs() < EPSILON, "{:?}", out);
    }
    assert!(track.is_finished());
    assert_eq!(track.elapsed(), track.duration());
}

/// WHAT: A paused track renders silence without moving
/// WHY: Pause must resume from the same point
#[test]
fn given_paused_track_when_rendering_then_silence_and_playhead_held() {
    // Given: A track one frame in, then paused
    let mut track = PlaybackTrack::new(vec![0.25; 10], 10);
    let mut out = [0.0f32; 1];
    track.render(&mut out);
    track.set_paused(true);

    // When: Rendering while paused
    let mut held = [1.0f32; 4];
    let rendered = track.render(&mut held);

    // Then: Silent, playhead still at 0.1s
    assert_eq!(rendered, 0);
    assert!(held.iter().all(|&s| s == 0.0));
    assert!((track.elapsed() - 0.1).abs() < 1e-9);
}

/// WHAT: Seek and volume are clamped to their valid ranges
/// WHY: User input must never index outside the audio or amplify clipping
#[test]
fn given_out_of_range_input_when_seeking_and_setting_volume_then_clamped() {
    // Given: A 2 second track
    let mut track = PlaybackTrack::new(vec![0.5; 20], 10);

    // When / Then: Seeking past either end clamps
    track.seek(5.0);
    assert_eq!(track.elapsed(), 2.0);
    assert!(track.is_finished());
    track.seek(-3.0);
    assert_eq!(track.elapsed(), 0.0);
    track.seek(f64::NAN);
    assert_eq!(track.elapsed(), 0.0);

    // When / Then: Volume clamps to [0, 1] and scales output
    track.set_volume(3.0);
    assert_eq!(track.volume(), 1.0);
    track.set_volume(0.5);
    let mut out = [0.0f32; 1];
    track.render(&mut out);
    assert!((out[0] - 0.25).abs() < EPSILON);
}

/// WHAT: Speed cycles through the offered rates and wraps
/// WHY: A single speed control steps 0.5x to 2x and back
#[test]
fn given_rates_when_cycling_then_wraps_to_slowest() {
    // Given: Normal speed
    let mut rate = 1.0;

    // When: Cycling once per offered rate
    let mut seen = Vec::new();
    for _ in 0..PLAYBACK_RATES.len() {
        rate = next_rate(rate);
        seen.push(rate);
    }

    // Then: 1.25 first, back to 1.0 after a full cycle
    assert_eq!(seen, vec![1.25, 1.5, 2.0, 0.5, 0.75, 1.0]);
    assert_eq!(next_rate(3.3), 0.5);
}

/// WHAT: An empty track is finished with zero length
/// WHY: A note with no samples must not stall the player
#[test]
fn given_empty_track_when_rendering_then_finished_and_silent() {
    // Given: Nothing loaded
    let mut track = PlaybackTrack::empty();

    // When: Rendering
    let mut out = [1.0f32; 3];
    let rendered = track.render(&mut out);

    // Then: Silent and finished
    assert_eq!(rendered, 0);
    assert!(out.iter().all(|&s| s == 0.0));
    assert!(track.is_finished());
    assert_eq!(track.duration(), 0.0);
}
