use crate::{AudioError, NOTE_ENVELOPE_POINTS, envelope_from_payload, summarize};

use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

#[allow(clippy::panic)]
fn wav(samples: &[i16]) -> Vec<u8> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = match WavWriter::new(&mut cursor, spec) {
            Ok(writer) => writer,
            Err(e) => panic!("writer: {e}"),
        };
        for &s in samples {
            if let Err(e) = writer.write_sample(s) {
                panic!("write: {e}");
            }
        }
        if let Err(e) = writer.finalize() {
            panic!("finalize: {e}");
        }
    }
    cursor.into_inner()
}

/// WHAT: The loudest block is normalized to exactly 1.0
/// WHY: Envelopes are drawn relative to their own peak
#[test]
fn given_varying_blocks_when_summarizing_then_peak_is_one() {
    // Given: Four blocks with mean amplitudes 0.1, 0.4, 0.2, 0.8 (mixed sign)
    let mut samples = Vec::new();
    for (i, amp) in [0.1f32, 0.4, 0.2, 0.8].into_iter().enumerate() {
        let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
        samples.extend(std::iter::repeat_n(amp * sign, 10));
    }

    // When: Summarizing to four points
    let envelope = summarize(&samples, 4);

    // Then: Relative to the loudest block
    assert_eq!(envelope.len(), 4);
    assert_eq!(envelope[3], 1.0);
    assert!((envelope[0] - 0.125).abs() < 1e-6);
    assert!((envelope[1] - 0.5).abs() < 1e-6);
    assert!((envelope[2] - 0.25).abs() < 1e-6);
}

/// WHAT: Silence summarizes to zeros
/// WHY: No division by a zero peak
#[test]
fn given_silence_when_summarizing_then_all_zero() {
    let envelope = summarize(&[0.0; 1_000], NOTE_ENVELOPE_POINTS);

    assert_eq!(envelope.len(), 100);
    assert!(envelope.iter().all(|&v| v == 0.0));
}

/// WHAT: Input shorter than the point count pads with zeros
/// WHY: Very short clips still produce a full-length envelope
#[test]
fn given_fewer_samples_than_points_when_summarizing_then_tail_zero() {
    // Given: Three samples, ten points
    let envelope = summarize(&[0.5, -1.0, 0.25], 10);

    // Then: One sample per block, remaining blocks zero
    assert_eq!(envelope.len(), 10);
    assert_eq!(&envelope[..3], &[0.5, 1.0, 0.25]);
    assert!(envelope[3..].iter().all(|&v| v == 0.0));
}

/// WHAT: The trailing partial block is ignored
/// WHY: Every point averages the same number of samples
#[test]
fn given_length_not_multiple_of_points_when_summarizing_then_remainder_dropped() {
    // Given: Ten quiet samples followed by one very loud straggler
    let mut samples = vec![0.2f32; 10];
    samples.push(1.0);

    // When: Summarizing to five points (block size 2)
    let envelope = summarize(&samples, 5);

    // Then: The straggler does not affect the peak
    assert_eq!(envelope, vec![1.0; 5]);
}

/// WHAT: Empty input and zero points are handled
/// WHY: Degenerate buffers must not panic
#[test]
fn given_degenerate_inputs_when_summarizing_then_no_panic() {
    assert_eq!(summarize(&[], 4), vec![0.0; 4]);
    assert!(summarize(&[0.3; 8], 0).is_empty());
}

/// WHAT: A WAV payload is decoded and summarized
/// WHY: Saved notes carry an envelope of their real audio
#[test]
#[allow(clippy::unwrap_used)]
fn given_wav_payload_when_building_envelope_then_shape_follows_audio() {
    // Given: Half silence, half loud
    let mut samples = vec![0i16; 800];
    samples.extend(std::iter::repeat_n(16_000i16, 800));

    // When: Building a 100-point envelope
    let envelope = envelope_from_payload(&wav(&samples), NOTE_ENVELOPE_POINTS).unwrap();

    // Then: First half flat, second half at peak
    assert_eq!(envelope.len(), 100);
    assert!(envelope[..50].iter().all(|&v| v == 0.0));
    assert!(envelope[50..].iter().all(|&v| (v - 1.0).abs() < 1e-6));
}

/// WHAT: Undecodable payloads surface DecodeFailure
/// WHY: The library falls back to a placeholder envelope
#[test]
fn given_garbage_payload_when_building_envelope_then_decode_failure() {
    let result = envelope_from_payload(b"definitely not audio", NOTE_ENVELOPE_POINTS);

    assert!(matches!(result, Err(AudioError::DecodeFailure { .. })));
}
