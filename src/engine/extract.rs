//! Segment Extraction
//!
//! Cuts a channel-aligned `[start, end)` excerpt out of a `DecodedAudio`.
//! Both sample-index bounds are truncated with `floor` once and shared by all
//! channels, so extracted channels stay time-aligned and repeated calls with
//! the same input copy exactly the same samples.

use tracing::debug;

use crate::engine::buffer::{DecodedAudio, Segment};
use crate::engine::range::TimeRange;
use crate::error::{Result, SampleCutError};

/// Extract the samples covered by `range`
///
/// # Arguments
/// * `audio` - The loaded recording, or `None` if nothing is loaded
/// * `range` - Requested selection; missing bounds default to the recording
///   edges and out-of-range bounds are clamped
///
/// # Errors
/// * `NoAudioLoaded` - If `audio` is `None`
/// * `InvalidRange` - If the clamped end is not after the clamped start, or
///   the range is narrower than a single sample
///
/// # Example
/// ```
/// use samplecut::engine::{extract, DecodedAudio, TimeRange};
///
/// let audio = DecodedAudio::new(8000, vec![vec![0.0; 32000]]).unwrap();
/// let segment = extract(Some(&audio), TimeRange::between(1.0, 3.0)).unwrap();
/// assert_eq!(segment.len(), 16000);
/// ```
pub fn extract(audio: Option<&DecodedAudio>, range: TimeRange) -> Result<Segment> {
    let audio = audio.ok_or(SampleCutError::NoAudioLoaded)?;

    let (start_secs, end_secs) = range.resolve(audio.duration_secs());
    if end_secs <= start_secs {
        debug!(%range, start_secs, end_secs, "rejected empty or inverted range");
        return Err(SampleCutError::InvalidRange {
            start_secs,
            end_secs,
        });
    }

    let start_frame = audio.frame_at(start_secs);
    let end_frame = audio.frame_at(end_secs);
    if end_frame <= start_frame {
        debug!(%range, start_frame, end_frame, "range narrower than one sample");
        return Err(SampleCutError::InvalidRange {
            start_secs,
            end_secs,
        });
    }

    let segment = Segment::cut(
        audio.sample_rate(),
        copy_frames(audio, start_frame, end_frame),
        start_secs,
        end_secs,
        start_frame,
    );

    debug!(
        start_frame,
        end_frame,
        channels = segment.channel_count(),
        "extracted segment"
    );

    Ok(segment)
}

/// Extract samples `[start_frame, end_frame)` by index
///
/// `end_frame` is clamped to the recording length.
///
/// # Errors
/// * `NoAudioLoaded` - If `audio` is `None`
/// * `InvalidRange` - If the clamped range is empty
pub fn extract_frames(
    audio: Option<&DecodedAudio>,
    start_frame: usize,
    end_frame: usize,
) -> Result<Segment> {
    let audio = audio.ok_or(SampleCutError::NoAudioLoaded)?;

    let rate = audio.sample_rate() as f64;
    let end_frame = end_frame.min(audio.total_samples());
    if end_frame <= start_frame {
        return Err(SampleCutError::InvalidRange {
            start_secs: start_frame as f64 / rate,
            end_secs: end_frame as f64 / rate,
        });
    }

    Ok(Segment::cut(
        audio.sample_rate(),
        copy_frames(audio, start_frame, end_frame),
        start_frame as f64 / rate,
        end_frame as f64 / rate,
        start_frame,
    ))
}

fn copy_frames(audio: &DecodedAudio, start_frame: usize, end_frame: usize) -> Vec<Vec<f32>> {
    audio
        .channels()
        .iter()
        .map(|ch| ch[start_frame..end_frame].to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::buffer::generate_index_ramp;
    use pretty_assertions::assert_eq;

    fn mono_8k_4s() -> DecodedAudio {
        generate_index_ramp(32000, 8000, 1).unwrap()
    }

    #[test]
    fn test_no_audio_loaded() {
        let result = extract(None, TimeRange::between(0.0, 1.0));
        assert!(matches!(result, Err(SampleCutError::NoAudioLoaded)));
    }

    #[test]
    fn test_concrete_scenario() {
        let audio = mono_8k_4s();
        let segment = extract(Some(&audio), TimeRange::between(1.0, 3.0)).unwrap();

        assert_eq!(segment.len(), 16000);
        assert_eq!(segment.channel_count(), 1);
        assert_eq!(segment.sample_rate(), 8000);
        assert_eq!(segment.start_sample(), 8000);
        assert_eq!(segment.channel(0)[0], 8000.0);
        assert_eq!(segment.channel(0)[15999], 23999.0);
    }

    #[test]
    fn test_clamp_law() {
        let audio = mono_8k_4s();
        let clamped = extract(Some(&audio), TimeRange::between(-5.0, 1e9)).unwrap();
        let full = extract(
            Some(&audio),
            TimeRange::between(0.0, audio.duration_secs()),
        )
        .unwrap();
        assert_eq!(clamped, full);
        assert_eq!(clamped.len(), audio.total_samples());
    }

    #[test]
    fn test_missing_bounds_cover_everything() {
        let audio = mono_8k_4s();
        let segment = extract(Some(&audio), TimeRange::full()).unwrap();
        assert_eq!(segment.channel(0), audio.channel(0));
    }

    #[test]
    fn test_invalid_range_inverted() {
        let audio = mono_8k_4s();
        let result = extract(Some(&audio), TimeRange::between(3.0, 1.0));
        assert!(matches!(result, Err(SampleCutError::InvalidRange { .. })));
    }

    #[test]
    fn test_invalid_range_zero_width() {
        let audio = mono_8k_4s();
        let result = extract(Some(&audio), TimeRange::between(2.0, 2.0));
        assert!(matches!(result, Err(SampleCutError::InvalidRange { .. })));
    }

    #[test]
    fn test_invalid_range_start_past_end_of_audio() {
        let audio = mono_8k_4s();
        let result = extract(Some(&audio), TimeRange::between(5.0, 6.0));
        assert!(matches!(result, Err(SampleCutError::InvalidRange { .. })));
    }

    #[test]
    fn test_invalid_range_negative_end() {
        let audio = mono_8k_4s();
        let result = extract(Some(&audio), TimeRange::new(None, Some(-1.0)));
        assert!(matches!(result, Err(SampleCutError::InvalidRange { .. })));
    }

    #[test]
    fn test_sub_sample_range_rejected() {
        let audio = mono_8k_4s();
        // Both bounds land on sample 8000
        let result = extract(Some(&audio), TimeRange::between(1.0, 1.00001));
        assert!(matches!(result, Err(SampleCutError::InvalidRange { .. })));
    }

    #[test]
    fn test_channels_stay_aligned() {
        let audio = generate_index_ramp(1000, 100, 3).unwrap();
        let segment = extract(Some(&audio), TimeRange::between(0.257, 7.519)).unwrap();

        assert_eq!(segment.channel_count(), 3);
        assert_eq!(segment.start_sample(), 25);
        assert_eq!(segment.len(), 751 - 25);
        for ch in 0..3 {
            assert_eq!(segment.channel(ch)[0], (ch * 1_000_000 + 25) as f32);
            assert_eq!(segment.channel(ch).len(), segment.len());
        }
    }

    #[test]
    fn test_deterministic() {
        let audio = generate_index_ramp(44100, 44100, 2).unwrap();
        let range = TimeRange::between(0.1234, 0.9876);
        let first = extract(Some(&audio), range).unwrap();
        let second = extract(Some(&audio), range).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_source_untouched() {
        let audio = mono_8k_4s();
        let before = audio.clone();
        let _ = extract(Some(&audio), TimeRange::between(1.0, 2.0)).unwrap();
        assert_eq!(audio, before);
    }

    #[test]
    fn test_extract_frames() {
        let audio = mono_8k_4s();
        let segment = extract_frames(Some(&audio), 100, 200).unwrap();
        assert_eq!(segment.len(), 100);
        assert_eq!(segment.channel(0)[0], 100.0);
        assert_eq!(segment.start_secs(), 100.0 / 8000.0);
    }

    #[test]
    fn test_extract_frames_clamps_end() {
        let audio = mono_8k_4s();
        let segment = extract_frames(Some(&audio), 31990, usize::MAX).unwrap();
        assert_eq!(segment.len(), 10);
    }

    #[test]
    fn test_extract_frames_empty() {
        let audio = mono_8k_4s();
        let result = extract_frames(Some(&audio), 200, 200);
        assert!(matches!(result, Err(SampleCutError::InvalidRange { .. })));
    }
}
