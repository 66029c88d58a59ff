//! Audio Buffer Types
//!
//! Provides the in-memory PCM types shared by the extraction, encoding and
//! transport stages:
//! - `DecodedAudio`: a whole recording as produced by a decoder
//! - `Segment`: a channel-aligned excerpt cut out of a `DecodedAudio`
//!
//! Both store non-interleaved 32-bit float samples, one `Vec<f32>` per channel.

use crate::error::{Result, SampleCutError};

// ============================================================================
// Decoded Audio
// ============================================================================

/// A complete decoded recording
///
/// Immutable once constructed. The constructor enforces the invariants every
/// later stage relies on: at least one channel, a positive sample rate and
/// equal-length channels.
///
/// # Example
/// ```
/// use samplecut::engine::DecodedAudio;
///
/// let audio = DecodedAudio::new(8000, vec![vec![0.0; 16000]]).unwrap();
/// assert_eq!(audio.channel_count(), 1);
/// assert_eq!(audio.duration_secs(), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl DecodedAudio {
    /// Create decoded audio from per-channel sample vectors
    ///
    /// # Errors
    /// * `InvalidAudio` - If the sample rate is zero, there are no channels,
    ///   or the channels differ in length
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(SampleCutError::InvalidAudio {
                reason: "sample rate must be positive".to_string(),
            });
        }

        let Some(first) = channels.first() else {
            return Err(SampleCutError::InvalidAudio {
                reason: "audio must have at least one channel".to_string(),
            });
        };

        let expected = first.len();
        if let Some((index, ch)) = channels
            .iter()
            .enumerate()
            .find(|(_, ch)| ch.len() != expected)
        {
            return Err(SampleCutError::InvalidAudio {
                reason: format!(
                    "channel {} has {} samples, expected {}",
                    index,
                    ch.len(),
                    expected
                ),
            });
        }

        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Create decoded audio from interleaved sample data
    ///
    /// # Arguments
    /// * `interleaved` - Interleaved sample data (L, R, L, R, ... for stereo)
    /// * `channel_count` - Number of interleaved channels
    /// * `sample_rate` - Sample rate in Hz
    pub fn from_interleaved(
        interleaved: &[f32],
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<Self> {
        if channel_count == 0 {
            return Err(SampleCutError::InvalidAudio {
                reason: "audio must have at least one channel".to_string(),
            });
        }

        if interleaved.len() % channel_count != 0 {
            return Err(SampleCutError::InvalidAudio {
                reason: format!(
                    "interleaved data length {} is not divisible by channel count {}",
                    interleaved.len(),
                    channel_count
                ),
            });
        }

        let frames = interleaved.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];

        for frame in interleaved.chunks_exact(channel_count) {
            for (ch, &sample) in frame.iter().enumerate() {
                channels[ch].push(sample);
            }
        }

        Self::new(sample_rate, channels)
    }

    /// Sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels (always at least 1)
    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel
    #[inline]
    pub fn total_samples(&self) -> usize {
        self.channels[0].len()
    }

    /// Duration in seconds (`total_samples / sample_rate`)
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        self.total_samples() as f64 / self.sample_rate as f64
    }

    /// Get immutable access to a channel's samples
    ///
    /// # Panics
    /// Panics if the channel index is out of bounds
    #[inline]
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// All channels, in order
    #[inline]
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Convert a time in seconds to a sample index, truncating toward zero
    ///
    /// The result is clamped to `total_samples`, and any time at or past the
    /// end of the recording maps exactly to `total_samples`.
    pub fn frame_at(&self, secs: f64) -> usize {
        if secs >= self.duration_secs() {
            return self.total_samples();
        }
        let frame = (secs * self.sample_rate as f64).floor();
        if frame <= 0.0 {
            0
        } else {
            (frame as usize).min(self.total_samples())
        }
    }
}

// ============================================================================
// Segment
// ============================================================================

/// A time-bounded, channel-aligned excerpt of a `DecodedAudio`
///
/// Owned by whoever requested the extraction. All channels have the same
/// length, and the segment remembers where it was cut from.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
    start_secs: f64,
    end_secs: f64,
    start_sample: usize,
}

impl Segment {
    /// Build a segment directly from channel data
    ///
    /// The segment may be empty (no channels, or zero-length channels); the
    /// encoder rejects those with `EmptySegment`.
    ///
    /// # Errors
    /// * `InvalidAudio` - If the sample rate is zero or the channels differ
    ///   in length
    pub fn from_channels(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(SampleCutError::InvalidAudio {
                reason: "sample rate must be positive".to_string(),
            });
        }

        let len = channels.first().map(Vec::len).unwrap_or(0);
        if let Some((index, ch)) = channels.iter().enumerate().find(|(_, ch)| ch.len() != len) {
            return Err(SampleCutError::InvalidAudio {
                reason: format!("channel {} has {} samples, expected {}", index, ch.len(), len),
            });
        }

        Ok(Self {
            sample_rate,
            channels,
            start_secs: 0.0,
            end_secs: len as f64 / sample_rate as f64,
            start_sample: 0,
        })
    }

    pub(crate) fn cut(
        sample_rate: u32,
        channels: Vec<Vec<f32>>,
        start_secs: f64,
        end_secs: f64,
        start_sample: usize,
    ) -> Self {
        Self {
            sample_rate,
            channels,
            start_secs,
            end_secs,
            start_sample,
        }
    }

    /// Sample rate in Hz, copied from the source
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels, copied from the source
    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel
    #[inline]
    pub fn len(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    /// Check if the segment has no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Duration of the segment in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.len() as f64 / self.sample_rate as f64
    }

    /// Clamped start of the range this segment was cut from
    pub fn start_secs(&self) -> f64 {
        self.start_secs
    }

    /// Clamped end of the range this segment was cut from
    pub fn end_secs(&self) -> f64 {
        self.end_secs
    }

    /// Index of the first source sample copied into this segment
    pub fn start_sample(&self) -> usize {
        self.start_sample
    }

    /// Get immutable access to a channel's samples
    ///
    /// # Panics
    /// Panics if the channel index is out of bounds
    #[inline]
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// All channels, in order
    #[inline]
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }
}

// ============================================================================
// Test Signals
// ============================================================================

/// Generate a sine tone with the same signal on every channel
///
/// Useful for exercising the extraction and encoding pipeline without a
/// decoder.
pub fn generate_test_tone(
    frequency: f32,
    duration_secs: f32,
    sample_rate: u32,
    channel_count: usize,
) -> Result<DecodedAudio> {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sample_rate as f32;

    let tone: Vec<f32> = (0..num_samples)
        .map(|i| (angular_freq * i as f32).sin())
        .collect();

    DecodedAudio::new(sample_rate, vec![tone; channel_count])
}

/// Generate a ramp where every sample encodes its own index
///
/// Channel `c` holds `c * 1_000_000 + i` at index `i`, which makes it easy to
/// check exactly which samples an operation copied.
pub fn generate_index_ramp(
    num_samples: usize,
    sample_rate: u32,
    channel_count: usize,
) -> Result<DecodedAudio> {
    let channels = (0..channel_count)
        .map(|c| (0..num_samples).map(|i| (c * 1_000_000 + i) as f32).collect())
        .collect();
    DecodedAudio::new(sample_rate, channels)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_zero_sample_rate() {
        let result = DecodedAudio::new(0, vec![vec![0.0; 10]]);
        assert!(matches!(result, Err(SampleCutError::InvalidAudio { .. })));
    }

    #[test]
    fn test_new_rejects_no_channels() {
        let result = DecodedAudio::new(44100, Vec::new());
        assert!(matches!(result, Err(SampleCutError::InvalidAudio { .. })));
    }

    #[test]
    fn test_new_rejects_ragged_channels() {
        let result = DecodedAudio::new(44100, vec![vec![0.0; 10], vec![0.0; 9]]);
        match result {
            Err(SampleCutError::InvalidAudio { reason }) => {
                assert!(reason.contains("channel 1"));
            }
            other => panic!("Expected InvalidAudio, got: {:?}", other),
        }
    }

    #[test]
    fn test_duration() {
        let audio = DecodedAudio::new(8000, vec![vec![0.0; 32000]]).unwrap();
        assert_eq!(audio.total_samples(), 32000);
        assert_eq!(audio.duration_secs(), 4.0);
    }

    #[test]
    fn test_from_interleaved() {
        let audio =
            DecodedAudio::from_interleaved(&[1.0, 5.0, 2.0, 6.0, 3.0, 7.0], 2, 48000).unwrap();
        assert_eq!(audio.channel(0), &[1.0, 2.0, 3.0]);
        assert_eq!(audio.channel(1), &[5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_from_interleaved_bad_length() {
        let result = DecodedAudio::from_interleaved(&[1.0, 2.0, 3.0], 2, 48000);
        assert!(result.is_err());
    }

    #[test]
    fn test_frame_at_truncates() {
        let audio = DecodedAudio::new(10, vec![vec![0.0; 100]]).unwrap();
        assert_eq!(audio.frame_at(0.0), 0);
        assert_eq!(audio.frame_at(0.19), 1);
        assert_eq!(audio.frame_at(2.5), 25);
        assert_eq!(audio.frame_at(-3.0), 0);
    }

    #[test]
    fn test_frame_at_end_is_total_samples() {
        // 44101 / 44100 * 44100 is not exactly representable
        let audio = DecodedAudio::new(44100, vec![vec![0.0; 44101]]).unwrap();
        assert_eq!(audio.frame_at(audio.duration_secs()), 44101);
        assert_eq!(audio.frame_at(1e9), 44101);
    }

    #[test]
    fn test_segment_from_channels() {
        let segment =
            Segment::from_channels(8000, vec![vec![0.0; 4000], vec![0.0; 4000]]).unwrap();
        assert_eq!(segment.len(), 4000);
        assert_eq!(segment.channel_count(), 2);
        assert_eq!(segment.duration_secs(), 0.5);
        assert_eq!(segment.end_secs(), 0.5);
    }

    #[test]
    fn test_empty_segment() {
        let segment = Segment::from_channels(8000, vec![Vec::new()]).unwrap();
        assert!(segment.is_empty());
        let segment = Segment::from_channels(8000, Vec::new()).unwrap();
        assert!(segment.is_empty());
    }

    #[test]
    fn test_segment_rejects_ragged_channels() {
        let result = Segment::from_channels(8000, vec![vec![0.0; 10], vec![0.0; 5]]);
        assert!(matches!(result, Err(SampleCutError::InvalidAudio { .. })));
    }

    #[test]
    fn test_segment_rejects_zero_sample_rate() {
        let result = Segment::from_channels(0, vec![vec![0.0; 10]]);
        assert!(matches!(result, Err(SampleCutError::InvalidAudio { .. })));
    }

    #[test]
    fn test_generate_test_tone() {
        let audio = generate_test_tone(440.0, 0.5, 48000, 2).unwrap();
        assert_eq!(audio.total_samples(), 24000);
        assert_eq!(audio.channel_count(), 2);
        assert_eq!(audio.channel(0), audio.channel(1));
    }

    #[test]
    fn test_generate_index_ramp() {
        let audio = generate_index_ramp(5, 10, 2).unwrap();
        assert_eq!(audio.channel(0), &[0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(audio.channel(1)[2], 1_000_002.0);
    }
}
