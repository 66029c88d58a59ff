//! WAV Encoding
//!
//! Serializes a `Segment` into a canonical RIFF/WAVE byte stream: a fixed
//! 44-byte header (plain 16-byte `fmt ` chunk, never WAVE_FORMAT_EXTENSIBLE)
//! followed by interleaved little-endian samples.
//!
//! Two sample formats are produced:
//! - 16-bit signed PCM (format code 1), the default
//! - 32-bit IEEE float (format code 3)
//!
//! The whole stream is assembled in memory before it is handed out, so a
//! failed encode never leaves a truncated file behind.

use std::io::Write;

use tracing::debug;

use crate::engine::buffer::Segment;
use crate::error::{Result, SampleCutError};

/// Size of the canonical header in bytes
pub const WAV_HEADER_LEN: usize = 44;

/// Format code for integer PCM
pub const FORMAT_PCM: u16 = 1;

/// Format code for IEEE float
pub const FORMAT_IEEE_FLOAT: u16 = 3;

/// Options controlling how a segment is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeOptions {
    /// Write 32-bit float samples instead of 16-bit PCM
    pub use_float32: bool,
    /// Write only channel 0 unless the segment is exactly stereo
    ///
    /// Off by default: every channel is interleaved. Turning it on reproduces
    /// the older mono/stereo-only export where 3+ channel sources kept just
    /// their first channel.
    pub first_channel_only: bool,
}

impl EncodeOptions {
    /// 16-bit PCM
    pub fn pcm16() -> Self {
        Self::default()
    }

    /// 32-bit IEEE float
    pub fn float32() -> Self {
        Self {
            use_float32: true,
            ..Self::default()
        }
    }

    fn bits_per_sample(&self) -> u16 {
        if self.use_float32 {
            32
        } else {
            16
        }
    }

    fn audio_format(&self) -> u16 {
        if self.use_float32 {
            FORMAT_IEEE_FLOAT
        } else {
            FORMAT_PCM
        }
    }
}

// ============================================================================
// Header
// ============================================================================

/// The fields of a canonical 44-byte WAV header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub audio_format: u16,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub data_size: u32,
}

impl WavHeader {
    /// Bytes per single-channel sample
    pub fn bytes_per_sample(&self) -> u16 {
        self.bits_per_sample / 8
    }

    /// `NumChannels * bytesPerSample`
    pub fn block_align(&self) -> u16 {
        self.num_channels.wrapping_mul(self.bytes_per_sample())
    }

    /// `SampleRate * NumChannels * bytesPerSample`
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate.wrapping_mul(self.block_align() as u32)
    }

    /// Value of the RIFF ChunkSize field
    pub fn chunk_size(&self) -> u32 {
        self.data_size.wrapping_add(36)
    }

    /// Number of sample frames in the data chunk
    pub fn num_frames(&self) -> u32 {
        match self.block_align() {
            0 => 0,
            align => self.data_size / align as u32,
        }
    }

    fn write_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&self.chunk_size().to_le_bytes());
        out.extend_from_slice(b"WAVE");

        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&self.audio_format.to_le_bytes());
        out.extend_from_slice(&self.num_channels.to_le_bytes());
        out.extend_from_slice(&self.sample_rate.to_le_bytes());
        out.extend_from_slice(&self.byte_rate().to_le_bytes());
        out.extend_from_slice(&self.block_align().to_le_bytes());
        out.extend_from_slice(&self.bits_per_sample.to_le_bytes());

        out.extend_from_slice(b"data");
        out.extend_from_slice(&self.data_size.to_le_bytes());
    }

    /// Parse a canonical header from the start of `bytes`
    ///
    /// Only the exact layout produced by [`encode`] is accepted: RIFF/WAVE
    /// magic, a 16-byte `fmt ` chunk at offset 12 and a `data` chunk at
    /// offset 36.
    ///
    /// # Errors
    /// * `InvalidAudio` - If the bytes are too short or the layout differs
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < WAV_HEADER_LEN {
            return Err(invalid(format!(
                "WAV stream is {} bytes, shorter than the {}-byte header",
                bytes.len(),
                WAV_HEADER_LEN
            )));
        }

        expect_tag(bytes, 0, b"RIFF")?;
        expect_tag(bytes, 8, b"WAVE")?;
        expect_tag(bytes, 12, b"fmt ")?;
        expect_tag(bytes, 36, b"data")?;

        let fmt_size = read_u32(bytes, 16);
        if fmt_size != 16 {
            return Err(invalid(format!("unexpected fmt chunk size {}", fmt_size)));
        }

        let header = WavHeader {
            audio_format: read_u16(bytes, 20),
            num_channels: read_u16(bytes, 22),
            sample_rate: read_u32(bytes, 24),
            bits_per_sample: read_u16(bytes, 34),
            data_size: read_u32(bytes, 40),
        };

        if read_u32(bytes, 4) != header.chunk_size() {
            return Err(invalid("RIFF chunk size does not match data size"));
        }
        if read_u32(bytes, 28) != header.byte_rate() || read_u16(bytes, 32) != header.block_align()
        {
            return Err(invalid("byte rate or block align inconsistent with format"));
        }

        Ok(header)
    }
}

fn invalid(reason: impl Into<String>) -> SampleCutError {
    SampleCutError::InvalidAudio {
        reason: reason.into(),
    }
}

fn expect_tag(bytes: &[u8], offset: usize, tag: &[u8; 4]) -> Result<()> {
    if &bytes[offset..offset + 4] != tag {
        return Err(invalid(format!(
            "expected '{}' at offset {}",
            String::from_utf8_lossy(tag),
            offset
        )));
    }
    Ok(())
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

// ============================================================================
// Encoded Bytes
// ============================================================================

/// An encoded WAV stream
///
/// Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavBytes {
    bytes: Vec<u8>,
    header: WavHeader,
}

impl WavBytes {
    /// Header fields of this stream
    pub fn header(&self) -> &WavHeader {
        &self.header
    }

    /// The raw bytes, header included
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Only the sample data following the header
    pub fn data(&self) -> &[u8] {
        &self.bytes[WAV_HEADER_LEN..]
    }

    /// Total length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false for a successfully encoded stream
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Take ownership of the raw bytes
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for WavBytes {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Convert a float sample to 16-bit PCM
///
/// Clamps to [-1, 1], scales negatives by 32768 and the rest by 32767, then
/// truncates toward zero. NaN maps to 0.
#[inline]
pub fn f32_to_i16(sample: f32) -> i16 {
    if sample.is_nan() {
        return 0;
    }
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Encode a segment as a WAV byte stream
///
/// # Arguments
/// * `segment` - The samples to encode
/// * `options` - Sample format and channel handling
///
/// # Errors
/// * `EmptySegment` - If the segment has no channels or channel 0 is empty
/// * `InvalidAudio` - If the data would not fit in a 32-bit RIFF size field
///
/// # Example
/// ```
/// use samplecut::engine::{encode, EncodeOptions, Segment};
///
/// let segment = Segment::from_channels(8000, vec![vec![0.0; 16000]]).unwrap();
/// let wav = encode(&segment, EncodeOptions::default()).unwrap();
/// assert_eq!(wav.len(), 44 + 16000 * 2);
/// ```
pub fn encode(segment: &Segment, options: EncodeOptions) -> Result<WavBytes> {
    let frames = segment.len();
    if segment.channel_count() == 0 || frames == 0 {
        return Err(SampleCutError::EmptySegment);
    }

    let channels = output_channels(segment, options);
    let num_channels = u16::try_from(channels.len())
        .map_err(|_| invalid(format!("{} channels exceed the WAV limit", channels.len())))?;
    let bytes_per_sample = (options.bits_per_sample() / 8) as usize;
    let data_size = frames
        .checked_mul(channels.len() * bytes_per_sample)
        .and_then(|size| u32::try_from(size).ok())
        .filter(|size| size.checked_add(36).is_some())
        .ok_or_else(|| invalid("segment too large for a WAV file"))?;

    let header = WavHeader {
        audio_format: options.audio_format(),
        num_channels,
        sample_rate: segment.sample_rate(),
        bits_per_sample: options.bits_per_sample(),
        data_size,
    };

    let mut bytes = Vec::with_capacity(WAV_HEADER_LEN + data_size as usize);
    header.write_into(&mut bytes);

    for frame in 0..frames {
        for ch in &channels {
            let sample = ch[frame];
            if options.use_float32 {
                bytes.extend_from_slice(&sample.to_le_bytes());
            } else {
                bytes.extend_from_slice(&f32_to_i16(sample).to_le_bytes());
            }
        }
    }

    debug!(
        frames,
        channels = header.num_channels,
        bits = header.bits_per_sample,
        bytes = bytes.len(),
        "encoded WAV"
    );

    Ok(WavBytes { bytes, header })
}

/// Encode a segment and write the resulting stream to `writer`
///
/// Encoding completes in memory first; nothing is written if it fails.
pub fn encode_to_writer<W: Write>(
    segment: &Segment,
    options: EncodeOptions,
    mut writer: W,
) -> Result<WavHeader> {
    let wav = encode(segment, options)?;
    writer.write_all(wav.as_bytes())?;
    writer.flush()?;
    Ok(wav.header)
}

/// Channels to write, in interleave order
fn output_channels(segment: &Segment, options: EncodeOptions) -> Vec<&[f32]> {
    let count = segment.channel_count();
    if options.first_channel_only && count != 2 {
        return vec![segment.channel(0)];
    }
    (0..count).map(|ch| segment.channel(ch)).collect()
}

// ============================================================================
// Tests
// ============================================================================
