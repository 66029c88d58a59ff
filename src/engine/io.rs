//! Audio I/O collaborators for Samplecut
//!
//! Decoding raw input into `DecodedAudio` and persisting encoded WAV bytes sit
//! at the edges of the engine, behind two traits:
//! - `AudioDecoder`: raw bytes in, `DecodedAudio` out. `WavDecoder` handles
//!   WAV files through `hound`; other containers plug in their own decoder.
//! - `ExportSink`: receives finished `WavBytes` and a filename.
//!   `DirectorySink` writes them into a directory.

use std::ffi::OsStr;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use hound::{SampleFormat, WavReader};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::engine::buffer::DecodedAudio;
use crate::engine::wav::WavBytes;
use crate::error::{Result, SampleCutError};

// ============================================================================
// Decoding
// ============================================================================

/// Turns raw file bytes into PCM
pub trait AudioDecoder: Send + Sync {
    /// # Errors
    /// * `DecodeFailure` - If the bytes cannot be decoded
    fn decode(&self, bytes: &[u8]) -> Result<DecodedAudio>;
}

/// Decoder for RIFF/WAVE input, any channel count
///
/// Accepts 8/16/24/32-bit integer and 32-bit float samples and keeps the
/// source sample rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder;

impl AudioDecoder for WavDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedAudio> {
        let reader =
            WavReader::new(Cursor::new(bytes)).map_err(|e| decode_failure("open WAV", e))?;

        let spec = reader.spec();
        let channel_count = spec.channels as usize;
        let samples = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;

        debug!(
            sample_rate = spec.sample_rate,
            channels = channel_count,
            bits = spec.bits_per_sample,
            "decoded WAV input"
        );

        DecodedAudio::from_interleaved(&samples, channel_count, spec.sample_rate).map_err(|e| {
            SampleCutError::DecodeFailure {
                reason: e.to_string(),
                source: Some(Box::new(e)),
            }
        })
    }
}

/// Read a file and decode it
///
/// # Errors
/// * `Io` - If the file cannot be read
/// * `DecodeFailure` - If the decoder rejects its contents
pub fn decode_file(decoder: &dyn AudioDecoder, path: &Path) -> Result<DecodedAudio> {
    let bytes = fs::read(path)?;
    decoder.decode(&bytes)
}

/// Decode on the blocking thread pool so the calling task can suspend
pub async fn decode_in_background(
    decoder: Arc<dyn AudioDecoder>,
    bytes: Vec<u8>,
) -> Result<DecodedAudio> {
    tokio::task::spawn_blocking(move || decoder.decode(&bytes))
        .await
        .map_err(|e| decode_failure("join decode task", e))?
}

fn decode_failure<E>(what: &str, e: E) -> SampleCutError
where
    E: std::error::Error + Send + Sync + 'static,
{
    SampleCutError::DecodeFailure {
        reason: format!("failed to {}: {}", what, e),
        source: Some(Box::new(e)),
    }
}

/// Read samples from WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    let samples: hound::Result<Vec<f32>> = match (sample_format, bits_per_sample) {
        (SampleFormat::Float, _) => reader.samples::<f32>().collect(),
        // hound hands 8-bit data over already shifted to signed
        (SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|v| v as f32 / 128.0))
            .collect(),
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect(),
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8388608.0))
            .collect(),
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 2147483648.0))
            .collect(),
        (SampleFormat::Int, bits) => {
            return Err(SampleCutError::DecodeFailure {
                reason: format!("unsupported {}-bit integer audio", bits),
                source: None,
            })
        }
    };

    samples.map_err(|e| decode_failure("read samples", e))
}

// ============================================================================
// Export
// ============================================================================

/// Where an export ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReceipt {
    pub path: PathBuf,
    pub size_bytes: u64,
    /// Hex SHA-256 of the written bytes
    pub sha256: String,
    pub created_at: DateTime<Utc>,
}

/// Receives finished WAV bytes and offers them to the user
pub trait ExportSink {
    fn export(&self, wav: &WavBytes, filename: &str) -> Result<ExportReceipt>;
}

/// Writes exports into a directory
///
/// Each file is written to a temporary name first and renamed into place, so
/// a reader never sees a half-written WAV.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for DirectorySink {
    fn export(&self, wav: &WavBytes, filename: &str) -> Result<ExportReceipt> {
        let path = self.dir.join(filename);
        if filename.is_empty() || Path::new(filename).file_name() != Some(OsStr::new(filename)) {
            return Err(SampleCutError::ExportFailed {
                path,
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "filename must be a bare file name",
                ),
            });
        }

        write_atomic(&path, wav.as_bytes())?;

        let receipt = ExportReceipt {
            size_bytes: wav.len() as u64,
            sha256: sha256_hex(wav.as_bytes()),
            created_at: Utc::now(),
            path,
        };

        info!(path = %receipt.path.display(), bytes = receipt.size_bytes, "exported sample");
        Ok(receipt)
    }
}

/// Write `bytes` to `path` through a temporary sibling file
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let export_err = |source: std::io::Error| SampleCutError::ExportFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(export_err)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".part");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes).map_err(export_err)?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        export_err(e)
    })
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// Tests
// ============================================================================
