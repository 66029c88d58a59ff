//! Error handling for Samplecut
//!
//! Every error is terminal for the operation that raised it. Nothing is
//! retried internally; callers decide whether to ask the user again.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Samplecut operations
pub type Result<T> = std::result::Result<T, SampleCutError>;

/// Main error type for Samplecut operations
#[derive(Error, Debug)]
pub enum SampleCutError {
    // Extraction Errors
    #[error("No audio loaded")]
    NoAudioLoaded,

    #[error("Invalid range: end ({end_secs:.3}s) must be after start ({start_secs:.3}s)")]
    InvalidRange { start_secs: f64, end_secs: f64 },

    // Encoding Errors
    #[error("Segment contains no samples")]
    EmptySegment,

    // Collaborator Errors
    #[error("Failed to decode audio: {reason}")]
    DecodeFailure {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Audio output unavailable: {reason}")]
    OutputUnavailable { reason: String },

    #[error("Invalid audio: {reason}")]
    InvalidAudio { reason: String },

    #[error("Export failed for {}: {source}", path.display())]
    ExportFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SampleCutError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SampleCutError::NoAudioLoaded => "NO_AUDIO_LOADED",
            SampleCutError::InvalidRange { .. } => "INVALID_RANGE",
            SampleCutError::EmptySegment => "EMPTY_SEGMENT",
            SampleCutError::DecodeFailure { .. } => "DECODE_FAILURE",
            SampleCutError::OutputUnavailable { .. } => "OUTPUT_UNAVAILABLE",
            SampleCutError::InvalidAudio { .. } => "INVALID_AUDIO",
            SampleCutError::ExportFailed { .. } => "EXPORT_FAILED",
            SampleCutError::Config { .. } => "CONFIG_ERROR",
            SampleCutError::Io(_) => "IO_ERROR",
            SampleCutError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if the user can fix this by changing their input and trying again
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SampleCutError::NoAudioLoaded
                | SampleCutError::InvalidRange { .. }
                | SampleCutError::EmptySegment
                | SampleCutError::DecodeFailure { .. }
                | SampleCutError::OutputUnavailable { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            SampleCutError::NoAudioLoaded => vec!["Load an audio file before selecting a range"],
            SampleCutError::InvalidRange { .. } => vec![
                "Make sure the end time is greater than the start time",
                "Check that the start time lies within the recording",
            ],
            SampleCutError::EmptySegment => vec!["Select a wider range"],
            SampleCutError::DecodeFailure { .. } => vec![
                "Try converting the file to WAV format first",
                "The file may be corrupted - try re-exporting from source",
            ],
            SampleCutError::OutputUnavailable { .. } => vec![
                "Check that an audio output device is connected",
                "Try previewing again after interacting with the player",
            ],
            _ => vec![],
        }
    }
}
