//! Sample Engine Module
//!
//! Core sample-cutting engine including:
//! - Audio buffer types
//! - Segment extraction
//! - WAV encoding
//! - Transport state machine and its audio output
//! - Decoder and export collaborators

pub mod buffer;
pub mod extract;
pub mod io;
pub mod output;
pub mod range;
pub mod transport;
pub mod wav;

pub use buffer::{generate_index_ramp, generate_test_tone, DecodedAudio, Segment};
pub use extract::{extract, extract_frames};
pub use io::{
    decode_file, decode_in_background, AudioDecoder, DirectorySink, ExportReceipt, ExportSink,
    WavDecoder,
};
pub use output::{AudioOutput, ClockOutput, PlaybackHandle};
pub use range::{RangeCheck, RangeField, RangeInput, TimeRange};
pub use transport::{
    CompletionNotifier, Playback, PlaybackId, PlaybackOutcome, StopReason, TransportController,
    TransportEvent, TransportState,
};
pub use wav::{encode, encode_to_writer, EncodeOptions, WavBytes, WavHeader};
