//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;

use crate::config::SampleCutConfig;
use crate::engine::io::write_atomic;
use crate::engine::{
    decode_file, encode, ClockOutput, DecodedAudio, DirectorySink, PlaybackOutcome, RangeCheck,
    RangeInput, TimeRange, WavDecoder,
};
use crate::error::Result;
use crate::session::Session;

/// Summary of a recording, as printed by `info`
#[derive(Debug, Serialize)]
pub struct AudioInfo {
    pub sample_rate: u32,
    pub channels: usize,
    pub samples: usize,
    pub duration_secs: f64,
}

impl From<&DecodedAudio> for AudioInfo {
    fn from(audio: &DecodedAudio) -> Self {
        Self {
            sample_rate: audio.sample_rate(),
            channels: audio.channel_count(),
            samples: audio.total_samples(),
            duration_secs: audio.duration_secs(),
        }
    }
}

/// Print a recording's format and duration.
pub fn show_info(input: &Path, json: bool) -> Result<()> {
    info!("Reading: {}", input.display());

    let audio = decode_file(&WavDecoder, input)?;
    let summary = AudioInfo::from(&audio);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("File:        {}", input.display());
        println!("Sample rate: {} Hz", summary.sample_rate);
        println!("Channels:    {}", summary.channels);
        println!("Samples:     {}", summary.samples);
        println!("Duration:    {:.3}s", summary.duration_secs);
    }

    Ok(())
}

/// Options for the `extract` command beyond the input path.
#[derive(Debug, Clone, Default)]
pub struct ExtractArgs<'a> {
    pub range: TimeRange,
    pub output: Option<&'a Path>,
    pub float: bool,
    pub first_channel_only: bool,
    pub json: bool,
}

/// Cut a range out of a recording and save it.
pub fn extract(config: &SampleCutConfig, input: &Path, args: ExtractArgs<'_>) -> Result<()> {
    info!("Extracting {} from: {}", args.range, input.display());

    let mut session = Session::new(Arc::new(ClockOutput::current()?));
    session.load(decode_file(&WavDecoder, input)?);
    let segment = session.extract(args.range)?;

    let mut options = config.encode_options();
    options.use_float32 |= args.float;
    options.first_channel_only |= args.first_channel_only;

    let receipt = match args.output {
        Some(path) => {
            let wav = encode(segment, options)?;
            write_atomic(path, wav.as_bytes())?;
            println!("Wrote {} bytes to {}", wav.len(), path.display());
            return Ok(());
        }
        None => {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "sample".to_string());
            let filename = config.export_filename(&stem, segment);
            let sink = DirectorySink::new(&config.export_dir);
            session.export(&sink, &filename, options)?
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&receipt)?);
    } else {
        println!("Exported: {}", receipt.path.display());
        println!("Size:     {} bytes", receipt.size_bytes);
        println!("SHA-256:  {}", receipt.sha256);
    }

    Ok(())
}

/// Play a range and wait for it to end; Ctrl-C stops playback early.
pub async fn preview(input: &Path, range: TimeRange) -> Result<()> {
    info!("Previewing {} from: {}", range, input.display());

    let mut session = Session::new(Arc::new(ClockOutput::current()?));
    session.load(decode_file(&WavDecoder, input)?);
    let duration = session.extract(range)?.duration_secs();

    println!("Playing {:.3}s (Ctrl-C to stop)", duration);
    let finished = session.preview()?.finished();
    tokio::pin!(finished);

    let outcome = tokio::select! {
        outcome = &mut finished => outcome,
        _ = tokio::signal::ctrl_c() => {
            session.stop();
            finished.await
        }
    };

    match outcome {
        PlaybackOutcome::Completed => println!("Playback complete."),
        PlaybackOutcome::Stopped(reason) => {
            warn!("Playback stopped: {:?}", reason);
            println!("Playback stopped.");
        }
    }

    Ok(())
}

/// Validate raw start/end text. Returns whether the range is acceptable.
pub fn check_range(start: &str, end: &str) -> bool {
    let input = RangeInput::new(start, end);
    match input.check() {
        RangeCheck::Ok => {
            println!("OK: {}", input.to_time_range());
            true
        }
        RangeCheck::EndNotAfterStart { start, end } => {
            println!("Error: end ({}) must be greater than start ({})", end, start);
            false
        }
        RangeCheck::Unparsable { field, text } => {
            println!("Error: {} '{}' is not a number", field, text);
            false
        }
    }
}
