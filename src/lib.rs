//! Samplecut - Audio Sample Extraction
//!
//! Samplecut lets a caller select a time range inside a loaded recording, cut
//! it out as a standalone sample, and obtain it as a self-contained WAV file.
//!
//! # Architecture
//!
//! - `engine`: extraction, WAV encoding, and the preview transport
//! - `session`: explicit owner of the loaded audio, current segment and transport
//! - `config`: JSON settings with environment overrides
//! - `cli`: the `samplecut-cli` command-line front end

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod session;

pub use config::SampleCutConfig;
pub use error::{Result, SampleCutError};
pub use session::Session;
