//! Configuration for Samplecut
//!
//! Settings live in a JSON file. A missing file means defaults; environment
//! variables override whatever the file says, and CLI flags override both.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::{EncodeOptions, Segment};
use crate::error::{Result, SampleCutError};

/// Environment variable overriding `export_dir`
pub const ENV_EXPORT_DIR: &str = "SAMPLECUT_EXPORT_DIR";

/// Environment variable overriding `use_float32` ("1"/"true"/"0"/"false")
pub const ENV_FLOAT32: &str = "SAMPLECUT_FLOAT32";

/// Default filename template for exports
pub const DEFAULT_FILENAME_TEMPLATE: &str = "{stem}_{start}-{end}.wav";

/// User settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleCutConfig {
    /// Directory exports are written into
    pub export_dir: PathBuf,
    /// Export 32-bit float instead of 16-bit PCM
    pub use_float32: bool,
    /// Keep only the first channel of sources that are not mono or stereo
    pub first_channel_only: bool,
    /// Export filename with `{stem}`, `{start}` and `{end}` placeholders
    pub filename_template: String,
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for SampleCutConfig {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("samples"),
            use_float32: false,
            first_channel_only: false,
            filename_template: DEFAULT_FILENAME_TEMPLATE.to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl SampleCutConfig {
    /// Load settings from `path`, falling back to defaults if it is absent
    ///
    /// Environment overrides are applied afterwards.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Write settings to `path` as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(dir) = env::var(ENV_EXPORT_DIR) {
            if !dir.is_empty() {
                self.export_dir = PathBuf::from(dir);
            }
        }
        if let Ok(value) = env::var(ENV_FLOAT32) {
            self.use_float32 = parse_bool(&value).ok_or_else(|| SampleCutError::Config {
                reason: format!("{} must be true or false, got '{}'", ENV_FLOAT32, value),
            })?;
        }
        Ok(())
    }

    /// Check that the settings are usable
    pub fn validate(&self) -> Result<()> {
        if self.filename_template.trim().is_empty() {
            return Err(SampleCutError::Config {
                reason: "filename_template must not be empty".to_string(),
            });
        }
        if self.filename_template.contains(['/', '\\']) {
            return Err(SampleCutError::Config {
                reason: "filename_template must not contain path separators".to_string(),
            });
        }
        Ok(())
    }

    /// Encoder options implied by these settings
    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            use_float32: self.use_float32,
            first_channel_only: self.first_channel_only,
        }
    }

    /// Build an export filename for `segment` cut from a source named `stem`
    ///
    /// Times are rendered in milliseconds so filenames stay free of dots.
    ///
    /// # Example
    /// ```
    /// use samplecut::config::SampleCutConfig;
    /// use samplecut::engine::{extract, DecodedAudio, TimeRange};
    ///
    /// let audio = DecodedAudio::new(8000, vec![vec![0.0; 32000]]).unwrap();
    /// let segment = extract(Some(&audio), TimeRange::between(1.0, 2.5)).unwrap();
    /// let name = SampleCutConfig::default().export_filename("drums", &segment);
    /// assert_eq!(name, "drums_1000ms-2500ms.wav");
    /// ```
    pub fn export_filename(&self, stem: &str, segment: &Segment) -> String {
        let ms = |secs: f64| format!("{}ms", (secs * 1000.0).round() as u64);
        self.filename_template
            .replace("{stem}", stem)
            .replace("{start}", &ms(segment.start_secs()))
            .replace("{end}", &ms(segment.end_secs()))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
