//! Sample-cutting session
//!
//! A `Session` is the explicit owner of everything a user works with at once:
//! the loaded recording, the segment most recently cut from it, and the
//! transport previewing that segment. Callers create one and pass it around
//! instead of relying on process-wide state.

use std::sync::Arc;

use tracing::{debug, info};

use crate::engine::{
    encode, extract, AudioDecoder, AudioOutput, DecodedAudio, EncodeOptions, ExportReceipt,
    ExportSink, Playback, Segment, TimeRange, TransportController,
};
use crate::error::{Result, SampleCutError};

/// One user's working state
pub struct Session {
    audio: Option<DecodedAudio>,
    segment: Option<Arc<Segment>>,
    transport: Arc<TransportController>,
}

impl Session {
    /// Create an empty session previewing through `output`
    pub fn new(output: Arc<dyn AudioOutput>) -> Self {
        Self {
            audio: None,
            segment: None,
            transport: Arc::new(TransportController::new(output)),
        }
    }

    /// Replace the loaded recording
    ///
    /// Playback of a segment cut from the previous recording is stopped and
    /// the segment is discarded.
    pub fn load(&mut self, audio: DecodedAudio) {
        self.transport.stop();
        self.segment = None;
        info!(
            sample_rate = audio.sample_rate(),
            channels = audio.channel_count(),
            duration_secs = audio.duration_secs(),
            "loaded audio"
        );
        self.audio = Some(audio);
    }

    /// Decode `bytes` and load the result
    ///
    /// On failure the previously loaded recording is kept.
    pub fn load_bytes(&mut self, decoder: &dyn AudioDecoder, bytes: &[u8]) -> Result<()> {
        let audio = decoder.decode(bytes)?;
        self.load(audio);
        Ok(())
    }

    /// Drop the loaded recording and stop any preview
    pub fn unload(&mut self) {
        self.transport.stop();
        self.segment = None;
        self.audio = None;
        debug!("unloaded audio");
    }

    /// The loaded recording, if any
    pub fn audio(&self) -> Option<&DecodedAudio> {
        self.audio.as_ref()
    }

    /// The segment most recently extracted, if any
    pub fn segment(&self) -> Option<&Segment> {
        self.segment.as_deref()
    }

    /// Cut `range` out of the loaded recording and keep it as the current segment
    ///
    /// A failed extraction leaves the previous segment in place.
    ///
    /// # Errors
    /// * `NoAudioLoaded` - If nothing is loaded
    /// * `InvalidRange` - If the range is empty after clamping
    pub fn extract(&mut self, range: TimeRange) -> Result<&Segment> {
        let segment = Arc::new(extract(self.audio.as_ref(), range)?);
        Ok(&**self.segment.insert(segment))
    }

    /// Encode the current segment and hand it to `sink`
    ///
    /// # Errors
    /// * `EmptySegment` - If nothing has been extracted yet
    pub fn export(
        &self,
        sink: &dyn ExportSink,
        filename: &str,
        options: EncodeOptions,
    ) -> Result<ExportReceipt> {
        let segment = self.segment.as_ref().ok_or(SampleCutError::EmptySegment)?;
        let wav = encode(segment, options)?;
        sink.export(&wav, filename)
    }

    /// Preview the current segment, preempting any earlier preview
    ///
    /// # Errors
    /// * `EmptySegment` - If nothing has been extracted yet
    /// * `OutputUnavailable` - If the output cannot be resumed
    pub fn preview(&self) -> Result<Playback> {
        let segment = self.segment.clone().ok_or(SampleCutError::EmptySegment)?;
        self.transport.play(segment)
    }

    /// Stop the preview, if one is running
    pub fn stop(&self) {
        self.transport.stop();
    }

    /// The transport, for subscribing to events or querying state
    pub fn transport(&self) -> &Arc<TransportController> {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{generate_index_ramp, ClockOutput, PlaybackOutcome, StopReason};
    use crate::engine::{DirectorySink, WavDecoder};
    use tempfile::tempdir;

    fn session() -> Session {
        Session::new(Arc::new(ClockOutput::current().unwrap()))
    }

    fn ramp() -> DecodedAudio {
        generate_index_ramp(32000, 8000, 1).unwrap()
    }

    #[tokio::test]
    async fn test_extract_without_audio() {
        let mut session = session();
        let result = session.extract(TimeRange::full());
        assert!(matches!(result, Err(SampleCutError::NoAudioLoaded)));
    }

    #[tokio::test]
    async fn test_preview_without_segment() {
        let session = session();
        assert!(matches!(
            session.preview(),
            Err(SampleCutError::EmptySegment)
        ));
    }

    #[tokio::test]
    async fn test_failed_extract_keeps_previous_segment() {
        let mut session = session();
        session.load(ramp());
        session.extract(TimeRange::between(1.0, 2.0)).unwrap();

        assert!(session.extract(TimeRange::between(2.0, 1.0)).is_err());
        assert_eq!(session.segment().unwrap().len(), 8000);
    }

    #[tokio::test]
    async fn test_load_replaces_segment_and_stops() {
        let mut session = session();
        session.load(ramp());
        session.extract(TimeRange::between(0.0, 2.0)).unwrap();
        let playback = session.preview().unwrap();

        session.load(ramp());

        assert!(session.segment().is_none());
        assert!(session.transport().is_idle());
        assert_eq!(
            playback.finished().await,
            PlaybackOutcome::Stopped(StopReason::User)
        );
    }

    #[tokio::test]
    async fn test_preview_completes() {
        let mut session = session();
        session.load(ramp());
        session.extract(TimeRange::between(0.0, 0.02)).unwrap();

        let playback = session.preview().unwrap();
        assert!(session.transport().is_playing());
        assert_eq!(playback.finished().await, PlaybackOutcome::Completed);
        assert!(session.transport().is_idle());
    }

    #[tokio::test]
    async fn test_load_bytes_failure_keeps_audio() {
        let mut session = session();
        session.load(ramp());

        assert!(session.load_bytes(&WavDecoder, b"junk").is_err());
        assert_eq!(session.audio().unwrap().total_samples(), 32000);
    }

    #[tokio::test]
    async fn test_export() {
        let dir = tempdir().unwrap();
        let mut session = session();
        session.load(ramp());
        session.extract(TimeRange::between(1.0, 3.0)).unwrap();

        let receipt = session
            .export(
                &DirectorySink::new(dir.path()),
                "cut.wav",
                EncodeOptions::default(),
            )
            .unwrap();
        assert_eq!(receipt.size_bytes, 32044);
    }

    #[tokio::test]
    async fn test_unload() {
        let mut session = session();
        session.load(ramp());
        session.extract(TimeRange::full()).unwrap();
        session.unload();

        assert!(session.audio().is_none());
        assert!(session.segment().is_none());
    }
}
