//! Audio Output Collaborator
//!
//! The transport never renders audio itself. It hands segments to an
//! `AudioOutput`, which owns whatever real-time machinery plays them and
//! reports natural completion back through a `CompletionNotifier`.
//!
//! `ClockOutput` is the built-in implementation: it produces no sound but
//! takes exactly as long as the segment lasts, completing from a tokio task.
//! It backs headless preview and the transport tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::engine::buffer::Segment;
use crate::engine::transport::CompletionNotifier;
use crate::error::{Result, SampleCutError};

/// A device that can render segments
///
/// Implementations must not call [`CompletionNotifier::complete`] from inside
/// `start`, nor from inside [`PlaybackHandle::stop`]: the transport holds its
/// lock across both calls.
pub trait AudioOutput: Send + Sync {
    /// Bring a suspended device back before playback
    ///
    /// # Errors
    /// * `OutputUnavailable` - If the device cannot be resumed
    fn resume_if_needed(&self) -> Result<()>;

    /// Begin rendering `segment` from its first sample
    fn start(
        &self,
        segment: Arc<Segment>,
        notifier: CompletionNotifier,
    ) -> Result<Box<dyn PlaybackHandle>>;
}

/// One in-flight playback owned by the transport
pub trait PlaybackHandle: Send {
    /// Halt rendering immediately, without a fade
    fn stop(&mut self);
}

// ============================================================================
// Clock Output
// ============================================================================

/// Timer-driven output that stays silent for the length of each segment
#[derive(Debug)]
pub struct ClockOutput {
    runtime: Handle,
    suspended: AtomicBool,
    available: AtomicBool,
}

impl ClockOutput {
    /// Create an output that spawns its timers on `runtime`
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            suspended: AtomicBool::new(false),
            available: AtomicBool::new(true),
        }
    }

    /// Create an output on the runtime of the calling task
    ///
    /// # Errors
    /// * `OutputUnavailable` - If called outside a tokio runtime
    pub fn current() -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| SampleCutError::OutputUnavailable {
            reason: format!("no async runtime: {}", e),
        })?;
        Ok(Self::new(runtime))
    }

    /// Mark the device as suspended, as an idle audio context would be
    pub fn suspend(&self) {
        self.suspended.store(true, Ordering::SeqCst);
    }

    /// Whether the device is currently suspended
    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::SeqCst)
    }

    /// Control whether a suspended device can be resumed
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

impl AudioOutput for ClockOutput {
    fn resume_if_needed(&self) -> Result<()> {
        if !self.is_suspended() {
            return Ok(());
        }
        if !self.available.load(Ordering::SeqCst) {
            return Err(SampleCutError::OutputUnavailable {
                reason: "audio device could not be resumed".to_string(),
            });
        }
        self.suspended.store(false, Ordering::SeqCst);
        debug!("resumed suspended output");
        Ok(())
    }

    fn start(
        &self,
        segment: Arc<Segment>,
        notifier: CompletionNotifier,
    ) -> Result<Box<dyn PlaybackHandle>> {
        if self.is_suspended() {
            return Err(SampleCutError::OutputUnavailable {
                reason: "audio device is suspended".to_string(),
            });
        }

        let duration = Duration::from_secs_f64(segment.duration_secs());
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            notifier.complete();
        });

        Ok(Box::new(ClockHandle { task }))
    }
}

struct ClockHandle {
    task: JoinHandle<()>,
}

impl PlaybackHandle for ClockHandle {
    fn stop(&mut self) {
        self.task.abort();
    }
}
