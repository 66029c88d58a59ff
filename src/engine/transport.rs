//! Transport State Machine for Samplecut
//!
//! Governs preview playback of extracted segments. There are two states,
//! `Idle` and `Playing`, and at most one live `PlaybackHandle` at any instant.
//!
//! - `play` always preempts: an active playback is stopped and discarded
//!   before the new one starts.
//! - `stop` halts the active playback synchronously and emits `Stopped`,
//!   never `Completed`.
//! - Natural completion is reported by the output through a
//!   `CompletionNotifier`. Completions for a playback that was already
//!   stopped or replaced are ignored, so a stop that comes first always wins.
//!
//! Every transition takes a single mutex, so concurrent `play`/`stop` calls
//! are applied one at a time in lock order. Observers follow transitions by
//! subscribing to the broadcast event channel.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::engine::buffer::Segment;
use crate::engine::output::{AudioOutput, PlaybackHandle};
use crate::error::Result;

/// Capacity of the event channel before slow subscribers start lagging
const EVENT_CAPACITY: usize = 64;

/// Transport states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    /// Nothing is playing (initial state)
    #[default]
    Idle,
    /// A segment is being rendered
    Playing,
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportState::Idle => write!(f, "Idle"),
            TransportState::Playing => write!(f, "Playing"),
        }
    }
}

/// Identifies one playback from start to finish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackId(Uuid);

impl PlaybackId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PlaybackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a playback ended before reaching its last sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `stop()` was called
    User,
    /// A newer `play()` preempted it
    Replaced,
    /// The output could not be resumed for a newer `play()`
    OutputUnavailable,
}

/// How a playback ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Rendered to the end of the segment
    Completed,
    /// Halted early
    Stopped(StopReason),
}

/// Notifications broadcast by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Started { id: PlaybackId },
    Completed { id: PlaybackId },
    Stopped { id: PlaybackId, reason: StopReason },
    StateChanged { state: TransportState },
}

// ============================================================================
// Shared State
// ============================================================================

struct ActivePlayback {
    id: PlaybackId,
    handle: Box<dyn PlaybackHandle>,
}

#[derive(Default)]
struct Inner {
    active: Option<ActivePlayback>,
    last_finished: Option<(PlaybackId, PlaybackOutcome)>,
}

struct Shared {
    inner: Mutex<Inner>,
    events: broadcast::Sender<TransportEvent>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: TransportEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Halt and release the active playback, if any
    fn halt(&self, inner: &mut Inner, reason: StopReason) -> Option<PlaybackId> {
        let mut active = inner.active.take()?;
        active.handle.stop();
        inner.last_finished = Some((active.id, PlaybackOutcome::Stopped(reason)));
        debug!(id = %active.id, ?reason, "[TRANSPORT] Stopped");
        self.emit(TransportEvent::Stopped {
            id: active.id,
            reason,
        });
        Some(active.id)
    }

    fn finish(&self, id: PlaybackId) {
        let mut inner = self.lock();
        match &inner.active {
            Some(active) if active.id == id => {
                inner.active = None;
                inner.last_finished = Some((id, PlaybackOutcome::Completed));
                debug!(%id, "[TRANSPORT] Completed");
                self.emit(TransportEvent::Completed { id });
                self.emit(TransportEvent::StateChanged {
                    state: TransportState::Idle,
                });
            }
            _ => debug!(%id, "[TRANSPORT] Ignoring completion of inactive playback"),
        }
    }
}

/// Reports natural completion of one playback back to the transport
///
/// Handed to [`AudioOutput::start`]. Holds only a weak reference, so a
/// notifier outliving its transport is harmless.
pub struct CompletionNotifier {
    id: PlaybackId,
    shared: Weak<Shared>,
}

impl CompletionNotifier {
    /// The playback this notifier belongs to
    pub fn id(&self) -> PlaybackId {
        self.id
    }

    /// Signal that the playback reached the end of its segment
    pub fn complete(self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.finish(self.id);
        }
    }
}

impl fmt::Debug for CompletionNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionNotifier")
            .field("id", &self.id)
            .finish()
    }
}

// ============================================================================
// Transport Controller
// ============================================================================

/// Playback state machine with at most one active playback
///
/// Cheap to share: wrap it in an `Arc` and call it from any thread.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use samplecut::engine::{ClockOutput, Segment, TransportController};
///
/// # async fn demo() -> samplecut::Result<()> {
/// let transport = TransportController::new(Arc::new(ClockOutput::current()?));
/// let segment = Arc::new(Segment::from_channels(8000, vec![vec![0.0; 800]])?);
///
/// let playback = transport.play(segment)?;
/// let outcome = playback.finished().await;
/// # Ok(())
/// # }
/// ```
pub struct TransportController {
    output: Arc<dyn AudioOutput>,
    shared: Arc<Shared>,
}

impl TransportController {
    /// Create an idle transport rendering through `output`
    pub fn new(output: Arc<dyn AudioOutput>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            output,
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner::default()),
                events,
            }),
        }
    }

    /// Start playing `segment` from its first sample
    ///
    /// State transitions:
    /// - Idle -> Playing
    /// - Playing -> Playing (previous playback stopped and discarded)
    ///
    /// # Errors
    /// * `OutputUnavailable` - If the output cannot be resumed or refuses to
    ///   start. The transport is left `Idle` either way.
    pub fn play(&self, segment: Arc<Segment>) -> Result<Playback> {
        let mut inner = self.shared.lock();
        let was_playing = inner.active.is_some();

        if let Err(e) = self.output.resume_if_needed() {
            warn!(error = %e, "[TRANSPORT] Output unavailable, playback refused");
            self.shared.halt(&mut inner, StopReason::OutputUnavailable);
            if was_playing {
                self.shared.emit(TransportEvent::StateChanged {
                    state: TransportState::Idle,
                });
            }
            return Err(e);
        }

        self.shared.halt(&mut inner, StopReason::Replaced);

        let id = PlaybackId::new();
        let events = self.shared.events.subscribe();
        let notifier = CompletionNotifier {
            id,
            shared: Arc::downgrade(&self.shared),
        };

        let frames = segment.len();
        let handle = match self.output.start(segment, notifier) {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = %e, "[TRANSPORT] Output failed to start playback");
                if was_playing {
                    self.shared.emit(TransportEvent::StateChanged {
                        state: TransportState::Idle,
                    });
                }
                return Err(e);
            }
        };

        inner.active = Some(ActivePlayback { id, handle });
        debug!(%id, frames, "[TRANSPORT] Play");
        self.shared.emit(TransportEvent::Started { id });
        if !was_playing {
            self.shared.emit(TransportEvent::StateChanged {
                state: TransportState::Playing,
            });
        }

        Ok(Playback {
            id,
            events,
            shared: Arc::downgrade(&self.shared),
        })
    }

    /// Halt the active playback
    ///
    /// State transitions:
    /// - Playing -> Idle (emits `Stopped`, not `Completed`)
    /// - Idle -> Idle (no-op)
    ///
    /// Returns the id of the playback that was stopped.
    pub fn stop(&self) -> Option<PlaybackId> {
        let mut inner = self.shared.lock();
        let stopped = self.shared.halt(&mut inner, StopReason::User);
        if stopped.is_some() {
            self.shared.emit(TransportEvent::StateChanged {
                state: TransportState::Idle,
            });
        } else {
            debug!("[TRANSPORT] Already idle");
        }
        stopped
    }

    /// Ask the output to resume a suspended device
    ///
    /// `play` calls this itself; exposing it lets callers warm the device up
    /// ahead of time.
    pub fn resume_if_needed(&self) -> Result<()> {
        self.output.resume_if_needed()
    }

    /// Subscribe to transport events from now on
    pub fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.shared.events.subscribe()
    }

    // ========================================================================
    // State Queries
    // ========================================================================

    /// Get the current transport state
    pub fn state(&self) -> TransportState {
        if self.shared.lock().active.is_some() {
            TransportState::Playing
        } else {
            TransportState::Idle
        }
    }

    /// Check if a playback is active
    pub fn is_playing(&self) -> bool {
        self.state() == TransportState::Playing
    }

    /// Check if the transport is idle
    pub fn is_idle(&self) -> bool {
        self.state() == TransportState::Idle
    }

    /// Id of the active playback, if any
    pub fn active_playback(&self) -> Option<PlaybackId> {
        self.shared.lock().active.as_ref().map(|a| a.id)
    }
}

impl Drop for TransportController {
    fn drop(&mut self) {
        let mut inner = self.shared.lock();
        if self.shared.halt(&mut inner, StopReason::User).is_some() {
            self.shared.emit(TransportEvent::StateChanged {
                state: TransportState::Idle,
            });
        }
    }
}

impl fmt::Debug for TransportController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportController")
            .field("active", &self.active_playback())
            .finish()
    }
}

// ============================================================================
// Playback Ticket
// ============================================================================

/// Returned by [`TransportController::play`] to await one playback's end
///
/// Subscribed before the playback started, so no event is missed.
#[derive(Debug)]
pub struct Playback {
    id: PlaybackId,
    events: broadcast::Receiver<TransportEvent>,
    shared: Weak<Shared>,
}

impl Playback {
    pub fn id(&self) -> PlaybackId {
        self.id
    }

    /// Wait until this playback completes or is stopped
    pub async fn finished(mut self) -> PlaybackOutcome {
        loop {
            match self.events.recv().await {
                Ok(TransportEvent::Completed { id }) if id == self.id => {
                    return PlaybackOutcome::Completed;
                }
                Ok(TransportEvent::Stopped { id, reason }) if id == self.id => {
                    return PlaybackOutcome::Stopped(reason);
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "[TRANSPORT] Playback waiter lagged");
                    if let Some(outcome) = self.settled_outcome() {
                        return outcome;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return self
                        .settled_outcome()
                        .unwrap_or(PlaybackOutcome::Stopped(StopReason::User));
                }
            }
        }
    }

    /// Outcome recorded by the transport, once this playback is no longer active
    fn settled_outcome(&self) -> Option<PlaybackOutcome> {
        let Some(shared) = self.shared.upgrade() else {
            return Some(PlaybackOutcome::Stopped(StopReason::User));
        };
        let inner = shared.lock();
        if inner.active.as_ref().map(|a| a.id) == Some(self.id) {
            return None;
        }
        match inner.last_finished {
            Some((id, outcome)) if id == self.id => Some(outcome),
            // Something newer finished since; a stopped one is the only way
            // this playback could have been superseded
            _ => Some(PlaybackOutcome::Stopped(StopReason::Replaced)),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
