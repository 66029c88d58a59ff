//! Transport Tests
//!
//! Preview playback driven by the timer-based output.

use std::sync::Arc;
use std::time::Duration;

use samplecut::engine::{
    extract, generate_index_ramp, ClockOutput, PlaybackOutcome, Segment, StopReason, TimeRange,
    TransportController, TransportEvent, TransportState,
};
use samplecut::SampleCutError;

fn segment(duration_secs: f64) -> Arc<Segment> {
    let audio = generate_index_ramp(8000 * 4, 8000, 1).unwrap();
    Arc::new(extract(Some(&audio), TimeRange::between(0.0, duration_secs)).unwrap())
}

fn transport() -> (Arc<ClockOutput>, TransportController) {
    let output = Arc::new(ClockOutput::current().unwrap());
    let transport = TransportController::new(output.clone());
    (output, transport)
}

#[tokio::test]
async fn test_single_active_playback() {
    let (_, transport) = transport();

    let first = transport.play(segment(2.0)).unwrap();
    let second = transport.play(segment(2.0)).unwrap();

    assert_eq!(transport.active_playback(), Some(second.id()));
    assert_eq!(
        first.finished().await,
        PlaybackOutcome::Stopped(StopReason::Replaced)
    );

    transport.stop();
    assert_eq!(
        second.finished().await,
        PlaybackOutcome::Stopped(StopReason::User)
    );
    assert!(transport.is_idle());
}

#[tokio::test]
async fn test_stop_wins_over_completion() {
    let (_, transport) = transport();
    let mut events = transport.subscribe();

    let playback = transport.play(segment(0.05)).unwrap();
    let id = playback.id();
    assert_eq!(transport.stop(), Some(id));

    // Outlive the segment; an aborted timer must not report completion
    tokio::time::sleep(Duration::from_millis(100)).await;

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(seen.contains(&TransportEvent::Stopped {
        id,
        reason: StopReason::User
    }));
    assert!(!seen.contains(&TransportEvent::Completed { id }));
    assert_eq!(transport.state(), TransportState::Idle);
}

#[tokio::test]
async fn test_natural_completion() {
    let (_, transport) = transport();
    let mut events = transport.subscribe();

    let playback = transport.play(segment(0.02)).unwrap();
    let id = playback.id();
    assert_eq!(playback.finished().await, PlaybackOutcome::Completed);
    assert!(transport.is_idle());

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert_eq!(
        seen,
        vec![
            TransportEvent::Started { id },
            TransportEvent::StateChanged {
                state: TransportState::Playing
            },
            TransportEvent::Completed { id },
            TransportEvent::StateChanged {
                state: TransportState::Idle
            },
        ]
    );
}

#[tokio::test]
async fn test_stop_when_idle_is_noop() {
    let (_, transport) = transport();
    assert_eq!(transport.stop(), None);
    assert!(transport.is_idle());
}

#[tokio::test]
async fn test_suspended_output_is_resumed() {
    let (output, transport) = transport();
    output.suspend();

    let playback = transport.play(segment(0.02)).unwrap();
    assert!(!output.is_suspended());
    assert_eq!(playback.finished().await, PlaybackOutcome::Completed);
}

#[tokio::test]
async fn test_unavailable_output_leaves_idle() {
    let (output, transport) = transport();
    let running = transport.play(segment(2.0)).unwrap();

    output.suspend();
    output.set_available(false);

    let result = transport.play(segment(1.0));
    assert!(matches!(
        result,
        Err(SampleCutError::OutputUnavailable { .. })
    ));
    assert!(transport.is_idle());
    assert_eq!(
        running.finished().await,
        PlaybackOutcome::Stopped(StopReason::OutputUnavailable)
    );
}
