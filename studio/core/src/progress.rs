//! Live progress capture and relay.
//!
//! The engine reports progress as arbitrary text fragments. [`ProgressSink`]
//! is the single-method capability it writes through; [`ProgressRelay`] is
//! the implementation wired into a running generation, accumulating the
//! fragments into a transcript and pushing a full snapshot toward the
//! surface after every write.

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::generation::{GenerationError, Poster};

// ============================================================================
// Sink Capability
// ============================================================================

/// Destination for textual progress emitted during a generation.
///
/// Infallible on purpose: a progress report must never be able to abort the
/// work it is reporting on. Implementations that forward fragments somewhere
/// lossy log instead of erroring.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Accept one fragment of progress text.
    ///
    /// The fragment is accepted whole, and delivery completes before the
    /// call returns, so a single producer observes its own write ordering
    /// downstream.
    async fn on_fragment(&self, fragment: &str);
}

// ============================================================================
// Generation Events
// ============================================================================

/// Events a running generation pushes toward the session.
#[derive(Debug)]
pub enum GenerationEvent {
    /// The transcript grew; carries the full text so far.
    Progress {
        /// Concatenation of every fragment written so far.
        transcript: String,
    },

    /// The generation ended. Terminal: nothing follows on this channel.
    Finished {
        /// The poster, or the failure that ended the attempt.
        outcome: Result<Poster, GenerationError>,
    },
}

// ============================================================================
// Relay
// ============================================================================

/// Accumulates fragments and relays transcript snapshots to the surface.
///
/// One relay belongs to exactly one in-flight generation; it is dropped with
/// the generation task and never reused.
pub struct ProgressRelay {
    transcript: Mutex<String>,
    events: mpsc::Sender<GenerationEvent>,
}

impl ProgressRelay {
    /// Create a relay pushing snapshots into the given channel.
    pub fn new(events: mpsc::Sender<GenerationEvent>) -> Self {
        Self {
            transcript: Mutex::new(String::new()),
            events,
        }
    }

    /// Snapshot of the transcript accumulated so far.
    #[must_use]
    pub fn transcript(&self) -> String {
        self.transcript.lock().clone()
    }
}

#[async_trait]
impl ProgressSink for ProgressRelay {
    async fn on_fragment(&self, fragment: &str) {
        // Snapshot under the lock, send after releasing it.
        let snapshot = {
            let mut transcript = self.transcript.lock();
            transcript.push_str(fragment);
            transcript.clone()
        };

        if let Err(e) = self
            .events
            .send(GenerationEvent::Progress {
                transcript: snapshot,
            })
            .await
        {
            tracing::warn!("Progress update dropped, surface channel closed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn relay_accumulates_fragments_in_write_order() {
        let (tx, mut rx) = mpsc::channel(16);
        let relay = ProgressRelay::new(tx);

        relay.on_fragment("Resolving...").await;
        relay.on_fragment("Rendering...").await;
        relay.on_fragment("Done.").await;

        assert_eq!(relay.transcript(), "Resolving...Rendering...Done.");

        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                GenerationEvent::Progress { transcript } => seen.push(transcript),
                GenerationEvent::Finished { .. } => panic!("nothing finished here"),
            }
        }
        assert_eq!(
            seen,
            vec![
                "Resolving...".to_string(),
                "Resolving...Rendering...".to_string(),
                "Resolving...Rendering...Done.".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn relay_survives_a_dropped_receiver() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let relay = ProgressRelay::new(tx);

        // Must not panic; the fragment still lands in the transcript.
        relay.on_fragment("Rendering...").await;
        assert_eq!(relay.transcript(), "Rendering...");
    }

    #[tokio::test]
    async fn empty_fragments_are_accepted() {
        let (tx, mut rx) = mpsc::channel(4);
        let relay = ProgressRelay::new(tx);

        relay.on_fragment("").await;
        assert_eq!(relay.transcript(), "");

        match rx.try_recv() {
            Ok(GenerationEvent::Progress { transcript }) => assert_eq!(transcript, ""),
            other => panic!("expected a progress event, got {other:?}"),
        }
    }
}
