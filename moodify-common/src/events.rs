//! Session event types and the broadcast event bus
//!
//! The session emits one event per observable state change so a front end
//! (or the replay tool) can render without polling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::Emotion;

/// Why a recommendation request was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FiringReason {
    /// The debounced mood moved to a new label
    StableMoodChanged,
    /// The user asked for fresh recommendations
    ManualRefresh,
}

/// Moodify session events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MoodEvent {
    /// Classifier produced a sample this tick
    MoodSampled {
        emotion: Emotion,
        confidence: f32,
        timestamp: DateTime<Utc>,
    },

    /// Debounced mood changed
    StableMoodChanged {
        from: Option<Emotion>,
        to: Emotion,
        timestamp: DateTime<Utc>,
    },

    /// A recommendation request was fired
    RecommendationsRequested {
        token: u64,
        emotion: Emotion,
        reason: FiringReason,
        timestamp: DateTime<Utc>,
    },

    /// Fetched tracks were applied to the board
    RecommendationsApplied {
        token: u64,
        emotion: Emotion,
        track_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Fetch succeeded with no tracks
    RecommendationsEmpty {
        token: u64,
        emotion: Emotion,
        timestamp: DateTime<Utc>,
    },

    /// Fetch failed; the user must retry
    RecommendationsUnavailable {
        token: u64,
        emotion: Emotion,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// A response arrived for a superseded firing and was dropped
    StaleResponseDiscarded {
        token: u64,
        latest_token: u64,
        emotion: Emotion,
        timestamp: DateTime<Utc>,
    },

    /// Refresh requested before any mood was observed
    NoMoodDetected { timestamp: DateTime<Utc> },

    /// Sampling loop ended
    SessionStopped { timestamp: DateTime<Utc> },
}

impl MoodEvent {
    /// Event type name, matching the serialized `type` tag
    pub fn event_type(&self) -> &str {
        match self {
            MoodEvent::MoodSampled { .. } => "MoodSampled",
            MoodEvent::StableMoodChanged { .. } => "StableMoodChanged",
            MoodEvent::RecommendationsRequested { .. } => "RecommendationsRequested",
            MoodEvent::RecommendationsApplied { .. } => "RecommendationsApplied",
            MoodEvent::RecommendationsEmpty { .. } => "RecommendationsEmpty",
            MoodEvent::RecommendationsUnavailable { .. } => "RecommendationsUnavailable",
            MoodEvent::StaleResponseDiscarded { .. } => "StaleResponseDiscarded",
            MoodEvent::NoMoodDetected { .. } => "NoMoodDetected",
            MoodEvent::SessionStopped { .. } => "SessionStopped",
        }
    }
}

/// Broadcast bus for [`MoodEvent`]s
///
/// Slow subscribers lag and lose the oldest events rather than blocking the
/// session loop.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<MoodEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<MoodEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: MoodEvent,
    ) -> Result<usize, broadcast::error::SendError<MoodEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: MoodEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
