//! Recommendation trigger
//!
//! Decides when a recommendation request goes out and for which emotion.
//! Every firing gets a fresh token; only the response to the most recent
//! token may reach the board.

use moodify_common::events::FiringReason;
use moodify_common::Emotion;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::tracker::{MoodTransition, StabilityTracker};

/// Identifies one firing within a session; strictly increasing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FiringToken(u64);

impl FiringToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FiringToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationRequest {
    pub emotion: Emotion,
    pub token: FiringToken,
    pub reason: FiringReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TriggerError {
    /// Refresh before any face was seen
    #[error("No mood detected yet. Look at the camera first.")]
    NoMoodDetected,
}

#[derive(Debug, Default)]
pub struct RecommendationTrigger {
    issued: u64,
    latest: Option<FiringToken>,
}

impl RecommendationTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    fn fire(&mut self, emotion: Emotion, reason: FiringReason) -> RecommendationRequest {
        self.issued += 1;
        let token = FiringToken(self.issued);
        self.latest = Some(token);
        tracing::debug!(token = %token, emotion = %emotion, reason = ?reason, "Firing recommendation request");
        RecommendationRequest {
            emotion,
            token,
            reason,
        }
    }

    /// Automatic firing; called only for actual stable-mood changes
    pub fn on_transition(&mut self, transition: &MoodTransition) -> RecommendationRequest {
        self.fire(transition.to, FiringReason::StableMoodChanged)
    }

    /// Explicit refresh: stable mood first, then the latest raw sample
    pub fn refresh(
        &mut self,
        tracker: &StabilityTracker,
    ) -> Result<RecommendationRequest, TriggerError> {
        let emotion = tracker
            .stable_mood()
            .or_else(|| tracker.last_sample().map(|s| s.label))
            .ok_or(TriggerError::NoMoodDetected)?;
        Ok(self.fire(emotion, FiringReason::ManualRefresh))
    }

    /// Most recent token issued, if any
    pub fn latest(&self) -> Option<FiringToken> {
        self.latest
    }

    pub fn is_latest(&self, token: FiringToken) -> bool {
        self.latest == Some(token)
    }
}
