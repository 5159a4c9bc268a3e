//! Stability tracker
//!
//! Turns noisy per-frame classifier samples into a debounced mood. The
//! tracker holds a sliding window of recent confident samples and moves the
//! stable mood only when one label holds a clear majority of that window.
//!
//! States: `Unset` until the first qualifying run, then `Stable(label)`.
//! There is no way back to `Unset` except [`StabilityTracker::reset`].

use moodify_common::{Emotion, EmotionSample, Error, Result};
use std::collections::{HashMap, VecDeque};

pub const DEFAULT_WINDOW_SIZE: usize = 5;
pub const DEFAULT_MAJORITY_THRESHOLD: f64 = 0.6;
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;

/// Debounce policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityConfig {
    /// Number of recent confident samples considered
    pub window_size: usize,
    /// Fraction of the window one label must hold, in (0, 1]
    pub majority_threshold: f64,
    /// Samples below this confidence never enter the window
    pub min_confidence: f32,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            majority_threshold: DEFAULT_MAJORITY_THRESHOLD,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

impl StabilityConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(Error::InvalidInput(
                "window_size must be at least 1".to_string(),
            ));
        }
        if !(self.majority_threshold > 0.0 && self.majority_threshold <= 1.0) {
            return Err(Error::InvalidInput(format!(
                "majority_threshold must be in (0, 1], got {}",
                self.majority_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(Error::InvalidInput(format!(
                "min_confidence must be in [0, 1], got {}",
                self.min_confidence
            )));
        }
        Ok(())
    }

    /// Samples of one label needed to move the stable mood
    pub fn required_agreement(&self) -> usize {
        (self.majority_threshold * self.window_size as f64 - 1e-9).ceil() as usize
    }
}

/// Emitted exactly when the stable mood changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodTransition {
    pub from: Option<Emotion>,
    pub to: Emotion,
}

#[derive(Debug)]
pub struct StabilityTracker {
    config: StabilityConfig,
    window: VecDeque<Emotion>,
    stable: Option<Emotion>,
    last_sample: Option<EmotionSample>,
}

impl StabilityTracker {
    pub fn new(config: StabilityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            window: VecDeque::with_capacity(config.window_size),
            stable: None,
            last_sample: None,
        })
    }

    pub fn config(&self) -> &StabilityConfig {
        &self.config
    }

    /// Current stable mood, `None` while unset
    pub fn stable_mood(&self) -> Option<Emotion> {
        self.stable
    }

    /// Most recent raw sample regardless of confidence
    pub fn last_sample(&self) -> Option<&EmotionSample> {
        self.last_sample.as_ref()
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Feed one tick's outcome
    ///
    /// `None` means no face or no frame this tick and leaves all state as is.
    pub fn observe(&mut self, sample: Option<EmotionSample>) -> Option<MoodTransition> {
        let sample = sample?;
        let label = sample.label;
        let confident = sample.confidence >= self.config.min_confidence;
        self.last_sample = Some(sample);

        if !confident {
            tracing::debug!(
                emotion = %label,
                min_confidence = self.config.min_confidence,
                "Sample below confidence floor, not counted"
            );
            return None;
        }

        if self.window.len() == self.config.window_size {
            self.window.pop_front();
        }
        self.window.push_back(label);

        let leader = self.majority()?;
        if Some(leader) == self.stable {
            return None;
        }

        let transition = MoodTransition {
            from: self.stable,
            to: leader,
        };
        self.stable = Some(leader);
        tracing::info!(from = ?transition.from, to = %leader, "Stable mood changed");
        Some(transition)
    }

    /// Unique top label holding at least the threshold share of the window capacity
    fn majority(&self) -> Option<Emotion> {
        let mut counts: HashMap<Emotion, usize> = HashMap::new();
        for label in &self.window {
            *counts.entry(*label).or_default() += 1;
        }

        let top = counts.values().copied().max()?;
        let mut leaders = counts.iter().filter(|(_, count)| **count == top);
        let (leader, _) = leaders.next()?;
        if leaders.next().is_some() {
            return None;
        }

        (top >= self.config.required_agreement()).then_some(*leader)
    }

    /// Forget the window, the stable mood and the last raw sample
    pub fn reset(&mut self) {
        self.window.clear();
        self.stable = None;
        self.last_sample = None;
    }
}
