//! Frame sampling and classification
//!
//! The camera and the face-expression model are external collaborators.
//! This module defines the seams they plug into and turns one tick into at
//! most one [`EmotionSample`].

use chrono::{DateTime, Utc};
use moodify_common::{Emotion, EmotionSample};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Upper bound on one classification; kept below the default tick period
pub const DEFAULT_CLASSIFY_TIMEOUT: Duration = Duration::from_millis(800);

/// One captured video frame
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Packed RGBA pixels
    pub pixels: Vec<u8>,
    pub captured_at: DateTime<Utc>,
}

impl Frame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
            captured_at: Utc::now(),
        }
    }
}

/// Camera feed
///
/// Returns `None` while the feed cannot produce a frame (permission
/// pending, stream metadata not loaded yet).
pub trait FrameSource: Send {
    fn current_frame(&mut self) -> Option<Frame>;
}

/// What the classifier saw on a frame with a face
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierOutput {
    /// Single label with its probability
    Label { label: Emotion, confidence: f32 },
    /// Score per expression name, in the model's order
    Scores(Vec<(String, f32)>),
}

impl ClassifierOutput {
    pub fn into_sample(self) -> Option<EmotionSample> {
        match self {
            ClassifierOutput::Label { label, confidence } => {
                Some(EmotionSample::new(label, confidence))
            }
            ClassifierOutput::Scores(scores) => {
                dominant_expression(&scores).map(|(label, score)| EmotionSample::new(label, score))
            }
        }
    }
}

/// Arg-max over an expression score map
///
/// Names outside the seven known labels map to `neutral`. On equal scores the
/// later entry wins. Non-finite scores are ignored.
pub fn dominant_expression(scores: &[(String, f32)]) -> Option<(Emotion, f32)> {
    let (name, score) = scores
        .iter()
        .filter(|(_, score)| score.is_finite())
        .max_by(|a, b| a.1.total_cmp(&b.1))?;
    let label = name.parse::<Emotion>().unwrap_or(Emotion::Neutral);
    Some((label, *score))
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Classifier models not loaded")]
    NotReady,

    #[error("Classification failed: {0}")]
    Failed(String),
}

/// Face-expression model
///
/// `classify` runs inline on the session loop, so refresh commands and fetch
/// completions wait while it runs. [`FrameSampler`] abandons a call that
/// exceeds its classify timeout.
#[async_trait::async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Models loaded and usable
    fn is_ready(&self) -> bool;

    /// `Ok(None)` when no face is found on the frame
    async fn classify(&self, frame: &Frame) -> Result<Option<ClassifierOutput>, ClassifierError>;
}

/// Pulls one frame per tick and classifies it
pub struct FrameSampler {
    source: Box<dyn FrameSource>,
    classifier: Arc<dyn EmotionClassifier>,
    classify_timeout: Duration,
}

impl FrameSampler {
    pub fn new(source: Box<dyn FrameSource>, classifier: Arc<dyn EmotionClassifier>) -> Self {
        Self {
            source,
            classifier,
            classify_timeout: DEFAULT_CLASSIFY_TIMEOUT,
        }
    }

    pub fn with_classify_timeout(mut self, timeout: Duration) -> Self {
        self.classify_timeout = timeout;
        self
    }

    pub fn classifier_ready(&self) -> bool {
        self.classifier.is_ready()
    }

    /// Run one tick
    ///
    /// "Not ready" and "no face" are ordinary outcomes and yield `None`.
    /// Classifier failures and timeouts are logged and also yield `None`.
    pub async fn sample(&mut self) -> Option<EmotionSample> {
        if !self.classifier.is_ready() {
            tracing::trace!("Classifier not ready, skipping tick");
            return None;
        }
        let Some(frame) = self.source.current_frame() else {
            tracing::trace!("No frame available, skipping tick");
            return None;
        };

        let classified =
            tokio::time::timeout(self.classify_timeout, self.classifier.classify(&frame)).await;
        match classified {
            Ok(Ok(Some(output))) => output.into_sample(),
            Ok(Ok(None)) => {
                tracing::debug!("No face detected");
                None
            }
            Ok(Err(e)) => {
                tracing::warn!("Error detecting face: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.classify_timeout.as_millis() as u64,
                    "Classifier timed out, skipping tick"
                );
                None
            }
        }
    }
}
