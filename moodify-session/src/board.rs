//! Result board: the display-facing recommendation state
//!
//! Also owns the preview playback handle, since only a track on the board
//! can be previewed.

use moodify_common::{Emotion, TrackResult};
use serde::Serialize;
use thiserror::Error;

use crate::trigger::FiringToken;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BoardState {
    /// Nothing requested yet
    Idle,
    Loading {
        token: FiringToken,
        emotion: Emotion,
    },
    Tracks {
        token: FiringToken,
        emotion: Emotion,
        tracks: Vec<TrackResult>,
    },
    /// Request succeeded with zero tracks; manual retry offered
    Empty {
        token: FiringToken,
        emotion: Emotion,
    },
    /// Request failed; manual retry offered
    Unavailable {
        token: FiringToken,
        emotion: Emotion,
        message: String,
    },
    /// Refresh asked for before any mood was seen
    NoMood,
}

/// Result of toggling a track preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewChange {
    /// Start playing this URL, stopping whatever played before
    Play { track_id: String, preview_url: String },
    /// Stop the current preview
    Stop { track_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreviewError {
    #[error("No preview available for this track")]
    Unavailable,

    #[error("Track {0} is not on the board")]
    UnknownTrack(String),
}

#[derive(Debug)]
pub struct ResultBoard {
    state: BoardState,
    now_playing: Option<String>,
}

impl Default for ResultBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultBoard {
    pub fn new() -> Self {
        Self {
            state: BoardState::Idle,
            now_playing: None,
        }
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    /// Track id of the preview currently playing
    pub fn now_playing(&self) -> Option<&str> {
        self.now_playing.as_deref()
    }

    fn replace(&mut self, state: BoardState) {
        if let Some(track_id) = self.now_playing.take() {
            tracing::debug!(track_id = %track_id, "Stopping preview, results superseded");
        }
        self.state = state;
    }

    pub fn show_loading(&mut self, token: FiringToken, emotion: Emotion) {
        self.replace(BoardState::Loading { token, emotion });
    }

    /// Apply a fetch result; an empty list becomes [`BoardState::Empty`]
    pub fn show_tracks(&mut self, token: FiringToken, emotion: Emotion, tracks: Vec<TrackResult>) {
        if tracks.is_empty() {
            self.replace(BoardState::Empty { token, emotion });
        } else {
            self.replace(BoardState::Tracks {
                token,
                emotion,
                tracks,
            });
        }
    }

    pub fn show_unavailable(&mut self, token: FiringToken, emotion: Emotion, message: String) {
        self.replace(BoardState::Unavailable {
            token,
            emotion,
            message,
        });
    }

    pub fn show_no_mood(&mut self) {
        self.replace(BoardState::NoMood);
    }

    pub fn tracks(&self) -> &[TrackResult] {
        match &self.state {
            BoardState::Tracks { tracks, .. } => tracks,
            _ => &[],
        }
    }

    /// Play a track's preview, or stop it if it is the one playing
    pub fn toggle_preview(&mut self, track_id: &str) -> Result<PreviewChange, PreviewError> {
        let track = self
            .tracks()
            .iter()
            .find(|t| t.id == track_id)
            .ok_or_else(|| PreviewError::UnknownTrack(track_id.to_string()))?;

        let preview_url = track
            .preview_url
            .clone()
            .filter(|url| !url.is_empty())
            .ok_or(PreviewError::Unavailable)?;

        if self.now_playing.as_deref() == Some(track_id) {
            self.now_playing = None;
            return Ok(PreviewChange::Stop {
                track_id: track_id.to_string(),
            });
        }

        self.now_playing = Some(track_id.to_string());
        Ok(PreviewChange::Play {
            track_id: track_id.to_string(),
            preview_url,
        })
    }

    /// The player reached the end of a preview
    pub fn preview_ended(&mut self, track_id: &str) {
        if self.now_playing.as_deref() == Some(track_id) {
            self.now_playing = None;
        }
    }
}
