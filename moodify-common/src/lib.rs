//! # Moodify Common Library
//!
//! Shared code for the Moodify proxy and session crates:
//! - Emotion labels and the per-emotion display tables
//! - Data model shared over the wire (tracks, weather, samples)
//! - Session event types and the event bus
//! - Configuration loading (CLI → ENV → TOML → defaults)
//! - Common error type

pub mod config;
pub mod emotion;
pub mod error;
pub mod events;
pub mod types;

pub use emotion::{Emotion, MoodProfile};
pub use error::{Error, Result};
pub use types::{EmotionSample, TrackResult, Weather, WeatherQuery};
