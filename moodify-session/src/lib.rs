//! moodify-session: the emotion stabilization and recommendation-refresh
//! controller
//!
//! Frame Sampler → Emotion Classifier → Stability Tracker →
//! Recommendation Trigger → Recommendation Fetcher → Result Board
//!
//! The camera and the classifier are supplied by the embedding front end
//! through [`FrameSource`] and [`EmotionClassifier`].

pub mod board;
pub mod config;
pub mod fetcher;
pub mod sampler;
pub mod schedule;
pub mod session;
pub mod tracker;
pub mod trigger;

pub use board::{BoardState, PreviewChange, PreviewError, ResultBoard};
pub use config::SessionConfig;
pub use fetcher::{ambient_weather, FetchError, ProxyFetcher, RecommendationFetcher, WeatherFetcher};
pub use sampler::{
    dominant_expression, ClassifierError, ClassifierOutput, EmotionClassifier, Frame, FrameSampler,
    FrameSource,
};
pub use schedule::{ChannelTicker, IntervalTicker, Ticker};
pub use session::{MoodSession, SessionError, SessionHandle, SessionSnapshot};
pub use tracker::{MoodTransition, StabilityConfig, StabilityTracker};
pub use trigger::{FiringToken, RecommendationRequest, RecommendationTrigger, TriggerError};
