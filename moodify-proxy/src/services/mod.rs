//! Upstream provider clients

pub mod recommender;
pub mod spotify_client;
pub mod weather_client;

pub use recommender::Recommender;
pub use spotify_client::{provider_error_message, SpotifyClient, SpotifyError, SpotifyTrack};
pub use weather_client::{WeatherClient, WeatherError};
