//! HTTP API handlers for moodify-proxy

pub mod buildinfo;
pub mod health;
pub mod recommendations;
pub mod search;
pub mod status;
pub mod weather;

pub use buildinfo::buildinfo_routes;
pub use health::health_routes;
pub use recommendations::recommendation_routes;
pub use search::search_routes;
pub use status::status_routes;
pub use weather::weather_routes;
