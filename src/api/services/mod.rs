pub mod health;
pub mod track;

pub use health::{AppStartTime, HealthService, health_routes};
pub use track::{TrackService, TrackState, track_routes};
