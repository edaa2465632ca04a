//! HTTP API handlers

pub mod events;
pub mod health;
pub mod playlist;
pub mod update;
pub mod viewers;

pub use events::event_routes;
pub use health::health_routes;
pub use playlist::playlist_routes;
pub use update::update_routes;
pub use viewers::viewer_routes;
