//! HTTP API handlers for calico-server

pub mod extract;
pub mod health;
pub mod songs;
pub mod status;

pub use extract::ExistingSong;
pub use health::health_routes;
pub use songs::song_routes;
pub use status::status_routes;
