//! HTTP API handlers for extvet-rv

pub mod health;
pub mod requests;
pub mod settings;

pub use health::health_routes;
pub use requests::request_routes;
pub use settings::settings_routes;
