//! API endpoint modules.

pub mod health;
pub mod openapi;
pub mod pulse;

pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use pulse::configure_routes as configure_pulse_routes;
