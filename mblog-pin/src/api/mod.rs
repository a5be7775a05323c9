//! HTTP API handlers for mblog-pin

pub mod health;
pub mod uploads;

pub use health::health_routes;
pub use uploads::{upload_file, upload_json, upload_routes};
