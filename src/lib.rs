pub mod cache;
pub mod config;
pub mod kiosk;
pub mod server;
pub mod telemetry;
