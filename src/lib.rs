//! Webhook fan-out relay library.

// Core subsystems
pub mod config;
pub mod fanout;
pub mod http;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::{BackgroundTasks, Shutdown};
