//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, relay handler)
//!     → request.rs (request ID)
//!     → [routing extracts destinations]
//!     → [fanout captures payload, starts deliveries]
//!     → response.rs (200 OK or a 4xx rejection)
//!     → Send to caller
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer, Relay};
