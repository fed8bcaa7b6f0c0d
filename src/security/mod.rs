//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (bound the body captured for replay)
//!     → headers.rs (strip hop-by-hop and origin-identifying headers)
//!     → Sanitized payload shared by every destination
//! ```
//!
//! # Design Decisions
//! - Nothing about the relay's own transport leaks to destinations
//! - Authentication headers are the caller's business and pass through

pub mod headers;
pub mod limits;

pub use headers::sanitize;
pub use limits::BodyError;
