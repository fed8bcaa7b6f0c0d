//! Fan-out subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → payload.rs (sanitize headers, buffer body once)
//!     → dispatcher.rs (one task per destination, joined settle-all)
//!     → outcome.rs (per-destination results, internal only)
//! ```
//!
//! # Design Decisions
//! - The caller's response never waits on a destination
//! - Outcomes are logged and counted, never returned to the caller

pub mod dispatcher;
pub mod outcome;
pub mod payload;

pub use dispatcher::Dispatcher;
pub use outcome::{FanOutReport, ForwardError, ForwardOutcome};
pub use payload::{carries_body, Payload};
