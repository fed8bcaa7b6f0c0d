//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Init logging/metrics → Bind → Serve
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → Stop accepting → Finish in-flight handlers
//!     → Drain background fan-outs (background.rs) → Exit
//! ```
//!
//! # Design Decisions
//! - Fan-outs outlive their request; shutdown waits for them, within a budget
//! - Startup fails fast on any config or bind error

pub mod background;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use background::BackgroundTasks;
pub use shutdown::Shutdown;
