//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!
//! On file change (--watch):
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server swaps its forwarding settings atomically
//! ```
//!
//! # Design Decisions
//! - All fields have defaults; an empty file is a valid config
//! - Only `[forwarding]` is applied on reload; listener and limits need a restart

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    BackgroundConfig, ForwardingConfig, LimitsConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, ParseStrategy, RelayConfig,
};
pub use watcher::ConfigWatcher;
