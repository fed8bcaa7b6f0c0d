//! Destination routing subsystem.
//!
//! # Data Flow
//! ```text
//! raw request path + query
//!     → segment.rs (decode scheme markers, cut into runs)
//!     → extractor.rs (parse runs, trim slashes, merge query)
//!     → ordered Vec<Url> handed to the fan-out dispatcher
//! ```
//!
//! # Design Decisions
//! - Extraction is a pure function of path, query, and strategy
//! - Bad runs are dropped individually; only an empty result is an error
//! - Duplicates are kept: the same destination twice gets two deliveries

pub mod extractor;
pub mod segment;

pub use extractor::{DestinationExtractor, ExtractError};
pub use segment::Segmenter;
