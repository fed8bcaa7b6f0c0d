//! Path segmentation into candidate destination runs.
//!
//! # Responsibilities
//! - Decode percent-encoded scheme markers (`https%3A%2F%2F`) in place
//! - Cut the normalized path into runs, one candidate destination each
//!
//! # Design Decisions
//! - Only the scheme token is decoded here; the rest of the path keeps its
//!   encoding so destinations that carry `%2F` and friends survive intact
//! - A scheme-boundary run lasts until a `/` directly followed by the next
//!   marker. A marker without that slash (`cb=https://...`, or a decoded
//!   `%3Dhttps%3A%2F%2F`) stays inside the current destination, while a
//!   literal `/https://` in a destination's own path still splits it. The
//!   delimiter strategy exists for callers that need to avoid that.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{ForwardingConfig, ParseStrategy};

static SCHEME_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://").expect("scheme marker pattern"));

static ENCODED_SCHEME_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(https?)%3A%2F%2F").expect("encoded scheme marker pattern"));

static RUN_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/https?://").expect("run boundary pattern"));

static SCHEME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("scheme prefix pattern"));

/// Decode every percent-encoded `http://` / `https://` marker, leaving the
/// scheme letters in their original case.
pub fn normalize_scheme_markers(path: &str) -> Cow<'_, str> {
    ENCODED_SCHEME_MARKER.replace_all(path, "${1}://")
}

/// Strategy used to split a normalized path into runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Segmenter {
    /// The first scheme marker opens a run; `/` plus a marker ends it and
    /// opens the next.
    #[default]
    SchemeBoundary,
    /// Runs are separated by the given token.
    Delimiter(String),
}

impl Segmenter {
    pub fn from_config(config: &ForwardingConfig) -> Self {
        match config.strategy {
            ParseStrategy::SchemeBoundary => Segmenter::SchemeBoundary,
            ParseStrategy::Delimiter => Segmenter::Delimiter(config.delimiter.clone()),
        }
    }

    /// Split `path` into candidate runs, in path order.
    pub fn runs<'a>(&self, path: &'a str) -> Vec<&'a str> {
        match self {
            Segmenter::SchemeBoundary => scheme_runs(path),
            Segmenter::Delimiter(delimiter) => path
                .split(delimiter.as_str())
                .filter(|piece| SCHEME_PREFIX.is_match(piece))
                .collect(),
        }
    }
}

fn scheme_runs(path: &str) -> Vec<&str> {
    let Some(first) = SCHEME_MARKER.find(path) else {
        return Vec::new();
    };

    let mut runs = Vec::new();
    let mut start = first.start();
    let mut search_from = first.end();
    // A run ends only where `/` is directly followed by the next marker.
    while let Some(boundary) = RUN_BOUNDARY.find_at(path, search_from) {
        runs.push(&path[start..boundary.start()]);
        start = boundary.start() + 1;
        search_from = boundary.end();
    }
    runs.push(&path[start..]);
    runs
}
