//! Destination extraction.
//!
//! Turns the raw request path into the ordered list of URLs the request is
//! replayed to, merging the caller's query string into every destination.

use url::{form_urlencoded, Url};

use crate::config::ForwardingConfig;
use crate::routing::segment::{normalize_scheme_markers, Segmenter};

/// Why a request path produced no destinations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// Nothing follows the leading `/`.
    #[error("No forwarding destinations found in path.")]
    EmptyPath,

    /// The path has content but no run parsed as an http(s) URL.
    #[error("No valid http:// or https:// URL found in path.")]
    NoValidDestination {
        /// The path after scheme-marker normalization.
        raw_path: String,
    },
}

/// Extracts destination URLs from request paths.
#[derive(Debug, Clone, Default)]
pub struct DestinationExtractor {
    segmenter: Segmenter,
}

impl DestinationExtractor {
    pub fn new(segmenter: Segmenter) -> Self {
        Self { segmenter }
    }

    pub fn from_config(config: &ForwardingConfig) -> Self {
        Self::new(Segmenter::from_config(config))
    }

    /// Extract the destinations encoded in `path`.
    ///
    /// `path` is the request path as received (still percent-encoded), and
    /// `query` the raw inbound query string without the `?`. Runs that fail
    /// to parse are skipped; the call only fails when nothing is left.
    pub fn extract(&self, path: &str, query: Option<&str>) -> Result<Vec<Url>, ExtractError> {
        let raw_path = path.strip_prefix('/').unwrap_or(path);
        if raw_path.is_empty() {
            return Err(ExtractError::EmptyPath);
        }

        let normalized = normalize_scheme_markers(raw_path);
        let inbound_params: Vec<(String, String)> = query
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        let destinations: Vec<Url> = self
            .segmenter
            .runs(&normalized)
            .into_iter()
            .filter_map(|run| {
                let parsed = parse_run(run);
                if parsed.is_none() {
                    tracing::debug!(run = %run, "Skipping unparseable destination");
                }
                parsed
            })
            .map(|mut url| {
                trim_trailing_slashes(&mut url);
                append_query(&mut url, &inbound_params);
                url
            })
            .collect();

        if destinations.is_empty() {
            return Err(ExtractError::NoValidDestination {
                raw_path: normalized.into_owned(),
            });
        }

        Ok(destinations)
    }
}

/// Parse a run as-is, then once more with the whole run percent-decoded.
fn parse_run(run: &str) -> Option<Url> {
    Url::parse(run).ok().or_else(|| {
        let decoded = urlencoding::decode(run).ok()?;
        Url::parse(&decoded).ok()
    })
}

/// Drop trailing `/` from the path. A bare root stays `/` since http(s)
/// URLs always serialize a root path.
fn trim_trailing_slashes(url: &mut Url) {
    let trimmed = url.path().trim_end_matches('/');
    if trimmed.len() != url.path().len() {
        let trimmed = trimmed.to_owned();
        url.set_path(&trimmed);
    }
}

fn append_query(url: &mut Url, params: &[(String, String)]) {
    if params.is_empty() {
        return;
    }
    let mut pairs = url.query_pairs_mut();
    for (key, value) in params {
        pairs.append_pair(key, value);
    }
}
