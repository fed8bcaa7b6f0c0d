//! Header sanitization for forwarded requests.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers
//! - Strip headers that identify the caller's origin or the proxy chain
//! - Strip `content-length`; every destination gets its own framing
//!
//! # Design Decisions
//! - Denylist, not allowlist: custom and auth headers pass through untouched
//! - Sanitized once per inbound request and shared by every destination

use axum::http::HeaderMap;

/// Header names removed verbatim.
pub const STRIPPED_HEADERS: &[&str] = &[
    "host",
    "connection",
    "keep-alive",
    "transfer-encoding",
    "upgrade",
    "expect",
    "content-length",
    "accept-encoding",
    "via",
    "forwarded",
    "origin",
    "cookie",
];

/// Header name prefixes removed.
pub const STRIPPED_PREFIXES: &[&str] = &["x-forwarded-", "cf-", "sec-fetch"];

/// Return true if a header must not be forwarded.
///
/// `name` must be lowercase; `HeaderName::as_str` always is.
pub fn is_stripped(name: &str) -> bool {
    STRIPPED_HEADERS.contains(&name)
        || STRIPPED_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

/// Copy `headers` without the stripped ones, keeping order and every value.
pub fn sanitize(headers: &HeaderMap) -> HeaderMap {
    let mut sanitized = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if !is_stripped(name.as_str()) {
            sanitized.append(name.clone(), value.clone());
        }
    }
    sanitized
}
