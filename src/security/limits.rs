//! Inbound request limits.
//!
//! # Responsibilities
//! - Bound the body captured for replay
//! - Tell a limit violation apart from an ordinary read failure
//!
//! # Design Decisions
//! - The limit is enforced twice: by `RequestBodyLimitLayer` (early 413 on a
//!   declared `content-length`) and while buffering (chunked bodies)
//! - Both paths surface `http_body_util::LengthLimitError`

use std::error::Error as StdError;

use http_body_util::LengthLimitError;
use tower_http::limit::RequestBodyLimitLayer;

use crate::config::LimitsConfig;

/// Failure while buffering the inbound body.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    Read(#[source] axum::Error),
}

impl BodyError {
    /// Classify an error returned by `axum::body::to_bytes`.
    pub fn from_read(err: axum::Error, limit: usize) -> Self {
        if is_length_limit(&err) {
            BodyError::TooLarge { limit }
        } else {
            BodyError::Read(err)
        }
    }
}

/// Walk the source chain looking for a body length violation.
pub fn is_length_limit(err: &axum::Error) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err as &(dyn StdError + 'static));
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

/// Layer rejecting bodies above `limits.max_body_bytes`.
pub fn body_limit_layer(limits: &LimitsConfig) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(limits.max_body_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[tokio::test]
    async fn oversized_body_is_too_large() {
        let body = Body::from(vec![0u8; 64]);
        let err = axum::body::to_bytes(body, 16).await.unwrap_err();
        assert!(matches!(
            BodyError::from_read(err, 16),
            BodyError::TooLarge { limit: 16 }
        ));
    }

    #[tokio::test]
    async fn body_within_limit_reads_fully() {
        let body = Body::from("payload");
        let bytes = axum::body::to_bytes(body, 16).await.unwrap();
        assert_eq!(&bytes[..], b"payload");
    }
}
