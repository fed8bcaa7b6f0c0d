//! Request snapshot replayed to every destination.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request};
use bytes::Bytes;

use crate::security::{headers, BodyError};

/// Return true if requests with this method may carry a payload.
pub fn carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}

/// Immutable copy of the inbound request, captured once.
///
/// Cloning is cheap: headers sit behind an `Arc` and `Bytes` is refcounted,
/// so each destination reads the same buffer through its own handle.
#[derive(Debug, Clone)]
pub struct Payload {
    pub method: Method,
    pub headers: Arc<HeaderMap>,
    pub body: Option<Bytes>,
}

impl Payload {
    pub fn new(method: Method, headers: HeaderMap, body: Option<Bytes>) -> Self {
        Self {
            method,
            headers: Arc::new(headers),
            body,
        }
    }

    /// Sanitize headers and, for body-carrying methods, buffer the body.
    ///
    /// The body of a `GET` or `HEAD` request is never polled.
    pub async fn capture(request: Request<Body>, limit: usize) -> Result<Self, BodyError> {
        let (parts, body) = request.into_parts();

        let body = if carries_body(&parts.method) {
            let bytes = axum::body::to_bytes(body, limit)
                .await
                .map_err(|e| BodyError::from_read(e, limit))?;
            Some(bytes)
        } else {
            None
        };

        Ok(Self::new(parts.method, headers::sanitize(&parts.headers), body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_get_and_head_are_bodiless() {
        assert!(!carries_body(&Method::GET));
        assert!(!carries_body(&Method::HEAD));
        for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS] {
            assert!(carries_body(&method), "{method} should carry a body");
        }
    }

    #[tokio::test]
    async fn post_body_is_captured_and_headers_sanitized() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/https://a.test")
            .header("content-type", "application/json")
            .header("content-length", "13")
            .header("cookie", "a=b")
            .body(Body::from(r#"{"event":"x"}"#))
            .unwrap();

        let payload = Payload::capture(request, 1024).await.unwrap();
        assert_eq!(payload.method, Method::POST);
        assert_eq!(payload.body.as_deref(), Some(&br#"{"event":"x"}"#[..]));
        assert_eq!(payload.headers.len(), 1);
        assert!(payload.headers.contains_key("content-type"));
    }

    #[tokio::test]
    async fn get_body_is_ignored() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/https://a.test")
            .body(Body::from("should not be read"))
            .unwrap();

        let payload = Payload::capture(request, 4).await.unwrap();
        assert!(payload.body.is_none());
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let request = Request::builder()
            .method(Method::PUT)
            .uri("/https://a.test")
            .body(Body::from(vec![1u8; 32]))
            .unwrap();

        let err = Payload::capture(request, 8).await.unwrap_err();
        assert!(matches!(err, BodyError::TooLarge { limit: 8 }));
    }
}
