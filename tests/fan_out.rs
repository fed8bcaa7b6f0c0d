//! End-to-end delivery tests: inbound request in, copies out.

use std::time::{Duration, Instant};

use axum::http::{Method, StatusCode};
use webhook_fanout::config::ParseStrategy;
use webhook_fanout::RelayConfig;

mod common;

#[tokio::test]
async fn post_reaches_every_destination_with_sanitized_headers() {
    let mut one = common::start_ok_destination().await;
    let mut two = common::start_ok_destination().await;
    let relay = common::start_relay(RelayConfig::default()).await;

    let body = r#"{"event":"push","ref":"main"}"#;
    let res = common::client()
        .post(relay.url(&format!("/{}/{}", one.url("/hooks/one"), two.url("/hooks/two"))))
        .header("content-type", "application/json")
        .header("authorization", "Bearer token")
        .header("x-signature", "sha256=abc")
        .header("cookie", "session=secret")
        .header("x-forwarded-for", "10.0.0.1")
        .header("cf-ray", "abc123")
        .header("sec-fetch-site", "cross-site")
        .header("origin", "https://caller.test")
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), "OK");

    for (destination, path) in [(&mut one, "/hooks/one"), (&mut two, "/hooks/two")] {
        let received = destination.next().await;
        assert_eq!(received.method, Method::POST);
        assert_eq!(received.target, path);
        assert_eq!(received.body, body.as_bytes());

        let headers = &received.headers;
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["authorization"], "Bearer token");
        assert_eq!(headers["x-signature"], "sha256=abc");
        assert_eq!(headers["content-length"], body.len().to_string().as_str());
        assert_eq!(headers["host"], destination.addr.to_string().as_str());
        for stripped in ["cookie", "x-forwarded-for", "cf-ray", "sec-fetch-site", "origin", "x-request-id"] {
            assert!(!headers.contains_key(stripped), "{stripped} was forwarded");
        }
    }

    relay.stop().await;
}

#[tokio::test]
async fn get_is_forwarded_without_body_and_keeps_query() {
    let mut destination = common::start_ok_destination().await;
    let relay = common::start_relay(RelayConfig::default()).await;

    let res = common::client()
        .get(relay.url(&format!("/{}?source=ci&source=cd", destination.url("/hook"))))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let received = destination.next().await;
    assert_eq!(received.method, Method::GET);
    assert!(received.body.is_empty());
    assert_eq!(received.target, "/hook?source=ci&source=cd");

    relay.stop().await;
}

#[tokio::test]
async fn trailing_slashes_are_dropped() {
    let mut destination = common::start_ok_destination().await;
    let relay = common::start_relay(RelayConfig::default()).await;

    common::client()
        .put(relay.url(&format!("/{}///", destination.url("/hooks/a"))))
        .body("x")
        .send()
        .await
        .unwrap();

    let received = destination.next().await;
    assert_eq!(received.method, Method::PUT);
    assert_eq!(received.target, "/hooks/a");

    relay.stop().await;
}

#[tokio::test]
async fn encoded_destination_is_decoded() {
    let mut destination = common::start_ok_destination().await;
    let relay = common::start_relay(RelayConfig::default()).await;

    let encoded = format!("http%3A%2F%2F{}%2Fhooks%2Fencoded", destination.addr);
    let res = common::client()
        .post(relay.url(&format!("/{encoded}")))
        .body("payload")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let received = destination.next().await;
    assert_eq!(received.target, "/hooks/encoded");
    assert_eq!(received.body, "payload".as_bytes());

    relay.stop().await;
}

#[tokio::test]
async fn duplicate_destinations_each_get_a_copy() {
    let mut destination = common::start_ok_destination().await;
    let relay = common::start_relay(RelayConfig::default()).await;

    let url = destination.url("/dup");
    common::client()
        .post(relay.url(&format!("/{url}/{url}")))
        .body("twice")
        .send()
        .await
        .unwrap();

    for _ in 0..2 {
        let received = destination.next().await;
        assert_eq!(received.target, "/dup");
        assert_eq!(received.body, "twice".as_bytes());
    }
    destination.expect_nothing(Duration::from_millis(200)).await;

    relay.stop().await;
}

#[tokio::test]
async fn response_does_not_wait_for_slow_destination() {
    let mut slow = common::start_destination(StatusCode::OK, Duration::from_secs(3)).await;
    let relay = common::start_relay(RelayConfig::default()).await;

    let start = Instant::now();
    let res = common::client()
        .post(relay.url(&format!("/{}", slow.url("/slow"))))
        .body("x")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        start.elapsed() < Duration::from_secs(1),
        "caller waited {:?}",
        start.elapsed()
    );

    // Delivery is still under way after the caller has its answer.
    slow.next().await;
    let tasks = relay.tasks.clone();
    assert_eq!(tasks.len(), 1);

    relay.stop().await;
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn failing_destinations_do_not_affect_others() {
    let mut healthy = common::start_ok_destination().await;
    let mut erroring = common::start_destination(StatusCode::INTERNAL_SERVER_ERROR, Duration::ZERO).await;
    let relay = common::start_relay(RelayConfig::default()).await;

    let res = common::client()
        .post(relay.url(&format!(
            "/http://127.0.0.1:1/unreachable/{}/{}",
            erroring.url("/boom"),
            healthy.url("/ok")
        )))
        .body("event")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "OK");

    assert_eq!(erroring.next().await.target, "/boom");
    let received = healthy.next().await;
    assert_eq!(received.target, "/ok");
    assert_eq!(received.body, "event".as_bytes());

    relay.stop().await;
}

#[tokio::test]
async fn delimiter_strategy_splits_on_configured_delimiter() {
    let mut one = common::start_ok_destination().await;
    let mut two = common::start_ok_destination().await;

    let mut config = RelayConfig::default();
    config.forwarding.strategy = ParseStrategy::Delimiter;
    config.forwarding.delimiter = ",".into();
    let relay = common::start_relay(config).await;

    common::client()
        .post(relay.url(&format!("/{},{}", one.url("/a/"), two.url("/b"))))
        .body("x")
        .send()
        .await
        .unwrap();

    assert_eq!(one.next().await.target, "/a");
    assert_eq!(two.next().await.target, "/b");

    relay.stop().await;
}

#[tokio::test]
async fn encoded_callback_url_is_not_a_destination() {
    let mut destination = common::start_ok_destination().await;
    let relay = common::start_relay(RelayConfig::default()).await;

    let res = common::client()
        .post(relay.url(&format!(
            "/{}",
            destination.url("/redirect%3Dhttps%3A%2F%2Fcallback.test%2Fcb")
        )))
        .body("x")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let received = destination.next().await;
    assert_eq!(received.target, "/redirect%3Dhttps://callback.test%2Fcb");
    destination.expect_nothing(Duration::from_millis(200)).await;

    relay.stop().await;
}
