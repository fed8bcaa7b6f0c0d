//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): inbound requests by response status
//! - `relay_request_duration_seconds` (histogram): time to answer the caller
//! - `relay_destinations_per_request` (histogram): fan-out width
//! - `relay_forwards_total` (counter): deliveries by outcome
//! - `relay_forward_duration_seconds` (histogram): per-destination latency
//! - `relay_background_tasks` (gauge): fan-outs still settling
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so tests need no setup
//! - Delivery outcomes stay internal; this is the only place they are counted

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::fanout::ForwardOutcome;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record an answered inbound request.
pub fn record_request(status: u16, start: Instant) {
    counter!("relay_requests_total", "status" => status.to_string()).increment(1);
    histogram!("relay_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_destinations(count: usize) {
    histogram!("relay_destinations_per_request").record(count as f64);
}

/// Record one settled delivery.
pub fn record_forward(outcome: &ForwardOutcome) {
    let label = match &outcome.result {
        Ok(_) => "delivered",
        Err(e) => e.kind(),
    };
    counter!("relay_forwards_total", "outcome" => label).increment(1);
    histogram!("relay_forward_duration_seconds").record(outcome.elapsed.as_secs_f64());
}

pub fn background_task_started() {
    gauge!("relay_background_tasks").increment(1.0);
}

pub fn background_task_finished() {
    gauge!("relay_background_tasks").decrement(1.0);
}
