//! Concurrent delivery to every destination.
//!
//! # Responsibilities
//! - Spawn one delivery task per destination, in list order
//! - Join them with settle-all semantics into a `FanOutReport`
//! - Register the join with the background task set and return at once
//!
//! # Design Decisions
//! - Each delivery is its own tokio task: an error, timeout, or panic in one
//!   cannot cancel or delay a sibling
//! - One `reqwest::Client` per dispatcher so connections are pooled across
//!   requests; per-destination deadlines come from the client configuration

use std::time::{Duration, Instant};

use futures_util::future::join_all;
use tokio::task::JoinHandle;
use tracing::Instrument;
use url::Url;

use crate::config::ForwardingConfig;
use crate::fanout::outcome::{FanOutReport, ForwardError, ForwardOutcome};
use crate::fanout::payload::Payload;
use crate::lifecycle::BackgroundTasks;
use crate::observability::metrics;

/// Replays captured requests to their destinations.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
}

impl Dispatcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a dispatcher whose client enforces the configured deadlines.
    pub fn from_config(config: &ForwardingConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::new(client))
    }

    /// Start delivering `payload` to every destination.
    ///
    /// All deliveries are spawned before this returns. The settle-all join is
    /// registered with `tasks`; the returned handle resolves to its report and
    /// may be dropped without affecting delivery.
    pub fn fan_out(
        &self,
        destinations: Vec<Url>,
        payload: Payload,
        tasks: &BackgroundTasks,
    ) -> JoinHandle<FanOutReport> {
        let span = tracing::Span::current();

        let pending: Vec<(Url, JoinHandle<ForwardOutcome>)> = destinations
            .into_iter()
            .map(|destination| {
                let delivery = forward(self.client.clone(), destination.clone(), payload.clone());
                (destination, tokio::spawn(delivery.instrument(span.clone())))
            })
            .collect();

        tasks.spawn(settle_all(pending).instrument(span))
    }
}

/// Wait for every delivery, whatever its result.
async fn settle_all(pending: Vec<(Url, JoinHandle<ForwardOutcome>)>) -> FanOutReport {
    let (destinations, handles): (Vec<Url>, Vec<_>) = pending.into_iter().unzip();

    let outcomes = destinations
        .into_iter()
        .zip(join_all(handles).await)
        .map(|(destination, joined)| {
            joined.unwrap_or_else(|e| {
                tracing::error!(destination = %destination, error = %e, "Delivery task aborted");
                ForwardOutcome {
                    destination,
                    elapsed: Duration::ZERO,
                    result: Err(ForwardError::Aborted(e.to_string())),
                }
            })
        })
        .collect();

    let report = FanOutReport { outcomes };
    tracing::info!(
        delivered = report.delivered(),
        failed = report.failed(),
        "Fan-out settled"
    );
    report
}

/// Deliver one copy of the request. Never fails; errors land in the outcome.
async fn forward(client: reqwest::Client, destination: Url, payload: Payload) -> ForwardOutcome {
    let start = Instant::now();

    let mut request = client
        .request(payload.method.clone(), destination.clone())
        .headers(payload.headers.as_ref().clone());
    if let Some(body) = &payload.body {
        request = request.body(body.clone());
    }

    let result = match request.send().await {
        Ok(response) if response.status().is_success() => Ok(response.status()),
        Ok(response) => Err(ForwardError::Status(response.status())),
        Err(e) => Err(ForwardError::from(e)),
    };

    let outcome = ForwardOutcome {
        destination,
        elapsed: start.elapsed(),
        result,
    };

    match &outcome.result {
        Ok(status) => tracing::debug!(
            destination = %outcome.destination,
            status = %status,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "Delivered"
        ),
        Err(e) => tracing::warn!(
            destination = %outcome.destination,
            error = %e,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "Delivery failed"
        ),
    }
    metrics::record_forward(&outcome);

    outcome
}
