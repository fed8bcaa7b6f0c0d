//! Per-destination delivery results.
//!
//! Outcomes never reach the caller; they feed logs, metrics, and tests.

use std::time::Duration;

use reqwest::StatusCode;
use url::Url;

/// Why a single delivery failed.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("destination responded with {0}")]
    Status(StatusCode),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("delivery task aborted: {0}")]
    Aborted(String),
}

impl From<reqwest::Error> for ForwardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ForwardError::Timeout
        } else if err.is_connect() {
            ForwardError::Connect(err)
        } else {
            ForwardError::Transport(err)
        }
    }
}

impl ForwardError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::Timeout => "timeout",
            ForwardError::Connect(_) => "connect",
            ForwardError::Status(_) => "status",
            ForwardError::Transport(_) => "transport",
            ForwardError::Aborted(_) => "aborted",
        }
    }
}

/// Result of delivering to one destination.
#[derive(Debug)]
pub struct ForwardOutcome {
    pub destination: Url,
    pub elapsed: Duration,
    /// Success status on delivery.
    pub result: Result<StatusCode, ForwardError>,
}

impl ForwardOutcome {
    pub fn is_delivered(&self) -> bool {
        self.result.is_ok()
    }
}

/// Settled state of one fan-out: every destination, in list order.
#[derive(Debug, Default)]
pub struct FanOutReport {
    pub outcomes: Vec<ForwardOutcome>,
}

impl FanOutReport {
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_delivered()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.delivered()
    }
}
