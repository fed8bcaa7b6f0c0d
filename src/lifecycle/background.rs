//! Background task set for work that outlives its request.
//!
//! Fan-outs are registered here after the caller has been answered. On
//! shutdown the set is closed and drained for at most the grace period;
//! whatever is still running afterwards is dropped with the runtime.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

use crate::observability::metrics;

/// Tracks detached tasks so shutdown can wait for them.
#[derive(Debug, Clone, Default)]
pub struct BackgroundTasks {
    tracker: TaskTracker,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `task` and track it until it completes.
    pub fn spawn<F>(&self, task: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        metrics::background_task_started();
        self.tracker.spawn(async move {
            let output = task.await;
            metrics::background_task_finished();
            output
        })
    }

    /// Number of tracked tasks still running.
    pub fn len(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }

    /// Close the set and wait for running tasks.
    ///
    /// Returns `true` if every task finished within `grace`.
    pub async fn drain(&self, grace: Duration) -> bool {
        self.tracker.close();
        let remaining = self.len();
        if remaining > 0 {
            tracing::info!(remaining, grace_secs = grace.as_secs(), "Draining background fan-outs");
        }

        match tokio::time::timeout(grace, self.tracker.wait()).await {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(remaining = self.len(), "Grace period elapsed with fan-outs still running");
                false
            }
        }
    }
}
