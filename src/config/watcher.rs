//! Config file watcher for forwarding reloads.
//!
//! Only `[forwarding]` is applied live. Edits to other sections are
//! reported and otherwise ignored until the next restart.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::RelayConfig;

/// What a freshly loaded file means for the running relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadDecision {
    /// Nothing that can be applied changed.
    Unchanged,
    /// Forwarding settings differ and should be swapped in.
    Apply,
}

/// Compare a loaded config with the one last applied.
///
/// Returns the decision plus the names of changed sections that only take
/// effect after a restart.
pub fn classify(current: &RelayConfig, loaded: &RelayConfig) -> (ReloadDecision, Vec<&'static str>) {
    let mut restart_only = Vec::new();
    if current.listener != loaded.listener {
        restart_only.push("listener");
    }
    if current.limits != loaded.limits {
        restart_only.push("limits");
    }
    if current.background != loaded.background {
        restart_only.push("background");
    }
    if current.observability != loaded.observability {
        restart_only.push("observability");
    }

    let decision = if current.forwarding == loaded.forwarding {
        ReloadDecision::Unchanged
    } else {
        ReloadDecision::Apply
    };
    (decision, restart_only)
}

/// Watches one config file and emits validated configs worth applying.
pub struct ConfigWatcher {
    path: PathBuf,
    initial: RelayConfig,
    update_tx: mpsc::UnboundedSender<RelayConfig>,
}

impl ConfigWatcher {
    /// `initial` is the config the server started with.
    ///
    /// Returns the watcher and the receiver the server reads updates from.
    pub fn new(path: &Path, initial: RelayConfig) -> (Self, mpsc::UnboundedReceiver<RelayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            initial,
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. Dropping the returned handle stops the watch.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            initial,
            update_tx,
        } = self;
        let watched = path.clone();
        let current = Mutex::new(initial);

        let handler = move |res: notify::Result<Event>| match res {
            Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                let loaded = match load_config(&watched) {
                    Ok(loaded) => loaded,
                    Err(e) => {
                        tracing::warn!(path = ?watched, error = %e, "Rejected config reload, keeping current settings");
                        return;
                    }
                };

                let Ok(mut current) = current.lock() else {
                    return;
                };
                let (decision, restart_only) = classify(&current, &loaded);
                if !restart_only.is_empty() {
                    tracing::warn!(sections = ?restart_only, "Changed sections take effect after restart");
                }
                if decision == ReloadDecision::Apply {
                    tracing::info!(path = ?watched, "Forwarding settings changed, reloading");
                    current.forwarding = loaded.forwarding.clone();
                    let _ = update_tx.send(loaded);
                }
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = ?e, "Config watch error"),
        };

        let mut watcher =
            RecommendedWatcher::new(handler, Config::default().with_poll_interval(Duration::from_secs(2)))?;
        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}
