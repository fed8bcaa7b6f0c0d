//! Startup orchestration.
//!
//! Order: config → logging → metrics → watcher → listener → serve. Any
//! failure before serving is fatal.

use std::net::SocketAddr;
use std::path::PathBuf;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::{load_config, ConfigError, ConfigWatcher, RelayConfig};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::{logging, metrics};

/// Options supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    /// TOML config file; defaults apply when absent.
    pub config_path: Option<PathBuf>,
    /// Overrides `listener.bind_address`.
    pub bind_override: Option<String>,
    /// Reload `[forwarding]` when the config file changes.
    pub watch: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("--watch requires --config")]
    WatchWithoutConfig,

    #[error("invalid bind address {0:?}")]
    BindAddress(String),

    #[error("failed to start metrics endpoint: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to watch config file: {0}")]
    Watch(#[from] notify::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Resolve the effective configuration from the startup options.
pub fn resolve_config(options: &StartupOptions) -> Result<RelayConfig, StartupError> {
    if options.watch && options.config_path.is_none() {
        return Err(StartupError::WatchWithoutConfig);
    }

    let mut config = match &options.config_path {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };

    if let Some(bind) = &options.bind_override {
        if bind.parse::<SocketAddr>().is_err() {
            return Err(StartupError::BindAddress(bind.clone()));
        }
        config.listener.bind_address = bind.clone();
    }

    Ok(config)
}

/// Run the relay until a shutdown signal arrives and fan-outs drain.
pub async fn run(options: StartupOptions) -> Result<(), StartupError> {
    let config = resolve_config(&options)?;
    logging::init_logging(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "webhook-fanout starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        strategy = ?config.forwarding.strategy,
        request_timeout_secs = config.forwarding.request_timeout_secs,
        grace_period_secs = config.background.grace_period_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validation guarantees the address parses.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr)?;
        }
    }

    // The watcher stops when dropped, so keep it for the server's lifetime.
    let (_watcher, config_updates) = match (&options.config_path, options.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path, config.clone());
            (Some(watcher.run()?), updates)
        }
        _ => (None, mpsc::unbounded_channel().1),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
