//! HTTP server setup and the relay handler.
//!
//! # Responsibilities
//! - Create the Axum router: every method and path goes to the relay handler
//! - Wire up middleware (tracing, request ID, timeout, body limit)
//! - Extract destinations, capture the payload, start the fan-out
//! - Apply forwarding config reloads without restarting
//! - Drain background fan-outs on shutdown

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use arc_swap::ArcSwap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{ForwardingConfig, RelayConfig};
use crate::fanout::{Dispatcher, Payload};
use crate::http::request::{request_id_middleware, RequestIdExt};
use crate::http::response::{accepted, RelayError};
use crate::lifecycle::BackgroundTasks;
use crate::observability::metrics;
use crate::routing::DestinationExtractor;
use crate::security::limits::body_limit_layer;

/// Hot-reloadable forwarding machinery.
#[derive(Debug, Clone)]
pub struct Relay {
    pub extractor: DestinationExtractor,
    pub dispatcher: Dispatcher,
}

impl Relay {
    pub fn from_config(config: &ForwardingConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            extractor: DestinationExtractor::from_config(config),
            dispatcher: Dispatcher::from_config(config)?,
        })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<ArcSwap<Relay>>,
    pub tasks: BackgroundTasks,
    pub max_body_bytes: usize,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let relay = Relay::from_config(&config.forwarding)?;

        let state = AppState {
            relay: Arc::new(ArcSwap::from_pointee(relay)),
            tasks: BackgroundTasks::new(),
            max_body_bytes: config.limits.max_body_bytes,
        };

        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            config,
            state,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        Router::new()
            .fallback(relay_handler)
            .with_state(state)
            .layer(body_limit_layer(&config.limits))
            .layer(TimeoutLayer::new(Duration::from_secs(config.listener.request_timeout_secs)))
            .layer(middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http())
    }

    /// Handle to the fan-outs started by this server.
    pub fn background_tasks(&self) -> BackgroundTasks {
        self.state.tasks.clone()
    }

    /// Serve until `shutdown` fires, then drain background fan-outs.
    ///
    /// Configs received on `config_updates` replace the forwarding settings
    /// for requests that arrive afterwards.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<RelayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let relay = self.state.relay.clone();
        let reloader = tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                match Relay::from_config(&new_config.forwarding) {
                    Ok(new_relay) => {
                        relay.store(Arc::new(new_relay));
                        tracing::info!(
                            strategy = ?new_config.forwarding.strategy,
                            "Forwarding configuration reloaded"
                        );
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to apply forwarding configuration");
                    }
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, no longer accepting requests");
            })
            .await?;

        reloader.abort();

        let grace = Duration::from_secs(self.config.background.grace_period_secs);
        if self.state.tasks.drain(grace).await {
            tracing::info!("HTTP server stopped, all fan-outs settled");
        } else {
            tracing::warn!("HTTP server stopped with fan-outs abandoned");
        }
        Ok(())
    }
}

/// Relay handler: answers as soon as every delivery has been started.
async fn relay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request.request_id().unwrap_or_default();
    let method = request.method().clone();
    let relay = state.relay.load_full();

    let destinations = match relay
        .extractor
        .extract(request.uri().path(), request.uri().query())
    {
        Ok(destinations) => destinations,
        Err(e) => {
            tracing::debug!(
                request_id = %request_id,
                path = %request.uri().path(),
                error = %e,
                "Rejected request without destinations"
            );
            return reject(RelayError::from(e), start_time);
        }
    };

    let payload = match Payload::capture(request, state.max_body_bytes).await {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to capture request body");
            return reject(RelayError::from(e), start_time);
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        destinations = destinations.len(),
        "Fanning out request"
    );
    metrics::record_destinations(destinations.len());

    let span = tracing::info_span!("fan_out", request_id = %request_id, method = %method);
    // The report is only for tests; `state.tasks` keeps the join alive.
    drop(span.in_scope(|| relay.dispatcher.fan_out(destinations, payload, &state.tasks)));

    metrics::record_request(200, start_time);
    accepted()
}

fn reject(err: RelayError, start_time: Instant) -> Response {
    metrics::record_request(err.status().as_u16(), start_time);
    err.into_response()
}
