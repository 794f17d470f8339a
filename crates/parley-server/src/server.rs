//! `ParleyServer`: Axum HTTP + WebSocket server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use parley_core::{BroadcastMessage, EngineSet};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::bridge::BroadcastBridge;
use crate::config::ServerConfig;
use crate::gateway::translate_handler;
use crate::health::{HealthResponse, health_check};
use crate::pipeline::{Pipeline, WorkerPool};
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::{ConnectionRegistry, ws_handler};

/// Startup failures.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listen address could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address we tried.
        addr: String,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The bound socket did not report its address.
    #[error("failed to read local address: {0}")]
    LocalAddr(std::io::Error),
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Translation pipeline.
    pub pipeline: Arc<Pipeline>,
    /// Live subscribers.
    pub registry: Arc<ConnectionRegistry>,
    /// Outbound queue depth for new subscribers.
    pub max_send_queue: usize,
    /// Cancelled on shutdown.
    pub shutdown: CancellationToken,
    /// Prometheus handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
    /// When the server started.
    pub start_time: Instant,
}

/// The Parley relay server.
pub struct ParleyServer {
    config: ServerConfig,
    state: AppState,
    shutdown: ShutdownCoordinator,
    broadcast_rx: mpsc::UnboundedReceiver<BroadcastMessage>,
}

impl ParleyServer {
    /// Create a server around `engines`.
    pub fn new(config: ServerConfig, engines: EngineSet) -> Self {
        let (broadcast_tx, broadcast_rx) = mpsc::unbounded_channel();
        let workers = WorkerPool::new(config.worker_threads, config.engine_timeout);
        let pipeline = Pipeline::new(engines, workers, config.pipeline.clone(), broadcast_tx);
        let shutdown = ShutdownCoordinator::new();

        let state = AppState {
            pipeline: Arc::new(pipeline),
            registry: Arc::new(ConnectionRegistry::new()),
            max_send_queue: config.max_send_queue,
            shutdown: shutdown.token(),
            metrics: None,
            start_time: Instant::now(),
        };

        Self {
            config,
            state,
            shutdown,
            broadcast_rx,
        }
    }

    /// Serve `/metrics` from `handle`.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.state.metrics = Some(handle);
        self
    }

    /// Build the Axum router.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/translate", post(translate_handler))
            .route("/ws", get(ws_handler))
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(self.config.max_body_bytes()))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Subscriber registry.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.state.registry
    }

    /// Translation pipeline.
    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.state.pipeline
    }

    /// Shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind, start the broadcast bridge and serve until shutdown.
    pub async fn listen(self) -> Result<RunningServer, ServerError> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener.local_addr().map_err(ServerError::LocalAddr)?;

        let router = self.router();
        let bridge = BroadcastBridge::new(Arc::clone(&self.state.registry))
            .start(self.broadcast_rx, self.shutdown.token());

        let token = self.shutdown.token();
        let serve = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(token.cancelled_owned())
                .await
            {
                error!(error = %e, "server error");
            }
        });

        info!(
            addr = %local_addr,
            workers = self.config.worker_threads,
            transliteration = self.state.pipeline.has_transliteration(),
            "parley listening"
        );

        Ok(RunningServer {
            local_addr,
            registry: self.state.registry,
            shutdown: self.shutdown,
            shutdown_timeout: self.config.shutdown_timeout,
            handles: vec![serve, bridge],
        })
    }
}

/// A server accepting connections.
pub struct RunningServer {
    local_addr: SocketAddr,
    registry: Arc<ConnectionRegistry>,
    shutdown: ShutdownCoordinator,
    shutdown_timeout: std::time::Duration,
    handles: Vec<JoinHandle<()>>,
}

impl RunningServer {
    /// Bound address.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Subscriber registry.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Token cancelled when shutdown begins.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.token()
    }

    /// Stop accepting, close subscriber sessions and wait for the listener
    /// and bridge within the configured grace period.
    pub async fn shutdown(self) -> bool {
        self.shutdown
            .graceful_shutdown(self.handles, self.shutdown_timeout)
            .await
    }
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health_check(
        state.start_time,
        state.registry.len(),
        state.pipeline.has_transliteration(),
    ))
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            crate::metrics::render(handle),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}
