//! # parley-server
//!
//! Axum HTTP + WebSocket server for the Parley relay.
//!
//! - `POST /translate`: run the pipeline, answer the caller, broadcast the result
//! - `GET /ws`: subscribe to broadcasts; every inbound frame is acked
//! - `GET /health`, `GET /metrics`
//!
//! Engine calls run on a bounded blocking pool so the executor never waits
//! on recognition, translation or synthesis.

#![deny(unsafe_code)]

pub mod bridge;
pub mod config;
pub mod gateway;
pub mod health;
pub mod metrics;
pub mod pipeline;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use config::ServerConfig;
pub use pipeline::{Pipeline, PipelineConfig, WorkerPool};
pub use server::{AppState, ParleyServer, RunningServer, ServerError};
pub use shutdown::ShutdownCoordinator;
pub use websocket::{ConnectionRegistry, KEEPALIVE_ACK, SubscriberConnection};
