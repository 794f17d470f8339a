//! Subscription gateway: `/ws` sessions and the subscriber registry.

pub mod connection;
pub mod registry;
pub mod session;

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use crate::server::AppState;

pub use connection::SubscriberConnection;
pub use registry::ConnectionRegistry;
pub use session::{KEEPALIVE_ACK, run_subscriber_session};

/// `GET /ws`: upgrade and run a subscriber session.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        run_subscriber_session(
            socket,
            state.registry,
            state.max_send_queue,
            state.shutdown,
        )
        .await;
    })
}
