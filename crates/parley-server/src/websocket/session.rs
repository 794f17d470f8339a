//! Subscriber session lifecycle, from upgrade through disconnect.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use super::connection::SubscriberConnection;
use super::registry::ConnectionRegistry;

/// Reply to every inbound frame.
pub const KEEPALIVE_ACK: &str = r#"{"ack":"pong"}"#;

/// How long the writer gets to flush queued frames and send Close.
const WRITER_DRAIN: Duration = Duration::from_secs(1);

/// Why a session ended.
#[derive(Clone, Copy, Debug)]
enum SessionEnd {
    Disconnected,
    Evicted,
    Shutdown,
}

/// Run one subscriber session.
///
/// Registers the subscriber, acks inbound frames, and forwards broadcasts
/// through the writer task until the client leaves, the subscriber is
/// evicted, or shutdown begins. Always unregisters before returning.
#[instrument(skip_all, fields(conn_id = tracing::field::Empty))]
pub async fn run_subscriber_session(
    ws: WebSocket,
    registry: Arc<ConnectionRegistry>,
    max_send_queue: usize,
    shutdown: CancellationToken,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();

    let (send_tx, mut send_rx) = mpsc::channel::<Arc<String>>(max_send_queue.max(1));
    let connection = Arc::new(SubscriberConnection::new(send_tx));
    let conn_id = connection.id.clone();
    let _ = tracing::Span::current().record("conn_id", conn_id.as_str());
    let evicted = connection.eviction();

    registry.register(Arc::clone(&connection));
    info!(subscribers = registry.len(), "subscriber connected");

    let mut outbound = tokio::spawn(async move {
        while let Some(frame) = send_rx.recv().await {
            if ws_tx.send(Message::Text(frame.as_str().into())).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    let ack = Arc::new(KEEPALIVE_ACK.to_string());
    let mut writer_done = false;
    let end = loop {
        tokio::select! {
            () = shutdown.cancelled() => break SessionEnd::Shutdown,
            () = evicted.cancelled() => break SessionEnd::Evicted,
            _ = &mut outbound => {
                writer_done = true;
                break SessionEnd::Disconnected;
            }
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Text(_) | Message::Binary(_))) => {
                    if !connection.send(Arc::clone(&ack)) {
                        debug!("ack not enqueued, send queue full");
                    }
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                Some(Ok(Message::Close(_))) | None => break SessionEnd::Disconnected,
                Some(Err(e)) => {
                    debug!(error = %e, "socket read failed");
                    break SessionEnd::Disconnected;
                }
            },
        }
    };

    let _ = registry.unregister(&conn_id);
    let dropped = connection.drop_count();
    let connected_secs = connection.connected_at.elapsed().as_secs();

    // Last sender gone: the writer drains what is queued, then sends Close.
    drop(connection);
    if !writer_done && tokio::time::timeout(WRITER_DRAIN, &mut outbound).await.is_err() {
        outbound.abort();
    }

    info!(reason = ?end, dropped, connected_secs, "subscriber disconnected");
}
