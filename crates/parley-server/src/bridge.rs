//! Hands pipeline results to the subscriber registry.

use std::sync::Arc;

use parley_core::BroadcastMessage;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::websocket::ConnectionRegistry;

/// Drains the pipeline's broadcast channel into [`ConnectionRegistry::broadcast`].
pub struct BroadcastBridge {
    registry: Arc<ConnectionRegistry>,
}

impl BroadcastBridge {
    /// Create a bridge feeding `registry`.
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Spawn the bridge task. It stops when `shutdown` fires or every
    /// sender is gone. Queued messages are delivered before shutdown is
    /// honored.
    pub fn start(
        &self,
        mut rx: mpsc::UnboundedReceiver<BroadcastMessage>,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        let registry = Arc::clone(&self.registry);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    message = rx.recv() => match message {
                        Some(message) => {
                            debug!(subscribers = registry.len(), "broadcasting result");
                            registry.broadcast(&message);
                        }
                        None => {
                            info!("broadcast channel closed");
                            break;
                        }
                    },
                    () = shutdown.cancelled() => {
                        info!("broadcast bridge stopping");
                        break;
                    }
                }
            }
        })
    }
}
