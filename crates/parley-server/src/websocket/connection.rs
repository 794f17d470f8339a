//! Subscriber connection state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// One live listener on `/ws`.
///
/// Outbound frames go through a bounded queue drained by the socket's writer
/// task. A full or closed queue is a failed send.
pub struct SubscriberConnection {
    /// Unique connection ID (`sub_` + uuid v7).
    pub id: String,
    /// Queue feeding the socket writer task.
    tx: mpsc::Sender<Arc<String>>,
    /// When the subscriber connected.
    pub connected_at: Instant,
    /// Frames that could not be enqueued.
    dropped_messages: AtomicU64,
    /// Cancelled when the registry drops this subscriber.
    evicted: CancellationToken,
}

impl SubscriberConnection {
    /// Create a connection with a fresh ID.
    pub fn new(tx: mpsc::Sender<Arc<String>>) -> Self {
        Self::with_id(format!("sub_{}", Uuid::now_v7()), tx)
    }

    /// Create a connection with a caller-chosen ID.
    pub fn with_id(id: impl Into<String>, tx: mpsc::Sender<Arc<String>>) -> Self {
        Self {
            id: id.into(),
            tx,
            connected_at: Instant::now(),
            dropped_messages: AtomicU64::new(0),
            evicted: CancellationToken::new(),
        }
    }

    /// Enqueue a frame for the writer task.
    ///
    /// Returns `false` if the queue is full or closed, and counts the drop.
    pub fn send(&self, message: Arc<String>) -> bool {
        if self.tx.try_send(message).is_ok() {
            true
        } else {
            let _ = self.dropped_messages.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Frames dropped so far.
    pub fn drop_count(&self) -> u64 {
        self.dropped_messages.load(Ordering::Relaxed)
    }

    /// Signal the socket task that this subscriber was dropped.
    pub fn evict(&self) {
        self.evicted.cancel();
    }

    /// Whether [`evict`](Self::evict) has been called.
    pub fn is_evicted(&self) -> bool {
        self.evicted.is_cancelled()
    }

    /// Token cancelled on eviction.
    pub fn eviction(&self) -> CancellationToken {
        self.evicted.clone()
    }
}

impl std::fmt::Debug for SubscriberConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberConnection")
            .field("id", &self.id)
            .field("dropped", &self.drop_count())
            .field("evicted", &self.is_evicted())
            .finish_non_exhaustive()
    }
}
