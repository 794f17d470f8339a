//! Subscriber membership and fan-out.

use std::sync::Arc;

use metrics::{counter, gauge};
use parking_lot::Mutex;
use parley_core::BroadcastMessage;
use tracing::{debug, error};

use super::connection::SubscriberConnection;
use crate::metrics::{BROADCAST_PRUNED_TOTAL, BROADCASTS_TOTAL, WS_CONNECTIONS_ACTIVE};

/// The set of live subscribers, in registration order.
///
/// One mutex guards membership. It is never held while enqueueing frames:
/// [`broadcast`](Self::broadcast) snapshots the members, sends unlocked, then
/// relocks only to drop the ones that failed.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: Mutex<Vec<Arc<SubscriberConnection>>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber. A second registration under the same ID replaces
    /// the first in place.
    pub fn register(&self, connection: Arc<SubscriberConnection>) {
        let count = {
            let mut conns = self.connections.lock();
            if let Some(slot) = conns.iter_mut().find(|c| c.id == connection.id) {
                *slot = connection;
            } else {
                conns.push(connection);
            }
            conns.len()
        };
        gauge!(WS_CONNECTIONS_ACTIVE).set(count as f64);
    }

    /// Remove a subscriber by ID. Returns whether it was present.
    pub fn unregister(&self, id: &str) -> bool {
        let (removed, count) = {
            let mut conns = self.connections.lock();
            let before = conns.len();
            conns.retain(|c| c.id != id);
            (conns.len() != before, conns.len())
        };
        if removed {
            gauge!(WS_CONNECTIONS_ACTIVE).set(count as f64);
        }
        removed
    }

    /// Deliver `message` to every subscriber.
    ///
    /// The message is serialized once. Subscribers whose queue is full or
    /// closed are removed after the pass and told to close.
    pub fn broadcast(&self, message: &BroadcastMessage) {
        let payload = match serde_json::to_string(message) {
            Ok(json) => Arc::new(json),
            Err(e) => {
                error!(error = %e, topic = %message.topic, "failed to serialize broadcast");
                return;
            }
        };
        self.fan_out(&payload);
    }

    /// Deliver a pre-serialized frame to every subscriber.
    pub fn fan_out(&self, payload: &Arc<String>) {
        let snapshot: Vec<Arc<SubscriberConnection>> = self.connections.lock().clone();

        let failed: Vec<Arc<SubscriberConnection>> = snapshot
            .into_iter()
            .filter(|conn| !conn.send(Arc::clone(payload)))
            .collect();

        counter!(BROADCASTS_TOTAL).increment(1);
        if failed.is_empty() {
            debug!(bytes = payload.len(), "broadcast delivered");
            return;
        }

        let count = {
            let mut conns = self.connections.lock();
            conns.retain(|c| !failed.iter().any(|f| Arc::ptr_eq(f, c)));
            conns.len()
        };
        gauge!(WS_CONNECTIONS_ACTIVE).set(count as f64);
        counter!(BROADCAST_PRUNED_TOTAL).increment(failed.len() as u64);

        for conn in &failed {
            debug!(conn_id = %conn.id, dropped = conn.drop_count(), "pruned subscriber after failed send");
            conn.evict();
        }
    }

    /// Number of live subscribers.
    pub fn len(&self) -> usize {
        self.connections.lock().len()
    }

    /// Whether there are no subscribers.
    pub fn is_empty(&self) -> bool {
        self.connections.lock().is_empty()
    }

    /// IDs in registration order.
    pub fn ids(&self) -> Vec<String> {
        self.connections.lock().iter().map(|c| c.id.clone()).collect()
    }
}
