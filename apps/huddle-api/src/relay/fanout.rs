//! The broadcast relay hub: join, ingest + fan-out, leave.
//!
//! All history and registry mutations go through the hub. One mutex around
//! the history log is the single serialization domain: append + fan-out for
//! a message, and register + snapshot for a join, each run as one critical
//! section. Every connection therefore observes the same total order, and a
//! joiner's replay is an exact prefix of it.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::history::{HistoryEntry, HistoryLog};
use super::registry::{ConnectionRegistry, RegisteredConnection};

/// A joined connection, handed to the transport loop.
pub struct RelaySession {
    /// Unique connection id (`cn_` prefixed ULID).
    pub id: String,
    /// Queue of entries fanned out after the join snapshot was taken.
    pub outbound: mpsc::Receiver<Arc<HistoryEntry>>,
}

/// The relay hub. Store in `AppState` behind an `Arc`.
pub struct RelayHub {
    log: Mutex<HistoryLog>,
    registry: ConnectionRegistry,
    outbound_buffer: usize,
}

impl RelayHub {
    pub fn new(history_capacity: Option<usize>, outbound_buffer: usize) -> Self {
        Self {
            log: Mutex::new(HistoryLog::new(history_capacity)),
            registry: ConnectionRegistry::new(),
            outbound_buffer,
        }
    }

    /// Register a new connection and capture the history to replay to it.
    ///
    /// Registration and snapshot happen under the history lock, so the
    /// snapshot is exactly the prefix of entries that will never arrive
    /// through the connection's queue.
    pub fn join(&self) -> (RelaySession, Vec<Arc<HistoryEntry>>) {
        let id = huddle_common::id::prefixed_ulid(huddle_common::id::prefix::CONNECTION);
        let (sender, outbound) = mpsc::channel(self.outbound_buffer);

        let replay = {
            let log = self.log.lock();
            let replay = log.snapshot();
            if let Err(err) = self
                .registry
                .register(id.clone(), RegisteredConnection { sender })
            {
                tracing::warn!(?err, connection_id = %id, "duplicate registration ignored");
            }
            replay
        };

        tracing::info!(
            connection_id = %id,
            connections = self.registry.len(),
            replay = replay.len(),
            "connection joined"
        );

        (RelaySession { id, outbound }, replay)
    }

    /// Append a payload to the history and fan it out to every registered
    /// connection — the sender included; echo-back is expected.
    ///
    /// Returns the assigned sequence number. A connection whose queue is
    /// full or closed is deregistered; delivery to the rest proceeds.
    pub fn publish(&self, text: String) -> u64 {
        let mut failed: Vec<String> = Vec::new();

        let entry = {
            let mut log = self.log.lock();
            let entry = log.append(text);
            self.registry.for_each(|id, conn| {
                match conn.sender.try_send(entry.clone()) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        tracing::debug!(
                            connection_id = %id,
                            seq = entry.seq,
                            "outbound queue full, dropping connection"
                        );
                        failed.push(id.to_string());
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        failed.push(id.to_string());
                    }
                }
            });
            entry
        };

        for id in &failed {
            self.registry.deregister(id);
            tracing::debug!(connection_id = %id, "deregistered after delivery failure");
        }

        entry.seq
    }

    /// Deregister a connection. Idempotent.
    pub fn leave(&self, id: &str) {
        self.registry.deregister(id);
        tracing::info!(
            connection_id = %id,
            connections = self.registry.len(),
            "connection left"
        );
    }

    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hub() -> RelayHub {
        RelayHub::new(None, 256)
    }

    #[tokio::test]
    async fn join_with_empty_history_replays_nothing() {
        let hub = hub();
        let (session, replay) = hub.join();
        assert!(replay.is_empty());
        assert_eq!(hub.connection_count(), 1);
        drop(session);
    }

    #[tokio::test]
    async fn publish_reaches_all_connections_including_sender() {
        let hub = hub();
        let (mut a, _) = hub.join();
        let (mut b, _) = hub.join();

        let seq = hub.publish("hello".to_string());
        assert_eq!(seq, 1);

        let to_a = a.outbound.recv().await.unwrap();
        let to_b = b.outbound.recv().await.unwrap();
        assert_eq!(to_a.text, "hello");
        assert_eq!(to_b.text, "hello");
        assert_eq!(to_a.seq, to_b.seq);
    }

    #[tokio::test]
    async fn join_after_messages_replays_them_in_order() {
        let hub = hub();
        hub.publish("one".to_string());
        hub.publish("two".to_string());

        let (mut session, replay) = hub.join();
        let texts: Vec<&str> = replay.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);

        // Nothing published since the join: the queue is empty.
        assert!(session.outbound.try_recv().is_err());
    }

    #[tokio::test]
    async fn replay_and_queue_partition_the_log() {
        let hub = hub();
        let (mut a, _) = hub.join();
        hub.publish("before".to_string());

        let (mut b, replay) = hub.join();
        hub.publish("after".to_string());

        // B replays exactly the pre-join prefix and queues only the rest.
        assert_eq!(replay.len(), 1);
        assert_eq!(replay[0].text, "before");
        let queued = b.outbound.recv().await.unwrap();
        assert_eq!(queued.text, "after");
        assert!(b.outbound.try_recv().is_err());

        // A sees the full order through its queue alone.
        assert_eq!(a.outbound.recv().await.unwrap().text, "before");
        assert_eq!(a.outbound.recv().await.unwrap().text, "after");
    }

    #[tokio::test]
    async fn slow_consumer_is_deregistered() {
        let hub = RelayHub::new(None, 1);
        let (mut session, _) = hub.join();

        hub.publish("fits".to_string());
        // The queue (capacity 1) is now full; the next publish drops us.
        hub.publish("overflows".to_string());
        assert_eq!(hub.connection_count(), 0);

        // The buffered entry is still delivered, then the queue ends.
        assert_eq!(session.outbound.recv().await.unwrap().text, "fits");
        assert!(session.outbound.recv().await.is_none());
    }

    #[tokio::test]
    async fn delivery_failure_does_not_disturb_others() {
        let hub = hub();
        let (a, _) = hub.join();
        let (mut b, _) = hub.join();

        // A's transport goes away without a leave.
        drop(a);

        hub.publish("still flowing".to_string());
        assert_eq!(b.outbound.recv().await.unwrap().text, "still flowing");
        assert_eq!(hub.connection_count(), 1);
    }

    #[tokio::test]
    async fn leave_is_idempotent() {
        let hub = hub();
        let (session, _) = hub.join();
        assert_eq!(hub.connection_count(), 1);

        hub.leave(&session.id);
        hub.leave(&session.id);
        assert_eq!(hub.connection_count(), 0);
    }

    #[tokio::test]
    async fn leaving_closes_the_outbound_queue() {
        let hub = hub();
        let (mut session, _) = hub.join();
        hub.leave(&session.id);
        assert!(session.outbound.recv().await.is_none());
    }

    #[tokio::test]
    async fn capped_history_replays_the_retained_suffix() {
        let hub = RelayHub::new(Some(2), 256);
        hub.publish("1".to_string());
        hub.publish("2".to_string());
        hub.publish("3".to_string());

        let (_session, replay) = hub.join();
        let texts: Vec<&str> = replay.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["2", "3"]);
    }
}
