//! Registry of live relay connections and their outbound queues.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::mpsc;

use super::history::HistoryEntry;

/// Defensive-only error: the connection id is already registered.
///
/// Unreachable with freshly generated ids; the hub treats it as a no-op.
#[derive(Debug, PartialEq, Eq)]
pub struct DuplicateRegistration;

/// A registered connection's transport handle: the bounded queue its write
/// loop drains. Dropping the entry closes the queue, which ends that loop.
pub struct RegisteredConnection {
    pub sender: mpsc::Sender<Arc<HistoryEntry>>,
}

/// Shared registry of all live connections, keyed by connection id.
///
/// Uses `DashMap` for shard-level concurrency. Purely in-memory; membership
/// mutations only happen through the relay hub's entry points.
pub struct ConnectionRegistry {
    connections: DashMap<String, RegisteredConnection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Add a connection under its id.
    pub fn register(
        &self,
        id: String,
        connection: RegisteredConnection,
    ) -> Result<(), DuplicateRegistration> {
        match self.connections.entry(id) {
            Entry::Occupied(_) => Err(DuplicateRegistration),
            Entry::Vacant(vacant) => {
                vacant.insert(connection);
                Ok(())
            }
        }
    }

    /// Remove a connection. A no-op if already absent — client close can
    /// race with server-initiated cleanup.
    pub fn deregister(&self, id: &str) {
        self.connections.remove(id);
    }

    /// Apply a visitor to every currently registered connection, used for
    /// fan-out. A connection disconnecting mid-iteration surfaces to the
    /// visitor as a closed queue; it never fails the whole broadcast.
    pub fn for_each(&self, mut visitor: impl FnMut(&str, &RegisteredConnection)) {
        for entry in self.connections.iter() {
            visitor(entry.key(), entry.value());
        }
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_connection() -> (RegisteredConnection, mpsc::Receiver<Arc<HistoryEntry>>) {
        let (sender, receiver) = mpsc::channel(8);
        (RegisteredConnection { sender }, receiver)
    }

    #[test]
    fn register_and_len() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = make_connection();
        registry.register("cn_a".to_string(), conn).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn register_duplicate_id_fails() {
        let registry = ConnectionRegistry::new();
        let (first, _rx1) = make_connection();
        let (second, _rx2) = make_connection();

        registry.register("cn_a".to_string(), first).unwrap();
        assert_eq!(
            registry.register("cn_a".to_string(), second),
            Err(DuplicateRegistration)
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn deregister_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = make_connection();
        registry.register("cn_a".to_string(), conn).unwrap();

        registry.deregister("cn_a");
        assert!(registry.is_empty());

        // Absent id: no error, no effect.
        registry.deregister("cn_a");
        registry.deregister("cn_never_seen");
        assert!(registry.is_empty());
    }

    #[test]
    fn for_each_visits_every_connection() {
        let registry = ConnectionRegistry::new();
        let (a, _rx_a) = make_connection();
        let (b, _rx_b) = make_connection();
        registry.register("cn_a".to_string(), a).unwrap();
        registry.register("cn_b".to_string(), b).unwrap();

        let mut seen = Vec::new();
        registry.for_each(|id, _conn| seen.push(id.to_string()));
        seen.sort();
        assert_eq!(seen, vec!["cn_a", "cn_b"]);
    }

    #[test]
    fn for_each_surfaces_closed_queue_to_visitor() {
        let registry = ConnectionRegistry::new();
        let (conn, rx) = make_connection();
        registry.register("cn_a".to_string(), conn).unwrap();
        drop(rx);

        let mut closed = 0;
        registry.for_each(|_id, conn| {
            if conn.sender.is_closed() {
                closed += 1;
            }
        });
        assert_eq!(closed, 1);
    }
}
