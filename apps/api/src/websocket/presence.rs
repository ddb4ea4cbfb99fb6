use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::events::ServerEvent;

pub type ConnectionId = Uuid;

/// Frames travelling over a connection's outbound channel. `Close` tells
/// the writer task to shut the session down (sent when a newer connection
/// for the same user evicts this one).
#[derive(Debug)]
pub enum Outbound {
    Event(ServerEvent),
    Close,
}

/// Handle to one live connection: its id plus the write side of its
/// outbound channel.
#[derive(Clone)]
pub struct ConnectionHandle {
    pub conn_id: ConnectionId,
    tx: mpsc::UnboundedSender<Outbound>,
}

impl ConnectionHandle {
    pub fn new(conn_id: ConnectionId, tx: mpsc::UnboundedSender<Outbound>) -> Self {
        Self { conn_id, tx }
    }

    /// Best-effort write. A closed channel means the connection is gone by
    /// the time the event is ready; the event is simply dropped.
    pub fn send(&self, event: ServerEvent) -> bool {
        self.tx.send(Outbound::Event(event)).is_ok()
    }

    pub fn close(&self) {
        let _ = self.tx.send(Outbound::Close);
    }
}

/// Authoritative map of who is online: user id to their single live
/// connection. Shared by every connection task; constructed once at
/// startup and injected, never referenced as a global.
pub struct PresenceTable {
    entries: RwLock<HashMap<Uuid, ConnectionHandle>>,
}

impl PresenceTable {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Register the user's connection, returning the handle it evicted so
    /// the caller can close it. At most one live entry per user.
    pub async fn register(
        &self,
        user_id: Uuid,
        handle: ConnectionHandle,
    ) -> Option<ConnectionHandle> {
        self.entries.write().await.insert(user_id, handle)
    }

    /// Compare-and-remove: drop the user's entry only if it still belongs
    /// to `conn_id`. Returns whether an entry was removed. A stale
    /// disconnect racing a newer registration must not evict the newer
    /// session.
    pub async fn deregister(&self, user_id: Uuid, conn_id: ConnectionId) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get(&user_id) {
            Some(current) if current.conn_id == conn_id => {
                entries.remove(&user_id);
                true
            }
            _ => false,
        }
    }

    pub async fn lookup(&self, user_id: Uuid) -> Option<ConnectionHandle> {
        self.entries.read().await.get(&user_id).cloned()
    }

    pub async fn is_online(&self, user_id: Uuid) -> bool {
        self.entries.read().await.contains_key(&user_id)
    }

    /// Snapshot of currently-registered users.
    pub async fn list_online(&self) -> Vec<Uuid> {
        self.entries.read().await.keys().copied().collect()
    }

    /// Fan one event out to every registered connection.
    pub async fn broadcast(&self, event: ServerEvent) {
        for handle in self.entries.read().await.values() {
            handle.send(event.clone());
        }
    }
}

impl Default for PresenceTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_handle() -> (ConnectionHandle, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ConnectionHandle::new(Uuid::new_v4(), tx), rx)
    }

    #[tokio::test]
    async fn register_evicts_prior_handle() {
        let table = PresenceTable::new();
        let user = Uuid::new_v4();
        let (first, _rx1) = test_handle();
        let (second, _rx2) = test_handle();
        let first_id = first.conn_id;

        assert!(table.register(user, first).await.is_none());
        let evicted = table.register(user, second).await.unwrap();
        assert_eq!(evicted.conn_id, first_id);
    }

    #[tokio::test]
    async fn stale_deregister_does_not_evict_newer_session() {
        let table = PresenceTable::new();
        let user = Uuid::new_v4();
        let (old, _rx1) = test_handle();
        let (new, _rx2) = test_handle();
        let old_id = old.conn_id;
        let new_id = new.conn_id;

        table.register(user, old).await;
        table.register(user, new).await;

        // The old connection disconnects after being replaced.
        assert!(!table.deregister(user, old_id).await);
        assert!(table.is_online(user).await);
        assert_eq!(table.lookup(user).await.unwrap().conn_id, new_id);

        // The authoritative connection can still deregister itself.
        assert!(table.deregister(user, new_id).await);
        assert!(!table.is_online(user).await);
    }

    #[tokio::test]
    async fn broadcast_reaches_every_registered_connection() {
        let table = PresenceTable::new();
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();
        let (handle_a, mut rx_a) = test_handle();
        let (handle_b, mut rx_b) = test_handle();

        table.register(user_a, handle_a).await;
        table.register(user_b, handle_b).await;
        table
            .broadcast(ServerEvent::UserOnline { user_id: user_a })
            .await;

        for rx in [&mut rx_a, &mut rx_b] {
            match rx.try_recv().unwrap() {
                Outbound::Event(ServerEvent::UserOnline { user_id }) => assert_eq!(user_id, user_a),
                other => panic!("unexpected frame: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn list_online_is_a_snapshot_of_registered_keys() {
        let table = PresenceTable::new();
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();
        let (handle_a, _rx_a) = test_handle();
        let (handle_b, _rx_b) = test_handle();

        table.register(user_a, handle_a).await;
        table.register(user_b, handle_b).await;

        let mut online = table.list_online().await;
        online.sort();
        let mut expected = vec![user_a, user_b];
        expected.sort();
        assert_eq!(online, expected);
    }

    #[tokio::test]
    async fn send_to_dropped_receiver_reports_failure() {
        let (handle, rx) = test_handle();
        drop(rx);
        assert!(!handle.send(ServerEvent::UserOffline {
            user_id: Uuid::new_v4()
        }));
    }
}
