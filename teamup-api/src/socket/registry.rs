use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use metrics::counter;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::protocol::ServerEvent;

pub type ConnectionId = Uuid;

type HandleMap = HashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>;

/// Process-wide index of live socket connections keyed by user. A user may
/// hold several connections at once (two tabs, phone plus desktop); each one
/// gets its own outbound handle.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<DashMap<Uuid, HandleMap>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection handle and returns a guard that removes it on drop,
    /// so the entry disappears on every exit path of the connection task.
    pub fn register(
        &self,
        user_id: Uuid,
        sender: mpsc::UnboundedSender<ServerEvent>,
    ) -> ConnectionGuard {
        let connection_id = Uuid::new_v4();
        self.connections
            .entry(user_id)
            .or_default()
            .insert(connection_id, sender);
        tracing::debug!(user_id = %user_id, connection_id = %connection_id, "socket registered");
        ConnectionGuard {
            registry: self.clone(),
            user_id,
            connection_id,
        }
    }

    fn unregister(&self, user_id: Uuid, connection_id: ConnectionId) {
        if let Some(mut handles) = self.connections.get_mut(&user_id) {
            handles.remove(&connection_id);
        }
        // remove_if re-checks emptiness under the shard lock, so a register
        // racing in between is not thrown away
        self.connections.remove_if(&user_id, |_, handles| handles.is_empty());
        tracing::debug!(user_id = %user_id, connection_id = %connection_id, "socket unregistered");
    }

    /// Best-effort fan-out to every live connection of `user_id`; returns how
    /// many handles accepted the event. A closed handle is skipped so one
    /// dead connection cannot block delivery to the rest.
    pub fn broadcast(&self, user_id: Uuid, event: &ServerEvent) -> usize {
        let senders: Vec<mpsc::UnboundedSender<ServerEvent>> = match self.connections.get(&user_id)
        {
            Some(handles) => handles.values().cloned().collect(),
            None => return 0,
        };
        let mut delivered = 0;
        for sender in senders {
            if sender.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                counter!("ws_broadcast_failures_total").increment(1);
                tracing::debug!(user_id = %user_id, "skipped closed socket handle during broadcast");
            }
        }
        delivered
    }

    pub fn connection_count(&self, user_id: Uuid) -> usize {
        self.connections
            .get(&user_id)
            .map(|handles| handles.len())
            .unwrap_or(0)
    }
}

/// Removes its connection from the registry when dropped.
pub struct ConnectionGuard {
    registry: ConnectionRegistry,
    user_id: Uuid,
    connection_id: ConnectionId,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.registry.unregister(self.user_id, self.connection_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connect(
        registry: &ConnectionRegistry,
        user_id: Uuid,
    ) -> (ConnectionGuard, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (registry.register(user_id, tx), rx)
    }

    #[tokio::test]
    async fn broadcast_reaches_every_connection_of_the_user() {
        let registry = ConnectionRegistry::new();
        let user = Uuid::now_v7();
        let (_g1, mut rx1) = connect(&registry, user);
        let (_g2, mut rx2) = connect(&registry, user);

        let delivered = registry.broadcast(user, &ServerEvent::Connected { user_id: user });
        assert_eq!(delivered, 2);
        assert!(matches!(rx1.try_recv(), Ok(ServerEvent::Connected { .. })));
        assert!(matches!(rx2.try_recv(), Ok(ServerEvent::Connected { .. })));
    }

    #[tokio::test]
    async fn broadcast_does_not_cross_users() {
        let registry = ConnectionRegistry::new();
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();
        let (_ga, mut rx_alice) = connect(&registry, alice);
        let (_gb, mut rx_bob) = connect(&registry, bob);

        registry.broadcast(alice, &ServerEvent::Connected { user_id: alice });
        assert!(rx_alice.try_recv().is_ok());
        assert!(rx_bob.try_recv().is_err());
    }

    #[tokio::test]
    async fn dropping_the_guard_unregisters_only_that_connection() {
        let registry = ConnectionRegistry::new();
        let user = Uuid::now_v7();
        let (g1, _rx1) = connect(&registry, user);
        let (_g2, mut rx2) = connect(&registry, user);
        assert_eq!(registry.connection_count(user), 2);

        drop(g1);
        assert_eq!(registry.connection_count(user), 1);

        let delivered = registry.broadcast(user, &ServerEvent::Connected { user_id: user });
        assert_eq!(delivered, 1);
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn last_guard_clears_the_user_entry() {
        let registry = ConnectionRegistry::new();
        let user = Uuid::now_v7();
        let (guard, _rx) = connect(&registry, user);
        drop(guard);

        assert_eq!(registry.connection_count(user), 0);
        assert_eq!(
            registry.broadcast(user, &ServerEvent::Connected { user_id: user }),
            0
        );
    }

    #[tokio::test]
    async fn closed_receiver_does_not_block_the_rest() {
        let registry = ConnectionRegistry::new();
        let user = Uuid::now_v7();
        let (_g1, rx1) = connect(&registry, user);
        let (_g2, mut rx2) = connect(&registry, user);
        drop(rx1);

        let delivered = registry.broadcast(user, &ServerEvent::Connected { user_id: user });
        assert_eq!(delivered, 1);
        assert!(rx2.try_recv().is_ok());
    }
}
