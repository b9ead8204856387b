use gambit_core::ID;
use gambit_lobby::Connection;
use gambit_lobby::ServerMessage;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedSender;

/// A live connection's bookkeeping: outbound frame channel plus the
/// display name attached via identify, if any.
struct Peer {
    tx: UnboundedSender<String>,
    name: Option<String>,
}

/// Tracks live client connections and their metadata.
///
/// Operations on unknown connection IDs are defensive no-ops, since
/// disconnects race with in-flight operations. Delivery is best-effort:
/// a send to a vanished connection is dropped silently and the separate
/// disconnect handling cleans up membership.
pub struct Registry {
    peers: RwLock<HashMap<ID<Connection>, Peer>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            peers: RwLock::new(HashMap::new()),
        }
    }
}

impl Registry {
    /// Adds a live connection, making it addressable for direct send.
    pub async fn register(&self, id: ID<Connection>, tx: UnboundedSender<String>) {
        self.peers.write().await.insert(id, Peer { tx, name: None });
        log::debug!("[registry] {} registered", id);
    }
    /// Attaches a display name. Repeat calls overwrite; empty names and
    /// unknown connections are ignored.
    pub async fn rename(&self, id: ID<Connection>, name: String) {
        if name.is_empty() {
            log::debug!("[registry] ignored empty name for {}", id);
            return;
        }
        match self.peers.write().await.get_mut(&id) {
            Some(peer) => peer.name = Some(name),
            None => log::debug!("[registry] rename of unknown connection {} ignored", id),
        }
    }
    /// The connection's current display name, if identified.
    pub async fn name(&self, id: ID<Connection>) -> Option<String> {
        self.peers.read().await.get(&id).and_then(|p| p.name.clone())
    }
    /// Removes bookkeeping; called once when the transport closes.
    pub async fn unregister(&self, id: ID<Connection>) {
        self.peers.write().await.remove(&id);
        log::debug!("[registry] {} unregistered", id);
    }
    /// Sends a frame to a single connection, best-effort.
    pub async fn unicast(&self, id: ID<Connection>, message: &ServerMessage) {
        match self.peers.read().await.get(&id).map(|p| p.tx.send(message.to_json())) {
            Some(Ok(())) => log::trace!("[registry] unicast to {}", id),
            Some(Err(_)) => log::debug!("[registry] unicast to {} dropped, channel closed", id),
            None => log::trace!("[registry] unicast to vanished {} dropped", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[tokio::test]
    async fn rename_unknown_is_noop() {
        let registry = Registry::default();
        let id = ID::default();
        registry.rename(id, "ghost".into()).await;
        assert_eq!(registry.name(id).await, None);
    }

    #[tokio::test]
    async fn rename_overwrites() {
        let registry = Registry::default();
        let id = ID::default();
        let (tx, _rx) = unbounded_channel();
        registry.register(id, tx).await;
        registry.rename(id, "alice".into()).await;
        registry.rename(id, "bob".into()).await;
        assert_eq!(registry.name(id).await.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn rename_rejects_empty() {
        let registry = Registry::default();
        let id = ID::default();
        let (tx, _rx) = unbounded_channel();
        registry.register(id, tx).await;
        registry.rename(id, "".into()).await;
        assert_eq!(registry.name(id).await, None);
    }

    #[tokio::test]
    async fn unicast_after_unregister_is_dropped() {
        let registry = Registry::default();
        let id = ID::default();
        let (tx, mut rx) = unbounded_channel();
        registry.register(id, tx).await;
        registry.unregister(id).await;
        registry.unicast(id, &ServerMessage::connected(id)).await;
        assert!(rx.try_recv().is_err());
    }
}
