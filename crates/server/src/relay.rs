use super::Registry;
use gambit_core::ID;
use gambit_lobby::Connection;
use gambit_lobby::RoomSnapshot;
use gambit_lobby::ServerMessage;
use std::sync::Arc;

/// Fans an event out to every participant of a room, optionally skipping
/// the originator. Targets that vanished mid-flight are dropped silently;
/// their disconnect handling owns the cleanup.
#[derive(Clone)]
pub struct Relay {
    registry: Arc<Registry>,
}

impl Relay {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }
    pub async fn send(
        &self,
        snapshot: &RoomSnapshot,
        message: &ServerMessage,
        except: Option<ID<Connection>>,
    ) {
        log::debug!("[relay] room {} fan-out", snapshot.room_id);
        for participant in snapshot
            .participants
            .iter()
            .filter(|p| Some(p.id) != except)
        {
            self.registry.unicast(participant.id, message).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gambit_lobby::Participant;
    use tokio::sync::mpsc::unbounded_channel;

    #[tokio::test]
    async fn excludes_the_sender() {
        let registry = Arc::new(Registry::default());
        let relay = Relay::new(registry.clone());
        let (a, b) = (ID::default(), ID::default());
        let (tx_a, mut rx_a) = unbounded_channel();
        let (tx_b, mut rx_b) = unbounded_channel();
        registry.register(a, tx_a).await;
        registry.register(b, tx_b).await;
        let snapshot = RoomSnapshot {
            room_id: ID::default(),
            participants: vec![Participant::new(a, None), Participant::new(b, None)],
        };
        let message = ServerMessage::closed(snapshot.room_id);
        relay.send(&snapshot, &message, Some(a)).await;
        assert!(rx_a.try_recv().is_err());
        assert_eq!(rx_b.try_recv().unwrap(), message.to_json());
    }

    #[tokio::test]
    async fn vanished_target_is_skipped() {
        let registry = Arc::new(Registry::default());
        let relay = Relay::new(registry.clone());
        let (a, b) = (ID::default(), ID::default());
        let (tx_b, mut rx_b) = unbounded_channel();
        // a never registered: stale snapshot entry
        registry.register(b, tx_b).await;
        let snapshot = RoomSnapshot {
            room_id: ID::default(),
            participants: vec![Participant::new(a, None), Participant::new(b, None)],
        };
        relay
            .send(&snapshot, &ServerMessage::closed(snapshot.room_id), None)
            .await;
        assert!(rx_b.try_recv().is_ok());
    }
}
