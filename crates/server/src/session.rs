use super::Registry;
use super::Relay;
use gambit_core::ID;
use gambit_lobby::ClientMessage;
use gambit_lobby::Connection;
use gambit_lobby::Lobby;
use gambit_lobby::Protocol;
use gambit_lobby::Room;
use gambit_lobby::ServerMessage;
use std::sync::Arc;
use tokio::sync::mpsc::unbounded_channel;

/// Translates inbound connection events into room store operations and
/// outbound broadcasts.
///
/// Every handler runs as one atomic step relative to other handlers
/// touching the same room (the store serializes per room), and every
/// handler that mutates membership updates the registry and the store in
/// the same invocation. Store failures are terminal for the single
/// requested operation and surfaced to the requester only.
#[derive(Clone)]
pub struct Coordinator {
    registry: Arc<Registry>,
    lobby: Arc<Lobby>,
    relay: Relay,
}

impl Default for Coordinator {
    fn default() -> Self {
        let registry = Arc::new(Registry::default());
        Self {
            relay: Relay::new(registry.clone()),
            lobby: Arc::new(Lobby::default()),
            registry,
        }
    }
}

impl Coordinator {
    /// Accepts a fresh WebSocket: registers the connection, sends the
    /// hello frame, and spawns the pump between the registry channel and
    /// the socket. Loop exit on either side triggers disconnect cleanup.
    pub async fn bridge(
        &self,
        mut session: actix_ws::Session,
        mut stream: actix_ws::MessageStream,
    ) -> anyhow::Result<()> {
        use futures::StreamExt;
        let id = ID::default();
        let (tx, mut rx) = unbounded_channel::<String>();
        self.registry.register(id, tx).await;
        if let Err(e) = session.text(ServerMessage::connected(id).to_json()).await {
            self.registry.unregister(id).await;
            return Err(anyhow::anyhow!("{}", e));
        }
        log::debug!("[session {}] connected", id);
        let coordinator = self.clone();
        actix_web::rt::spawn(async move {
            'sesh: loop {
                tokio::select! {
                    biased;
                    msg = rx.recv() => match msg {
                        Some(json) => if session.text(json).await.is_err() { break 'sesh },
                        None => break 'sesh,
                    },
                    msg = stream.next() => match msg {
                        Some(Ok(actix_ws::Message::Text(text))) => coordinator.dispatch(id, &text).await,
                        Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                        Some(Err(_)) => break 'sesh,
                        None => break 'sesh,
                        _ => continue 'sesh,
                    },
                }
            }
            coordinator.disconnect(id).await;
            log::debug!("[session {}] disconnected", id);
        });
        Ok(())
    }

    /// Decodes one inbound frame and routes it. Malformed frames are
    /// logged and dropped; they never tear down the session.
    pub async fn dispatch(&self, conn: ID<Connection>, text: &str) {
        match Protocol::decode(text) {
            Ok(ClientMessage::Identify { name }) => self.identify(conn, name).await,
            Ok(ClientMessage::CreateRoom) => self.create(conn).await,
            Ok(ClientMessage::JoinRoom { room_id }) => self.join(conn, room_id).await,
            Ok(ClientMessage::Move { room_id, play }) => self.relay_move(conn, room_id, play).await,
            Ok(ClientMessage::CloseRoom { room_id }) => self.close(conn, room_id).await,
            Err(e) => log::warn!("[session {}] {}", conn, e),
        }
    }

    /// Transport closed: vacate any seat, notify the survivor, and drop
    /// the registry entry, all in one step.
    pub async fn disconnect(&self, conn: ID<Connection>) {
        self.depart(conn).await;
        self.registry.unregister(conn).await;
    }
}

impl Coordinator {
    async fn identify(&self, conn: ID<Connection>, name: String) {
        self.registry.rename(conn, name).await;
    }

    /// Opens a room under the connection's current display name and
    /// replies with the fresh room ID. A connection still seated
    /// elsewhere departs that room first.
    async fn create(&self, conn: ID<Connection>) {
        self.depart(conn).await;
        let name = self.registry.name(conn).await;
        let room = self.lobby.create(conn, name).await;
        self.registry.unicast(conn, &ServerMessage::created(room)).await;
    }

    /// Replies with the room snapshot on success and announces the new
    /// opponent to the rest of the room; on rejection only the requester
    /// hears about it. The previous seat (if any) is vacated only after
    /// admission succeeds.
    async fn join(&self, conn: ID<Connection>, room: ID<Room>) {
        let name = self.registry.name(conn).await;
        let prior = self.lobby.membership(conn).await.filter(|r| *r != room);
        match self.lobby.join(room, conn, name).await {
            Ok(snapshot) => {
                if let Some(prior) = prior {
                    self.depart_from(conn, prior).await;
                }
                self.registry.unicast(conn, &ServerMessage::joined(&snapshot)).await;
                self.relay
                    .send(&snapshot, &ServerMessage::opponent(&snapshot), Some(conn))
                    .await;
            }
            Err(error) => {
                log::debug!("[session {}] join {} rejected: {}", conn, room, error);
                self.registry.unicast(conn, &ServerMessage::rejected(error)).await;
            }
        }
    }

    /// Relays an opaque move to the other occupants. No validation and
    /// no reply; a move for a dead room is dropped.
    async fn relay_move(&self, conn: ID<Connection>, room: ID<Room>, play: serde_json::Value) {
        match self.lobby.snapshot(room).await {
            Some(ref snapshot) => {
                self.relay
                    .send(snapshot, &ServerMessage::relayed(room, play), Some(conn))
                    .await
            }
            None => log::debug!("[session {}] move for unknown room {} dropped", conn, room),
        }
    }

    /// End-of-game teardown: tell the other occupants first, then delete.
    /// Closing an already-gone room is a no-op.
    async fn close(&self, conn: ID<Connection>, room: ID<Room>) {
        if let Some(ref snapshot) = self.lobby.snapshot(room).await {
            self.relay
                .send(snapshot, &ServerMessage::closed(room), Some(conn))
                .await;
        }
        self.lobby.close(room).await;
    }

    async fn depart(&self, conn: ID<Connection>) {
        if let Some(room) = self.lobby.membership(conn).await {
            self.depart_from(conn, room).await;
        }
    }

    /// Vacates a seat and tells the survivor who left, using the
    /// identity snapshot taken when the departing player was seated.
    async fn depart_from(&self, conn: ID<Connection>, room: ID<Room>) {
        let (departed, remaining) = self.lobby.remove(room, conn).await;
        if let (Some(participant), Some(ref snapshot)) = (departed, remaining) {
            self.relay
                .send(snapshot, &ServerMessage::disconnected(participant), None)
                .await;
        }
    }
}
