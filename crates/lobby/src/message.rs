use super::*;
use gambit_core::ID;
use serde::Deserialize;
use serde::Serialize;

/// Frames sent from client to server.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Attach a display name to this connection.
    Identify { name: String },
    /// Open a fresh room with this connection as creator.
    CreateRoom,
    /// Request a seat in an existing room.
    JoinRoom { room_id: ID<Room> },
    /// Opaque move payload to relay to the opponent. Legality is the
    /// rule engine's business, checked client-side before this is sent.
    Move {
        room_id: ID<Room>,
        #[serde(rename = "move")]
        play: serde_json::Value,
    },
    /// Acknowledge a finished game and tear the room down.
    CloseRoom { room_id: ID<Room> },
}

/// Frames sent from server to client.
/// Requests that carry a reply (`createRoom`, `joinRoom`) get exactly one;
/// everything else is a broadcast to the other room occupants.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Hello frame: the connection's identity, sent once on accept.
    Connected { id: ID<Connection> },
    /// Reply to createRoom.
    RoomCreated { room_id: ID<Room> },
    /// Reply to a successful joinRoom.
    RoomJoined {
        room_id: ID<Room>,
        participants: Vec<Participant>,
    },
    /// Reply to a failed joinRoom.
    Error { error: bool, reason: String },
    /// A second participant took their seat.
    OpponentJoined {
        room_id: ID<Room>,
        participants: Vec<Participant>,
    },
    /// Opponent's move, relayed verbatim.
    Move {
        room_id: ID<Room>,
        #[serde(rename = "move")]
        play: serde_json::Value,
    },
    /// The other participant's connection dropped.
    PlayerDisconnected { participant: Participant },
    /// The room was torn down by the other participant.
    CloseRoom { room_id: ID<Room> },
}

impl ServerMessage {
    pub fn connected(id: ID<Connection>) -> Self {
        Self::Connected { id }
    }
    pub fn created(room_id: ID<Room>) -> Self {
        Self::RoomCreated { room_id }
    }
    pub fn joined(snapshot: &RoomSnapshot) -> Self {
        Self::RoomJoined {
            room_id: snapshot.room_id,
            participants: snapshot.participants.clone(),
        }
    }
    pub fn rejected(error: JoinError) -> Self {
        Self::Error {
            error: true,
            reason: error.to_string(),
        }
    }
    pub fn opponent(snapshot: &RoomSnapshot) -> Self {
        Self::OpponentJoined {
            room_id: snapshot.room_id,
            participants: snapshot.participants.clone(),
        }
    }
    pub fn relayed(room_id: ID<Room>, play: serde_json::Value) -> Self {
        Self::Move { room_id, play }
    }
    pub fn disconnected(participant: Participant) -> Self {
        Self::PlayerDisconnected { participant }
    }
    pub fn closed(room_id: ID<Room>) -> Self {
        Self::CloseRoom { room_id }
    }
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize server message")
    }
}
