use super::*;
use gambit_core::ID;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::RwLock;

/// Join admission failures, surfaced to the requesting client only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinError {
    RoomNotFound,
    RoomEmpty,
    RoomFull,
}

impl std::fmt::Display for JoinError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RoomNotFound => write!(f, "room does not exist"),
            Self::RoomEmpty => write!(f, "room is empty"),
            Self::RoomFull => write!(f, "room is full"),
        }
    }
}

impl std::error::Error for JoinError {}

/// Single source of truth for live rooms.
///
/// Each room sits behind its own mutex, so admission-check-and-append is
/// one critical section per room and unrelated rooms never block each
/// other. The outer map lock is only ever held to look up, insert, or
/// remove entries, never across a room mutation. The reverse index keeps
/// disconnect cleanup O(1) and is updated in the same call as every seat
/// mutation.
pub struct Lobby {
    rooms: RwLock<HashMap<ID<Room>, Arc<Mutex<Room>>>>,
    index: RwLock<HashMap<ID<Connection>, ID<Room>>>,
}

impl Default for Lobby {
    fn default() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            index: RwLock::new(HashMap::new()),
        }
    }
}

impl Lobby {
    /// Opens a room seating the creator. Always succeeds.
    pub async fn create(&self, connection: ID<Connection>, name: Option<String>) -> ID<Room> {
        let id = ID::default();
        let room = Room::new(id, Participant::new(connection, name));
        self.rooms
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(room)));
        self.index.write().await.insert(connection, id);
        log::info!("[lobby] opened room {}", id);
        id
    }

    /// Admits a connection into a room. Checks run in order (absent,
    /// abandoned, full) under the room's own lock, so two joins racing
    /// for the last seat serialize and exactly one wins.
    pub async fn join(
        &self,
        id: ID<Room>,
        connection: ID<Connection>,
        name: Option<String>,
    ) -> Result<RoomSnapshot, JoinError> {
        let room = self.lookup(id).await.ok_or(JoinError::RoomNotFound)?;
        let snapshot = room
            .lock()
            .await
            .admit(Participant::new(connection, name))?;
        self.index.write().await.insert(connection, id);
        log::info!("[lobby] {} joined room {}", connection, id);
        Ok(snapshot)
    }

    /// Removes a participant, deleting the room if it empties.
    /// Returns the departed identity and the surviving snapshot, if any:
    /// absent participant is a no-op yielding `(None, Some(unchanged))`,
    /// an unknown room yields `(None, None)`.
    pub async fn remove(
        &self,
        id: ID<Room>,
        connection: ID<Connection>,
    ) -> (Option<Participant>, Option<RoomSnapshot>) {
        let Some(room) = self.lookup(id).await else {
            return (None, None);
        };
        let mut guard = room.lock().await;
        let departed = guard.evict(connection);
        if departed.is_some() {
            self.unindex(connection, id).await;
        }
        if guard.is_empty() {
            guard.close();
            drop(guard);
            self.rooms.write().await.remove(&id);
            log::info!("[lobby] room {} emptied, deleted", id);
            (departed, None)
        } else {
            (departed, Some(guard.snapshot()))
        }
    }

    /// Unconditional, idempotent room deletion for explicit teardown.
    pub async fn close(&self, id: ID<Room>) {
        let Some(room) = self.rooms.write().await.remove(&id) else {
            log::debug!("[lobby] close of unknown room {} ignored", id);
            return;
        };
        let mut guard = room.lock().await;
        guard.close();
        for participant in guard.seats() {
            self.unindex(participant.id, id).await;
        }
        log::info!("[lobby] closed room {}", id);
    }

    /// The room a connection is currently seated in, if any.
    pub async fn membership(&self, connection: ID<Connection>) -> Option<ID<Room>> {
        self.index.read().await.get(&connection).copied()
    }

    /// Current participant list for relaying, if the room is live.
    pub async fn snapshot(&self, id: ID<Room>) -> Option<RoomSnapshot> {
        match self.lookup(id).await {
            Some(room) => {
                let guard = room.lock().await;
                (!guard.is_closed()).then(|| guard.snapshot())
            }
            None => None,
        }
    }

    async fn lookup(&self, id: ID<Room>) -> Option<Arc<Mutex<Room>>> {
        self.rooms.read().await.get(&id).cloned()
    }

    /// Clears the reverse index entry only while it still points at this
    /// room, so a departure racing a fresh join elsewhere cannot drop the
    /// newer mapping.
    async fn unindex(&self, connection: ID<Connection>, id: ID<Room>) {
        let mut index = self.index.write().await;
        if index.get(&connection) == Some(&id) {
            index.remove(&connection);
        }
    }
}
