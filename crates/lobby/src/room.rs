use super::*;
use gambit_core::CAPACITY;
use gambit_core::ID;
use gambit_core::Unique;
use serde::Deserialize;
use serde::Serialize;

/// Marker type for connection identities.
/// The live connection itself is owned by the transport layer; rooms only
/// ever hold identity snapshots of it.
pub struct Connection;

/// A connection's identity snapshot at the moment it was seated.
/// Not a live reference: the session coordinator reconciles staleness on
/// disconnect rather than leaving seats dangling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ID<Connection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Participant {
    pub fn new(id: ID<Connection>, name: Option<String>) -> Self {
        Self { id, name }
    }
}

/// Immutable view of a room handed to replies and broadcasts.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room_id: ID<Room>,
    pub participants: Vec<Participant>,
}

/// An ephemeral pairing context holding up to [`CAPACITY`] participants.
/// Mutated only through the owning [`Lobby`](crate::Lobby); the `closed`
/// tombstone makes deletion visible to operations that already hold a
/// reference to the room.
#[derive(Debug)]
pub struct Room {
    id: ID<Self>,
    seats: Vec<Participant>,
    closed: bool,
}

impl Room {
    /// Opens a room seating its creator.
    pub fn new(id: ID<Self>, creator: Participant) -> Self {
        Self {
            id,
            seats: vec![creator],
            closed: false,
        }
    }
    /// Seated participants in join order.
    pub fn seats(&self) -> &[Participant] {
        &self.seats
    }
    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }
    pub fn is_closed(&self) -> bool {
        self.closed
    }
    /// Marks the room dead so racing operations observe RoomNotFound.
    pub fn close(&mut self) {
        self.closed = true;
    }
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.id,
            participants: self.seats.clone(),
        }
    }
    /// Admission gate, first failure wins: closed/absent, then abandoned,
    /// then full. Re-admitting a seated participant is an idempotent
    /// success. Callers must hold the room's serialization lock.
    pub fn admit(&mut self, participant: Participant) -> Result<RoomSnapshot, JoinError> {
        if self.closed {
            return Err(JoinError::RoomNotFound);
        }
        if self.seats.is_empty() {
            return Err(JoinError::RoomEmpty);
        }
        if self.seats.iter().any(|p| p.id == participant.id) {
            return Ok(self.snapshot());
        }
        if self.seats.len() >= CAPACITY {
            return Err(JoinError::RoomFull);
        }
        self.seats.push(participant);
        Ok(self.snapshot())
    }
    /// Removes a participant if present, returning their seated identity.
    /// Evicting an absent participant is a no-op.
    pub fn evict(&mut self, connection: ID<Connection>) -> Option<Participant> {
        self.seats
            .iter()
            .position(|p| p.id == connection)
            .map(|i| self.seats.remove(i))
    }
}

impl Unique for Room {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(name: &str) -> Participant {
        Participant::new(ID::default(), Some(name.to_string()))
    }

    #[test]
    fn creator_is_seated() {
        let room = Room::new(ID::default(), participant("a"));
        assert_eq!(room.seats().len(), 1);
        assert!(!room.is_empty());
    }

    #[test]
    fn admit_fills_second_seat() {
        let mut room = Room::new(ID::default(), participant("a"));
        let snap = room.admit(participant("b")).unwrap();
        assert_eq!(snap.participants.len(), 2);
        assert_eq!(snap.participants[0].name.as_deref(), Some("a"));
        assert_eq!(snap.participants[1].name.as_deref(), Some("b"));
    }

    #[test]
    fn admit_rejects_full_room() {
        let mut room = Room::new(ID::default(), participant("a"));
        room.admit(participant("b")).unwrap();
        assert_eq!(room.admit(participant("c")), Err(JoinError::RoomFull));
        assert_eq!(room.seats().len(), 2);
    }

    #[test]
    fn admit_rejects_abandoned_room() {
        let creator = participant("a");
        let mut room = Room::new(ID::default(), creator.clone());
        room.evict(creator.id);
        assert_eq!(room.admit(participant("b")), Err(JoinError::RoomEmpty));
    }

    #[test]
    fn admit_rejects_closed_room() {
        let mut room = Room::new(ID::default(), participant("a"));
        room.close();
        assert_eq!(room.admit(participant("b")), Err(JoinError::RoomNotFound));
    }

    #[test]
    fn readmission_is_idempotent() {
        let mut room = Room::new(ID::default(), participant("a"));
        let snap = room.admit(participant("b")).unwrap();
        let again = room.admit(snap.participants[1].clone()).unwrap();
        assert_eq!(snap, again);
        assert_eq!(room.seats().len(), 2);
    }

    #[test]
    fn evict_absent_is_noop() {
        let mut room = Room::new(ID::default(), participant("a"));
        assert!(room.evict(ID::default()).is_none());
        assert_eq!(room.seats().len(), 1);
    }

    #[test]
    fn occupancy_never_exceeds_capacity() {
        let mut room = Room::new(ID::default(), participant("a"));
        for i in 0..8 {
            let _ = room.admit(participant(&format!("p{}", i)));
            assert!(room.seats().len() <= CAPACITY);
        }
    }
}
