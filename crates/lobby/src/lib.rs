//! Room lifecycle and wire protocol for two-player sessions.
//!
//! This crate is the domain layer of the relay server: it owns every room
//! mutation and defines the JSON frames exchanged with clients. Nothing
//! here touches a socket; the transport layer drives it through the
//! [`Lobby`] interface and ships [`ServerMessage`] frames back out.
//!
//! ## Architecture
//!
//! - [`Lobby`] — Room store, the single owner of all room state
//! - [`Room`] — Pairing context with at-most-two seated participants
//! - [`Participant`] — Identity snapshot taken at join time
//!
//! ## Protocol
//!
//! - [`ClientMessage`] / [`ServerMessage`] — Tagged wire frames
//! - [`Protocol`] — Frame decoding at the transport boundary
//! - [`JoinError`] — Admission failures surfaced to the requester
mod message;
mod protocol;
mod room;
mod store;

pub use message::*;
pub use protocol::*;
pub use room::*;
pub use store::*;
