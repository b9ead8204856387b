use super::*;

/// Errors that can occur while decoding inbound frames.
#[derive(Debug)]
pub enum ProtocolError {
    Malformed(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(s) => write!(f, "malformed frame: {}", s),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Boundary between raw WebSocket text and typed messages.
/// Undecodable frames are dropped by the caller; they never terminate
/// the session or reach the room store.
pub struct Protocol;

impl Protocol {
    /// Parses a client frame into a ClientMessage.
    pub fn decode(text: &str) -> Result<ClientMessage, ProtocolError> {
        serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
}
