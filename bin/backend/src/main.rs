//! Relay Server Binary
//!
//! Runs the WebSocket pairing and relay server.
//! Listens on PORT (default 8080); all session state is in-memory.

#[tokio::main]
async fn main() {
    gambit_core::log();
    gambit_core::kys();
    gambit_server::run().await.unwrap();
}
