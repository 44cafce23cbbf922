//! Actor Message Definitions
//!
//! ```text
//! FsActor --WatchEvent--> Coordinator --(pipeline task)--> Reloader --WsMsg--> WsActor
//! ```

use std::path::PathBuf;

pub use super::fs::ChangeKind;

// =============================================================================
// Watch events
// =============================================================================

/// One debounced change to a source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub kind: ChangeKind,
    pub path: PathBuf,
}

impl WatchEvent {
    pub fn new(kind: ChangeKind, path: PathBuf) -> Self {
        Self { kind, path }
    }
}

// =============================================================================
// WsActor Messages
// =============================================================================

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Reload every connected page
    Reload { reason: String },
    /// Raw connection from the acceptor thread, handshake pending
    AddClient(std::net::TcpStream),
    /// Close all clients and stop
    Shutdown,
}
