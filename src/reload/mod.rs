//! Reload Module
//!
//! WebSocket-based live reload.
//!
//! ```text
//! watch task ──Reloader::reload──► WsActor ──{"type":"reload"}──► Browser
//!                                    ▲
//!               acceptor thread ─────┘ (AddClient)
//! ```
//!
//! # Modules
//!
//! - `message` - Hot reload message types
//! - `server` - WebSocket acceptor with port retry

pub mod message;
pub mod server;

use tokio::sync::mpsc;

use crate::actor::messages::WsMsg;

/// Buffered reload requests before the WsActor drains them.
const RELOAD_QUEUE: usize = 64;

/// Fire-and-forget handle for requesting a browser reload.
///
/// Cloned into every watch task. Reloads requested before the server starts
/// are buffered; a full buffer drops the request, which is harmless since
/// one pending reload covers any number of changes.
#[derive(Debug, Clone)]
pub struct Reloader {
    tx: Option<mpsc::Sender<WsMsg>>,
}

impl Reloader {
    /// Handle plus the receiving end for the WsActor.
    pub fn channel() -> (Self, mpsc::Receiver<WsMsg>) {
        let (tx, rx) = mpsc::channel(RELOAD_QUEUE);
        (Self { tx: Some(tx) }, rx)
    }

    /// Handle that only logs (watch without serve).
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Ask connected browsers to reload. Never blocks, never fails.
    pub fn reload(&self, reason: impl Into<String>) {
        let reason = reason.into();
        let Some(tx) = &self.tx else {
            crate::debug!("reload"; "no server, skipping reload: {}", reason);
            return;
        };
        if let Err(e) = tx.try_send(WsMsg::Reload { reason }) {
            crate::debug!("reload"; "reload dropped: {}", e);
        }
    }

    /// Sender for the WebSocket acceptor, if live reload is enabled.
    pub fn sender(&self) -> Option<mpsc::Sender<WsMsg>> {
        self.tx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reload_is_delivered() {
        let (reloader, mut rx) = Reloader::channel();
        reloader.reload("changed docs/a.md");

        match rx.recv().await {
            Some(WsMsg::Reload { reason }) => assert_eq!(reason, "changed docs/a.md"),
            _ => panic!("expected reload"),
        }
    }

    #[tokio::test]
    async fn test_full_queue_drops_silently() {
        let (reloader, rx) = Reloader::channel();
        for i in 0..RELOAD_QUEUE + 5 {
            reloader.reload(format!("change {i}"));
        }
        drop(rx);
        reloader.reload("after close");
    }

    #[test]
    fn test_disabled_reloader() {
        let reloader = Reloader::disabled();
        assert!(reloader.sender().is_none());
        reloader.reload("nobody listening");
    }
}
