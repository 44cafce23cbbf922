//! WebSocket Actor
//!
//! Owns the connected browser clients and pushes reload messages to them.
//!
//! ```text
//! Reloader --[Reload]--> WsActor --[broadcast]--> Clients
//!                          ^
//! acceptor --[AddClient]---+
//! ```

mod client_io;
mod delivery;

use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::messages::WsMsg;
use crate::reload::message::HotReloadMessage;

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    /// Shared between the actor loop and the reader thread
    clients: Clients,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Run until `Shutdown` arrives or every sender is dropped.
    pub async fn run(mut self) {
        let clients_for_reader = Arc::clone(&self.clients);
        std::thread::spawn(move || client_io::client_reader_loop(clients_for_reader));

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Reload { reason } => {
                    crate::debug!("ws"; "sending reload: {}", reason);
                    let hr_msg = HotReloadMessage::reload_with_reason(reason);
                    self.broadcast(Message::Text(hr_msg.to_json().into()));
                }
                WsMsg::AddClient(stream) => {
                    let clients = Arc::clone(&self.clients);
                    tokio::task::spawn_blocking(move || client_io::add_client(&clients, stream));
                }
                WsMsg::Shutdown => {
                    crate::debug!("ws"; "shutting down");
                    self.close_all();
                    break;
                }
            }
        }
    }

    fn close_all(&self) {
        let mut clients = self.clients.lock();
        for mut ws in clients.drain(..) {
            let _ = ws.close(None);
            let _ = ws.flush();
        }
    }

    #[cfg(test)]
    fn client_count(&self) -> usize {
        self.clients.lock().len()
    }
}
