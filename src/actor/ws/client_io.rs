use std::io::ErrorKind;
use std::net::TcpStream;
use std::time::Duration;

use tungstenite::protocol::Message;

use super::Clients;
use crate::reload::message::HotReloadMessage;

/// Poll interval of the reader thread
const READ_POLL: Duration = Duration::from_millis(100);

/// A peer that has not finished the upgrade request by then is dropped
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Finish the handshake and register the client. Blocks; run off the runtime.
pub(super) fn add_client(clients: &Clients, stream: TcpStream) {
    // Blocking during handshake, non-blocking afterwards for polling reads
    if let Err(e) = stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT)) {
        crate::log!("ws"; "failed to configure client socket: {}", e);
        return;
    }
    let mut ws = match tungstenite::accept(stream) {
        Ok(ws) => ws,
        Err(e) => {
            crate::log!("ws"; "handshake failed: {}", e);
            return;
        }
    };
    let _ = ws.get_ref().set_nonblocking(true);

    let connected = HotReloadMessage::connected();
    if let Err(e) = ws.send(Message::Text(connected.to_json().into())) {
        crate::log!("ws"; "failed to send connected message: {}", e);
        return;
    }

    let mut clients = clients.lock();
    clients.push(ws);
    crate::debug!("ws"; "client connected (total: {})", clients.len());
}

/// Drain incoming frames so close handshakes and pings are answered, and drop
/// clients whose connection went away.
pub(super) fn client_reader_loop(clients: Clients) {
    while !crate::core::is_shutdown() {
        std::thread::sleep(READ_POLL);

        let mut clients = clients.lock();
        let before = clients.len();
        clients.retain_mut(|ws| loop {
            match ws.read() {
                Ok(Message::Close(_)) => break false,
                // Browsers never send anything we act on
                Ok(_) => continue,
                Err(tungstenite::Error::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => {
                    break true;
                }
                Err(_) => break false,
            }
        });

        let dropped = before - clients.len();
        if dropped > 0 {
            crate::debug!("ws"; "{} client(s) disconnected (total: {})", dropped, clients.len());
        }
    }
}
