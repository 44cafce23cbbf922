//! Development server with live reload support.
//!
//! ```text
//! browser ──HTTP──► request loop (rayon pool) ──► project root on disk
//!    ▲                                         └─► hotreload.js (memory)
//!    └───WebSocket─── WsActor ◄── Reloader (watch tasks)
//! ```

mod content;
mod lifecycle;
mod path;
mod response;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel::{self, Receiver};
use tiny_http::{Request, Server};
use tokio::sync::mpsc;

use crate::actor::messages::WsMsg;
use crate::actor::ws::WsActor;
use crate::config::ProjectConfig;
use crate::embed::serve::HOTRELOAD_PATH;
use crate::reload::Reloader;
use crate::reload::server::start_ws_server_with_channel;
use crate::{debug, log};

/// Worker threads answering HTTP requests
const REQUEST_THREADS: usize = 4;

/// How long the WsActor gets to close its clients on shutdown
const WS_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
    root: PathBuf,
    ws_port: Option<u16>,
}

/// Bind the HTTP server and register it with the Ctrl+C handler.
///
/// `ws_port` is the live reload port; `None` serves files untouched.
pub fn bind_server(
    config: &ProjectConfig,
    ws_port: Option<u16>,
    shutdown_tx: channel::Sender<()>,
) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    crate::core::register_server(Arc::clone(&server), shutdown_tx);

    Ok(BoundServer {
        server,
        addr,
        root: config.get_root().to_path_buf(),
        ws_port,
    })
}

impl BoundServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve until the server is unblocked (blocking).
    pub fn run(self) -> Result<()> {
        run_request_loop(&self.server, &self.root, self.ws_port)
    }
}

/// Run the Serve Stage until Ctrl+C.
///
/// Starts the WebSocket side first so the port baked into hotreload.js is
/// known before the first page is served.
pub async fn serve(
    config: &ProjectConfig,
    reloader: Reloader,
    ws_rx: mpsc::Receiver<WsMsg>,
) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();

    let ws_handle = tokio::spawn(WsActor::new(ws_rx).run());
    let ws_port = match reloader.sender() {
        Some(ws_tx) => {
            let port = start_ws_server_with_channel(
                config.serve.interface,
                config.serve.reload_port,
                ws_tx.clone(),
            )?;
            debug!("hotreload"; "ws://{}:{}", config.serve.interface, port);
            forward_shutdown(shutdown_rx, ws_tx);
            Some(port)
        }
        None => None,
    };

    let bound = bind_server(config, ws_port, shutdown_tx)?;
    log!("serve"; "http://{}", bound.addr());

    tokio::task::spawn_blocking(move || bound.run())
        .await
        .context("request loop panicked")??;

    let _ = tokio::time::timeout(WS_SHUTDOWN_GRACE, ws_handle).await;
    Ok(())
}

/// Turn the Ctrl+C signal into a WsActor shutdown.
fn forward_shutdown(shutdown_rx: Receiver<()>, ws_tx: mpsc::Sender<WsMsg>) {
    std::thread::spawn(move || {
        if shutdown_rx.recv().is_ok() {
            debug!("serve"; "shutdown signal received");
            let _ = ws_tx.blocking_send(WsMsg::Shutdown);
        }
    });
}

fn run_request_loop(server: &Server, root: &Path, ws_port: Option<u16>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .thread_name(|i| format!("docwatch-http-{i}"))
        .build()
        .context("failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let root = root.to_path_buf();
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &root, ws_port) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, root: &Path, ws_port: Option<u16>) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    debug!("serve"; "{} {}", request.method(), request.url());

    if let Some(port) = ws_port
        && path::url_path(request.url()) == HOTRELOAD_PATH
    {
        return response::respond_hotreload_js(request, port);
    }

    if let Some(file) = path::resolve_path(request.url(), root) {
        return response::respond_file(request, &file, ws_port.is_some());
    }

    response::respond_not_found(request)
}
