//! Coordinator - turns watch events into pipeline tasks
//!
//! ```text
//! FsActor --WatchEvent--> Coordinator --spawn--> handle_event
//!                                                  │
//!      Added/Changed: transpile_one ───┐           │
//!      Removed:       delete + forget ─┴─► inject ─┴─► Reloader
//! ```
//!
//! Every event gets its own task. Tasks for different paths may overlap and
//! nothing serializes writes to the index page. A task always ends with a
//! reload request, whether or not the injector succeeded.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;

use super::fs::FsActor;
use super::messages::{ChangeKind, WatchEvent};
use crate::logger::{status_error, status_success, status_unchanged};
use crate::pipeline::{
    DeleteTarget, InjectOutcome, StageContext, TranspileOutcome, delete_paths, inject,
    transpile::transpile_one,
};
use crate::reload::Reloader;

/// Channel buffer between FsActor and the dispatch loop
const CHANNEL_BUFFER: usize = 32;

/// Coordinator - owns the watch side of the pipeline
pub struct Coordinator {
    ctx: Arc<StageContext>,
    reloader: Reloader,
    debounce: Duration,
}

impl Coordinator {
    pub fn new(ctx: Arc<StageContext>, reloader: Reloader, debounce: Duration) -> Self {
        Self {
            ctx,
            reloader,
            debounce,
        }
    }

    /// Attach the watcher. Events from here on are buffered until `run`.
    pub fn start(self) -> Result<WatchLoop> {
        let (event_tx, event_rx) = mpsc::channel::<WatchEvent>(CHANNEL_BUFFER);
        let fs_actor = FsActor::new(
            vec![self.ctx.source_dir.clone()],
            self.debounce,
            event_tx,
            Arc::clone(&self.ctx),
        )
        .map_err(|e| anyhow::anyhow!("watcher failed: {}", e))?;

        crate::log!("watch"; "watching {}", self.ctx.display(&self.ctx.source_dir));
        Ok(WatchLoop {
            fs_actor,
            event_rx,
            ctx: self.ctx,
            reloader: self.reloader,
        })
    }

    /// Attach and run until the process is stopped.
    pub async fn run(self) -> Result<()> {
        self.start()?.run().await;
        Ok(())
    }
}

/// An attached watcher plus its dispatch loop.
pub struct WatchLoop {
    fs_actor: FsActor,
    event_rx: mpsc::Receiver<WatchEvent>,
    ctx: Arc<StageContext>,
    reloader: Reloader,
}

impl WatchLoop {
    /// Dispatch events until the watcher goes away.
    pub async fn run(self) {
        let Self {
            fs_actor,
            mut event_rx,
            ctx,
            reloader,
        } = self;

        let fs_handle = tokio::spawn(fs_actor.run());

        while let Some(event) = event_rx.recv().await {
            let ctx = Arc::clone(&ctx);
            let reloader = reloader.clone();
            tokio::spawn(async move { handle_event(&ctx, &reloader, event).await });
        }

        let _ = fs_handle.await;
        crate::debug!("watch"; "stopped");
    }
}

/// Run the full pipeline for one change.
pub async fn handle_event(ctx: &Arc<StageContext>, reloader: &Reloader, event: WatchEvent) {
    let WatchEvent { kind, path } = event;
    let name = ctx.display(&path);

    match kind {
        ChangeKind::Added | ChangeKind::Changed => {
            match transpile_one(ctx, &path).await {
                TranspileOutcome::Written(_) => {
                    status_success(&format!("{} {}", kind.label(), name));
                }
                TranspileOutcome::Unchanged(_) | TranspileOutcome::Cached => {
                    status_unchanged(&format!("unchanged {name}"));
                }
                TranspileOutcome::Failed(err) => status_error(&format!("failed {name}"), &err),
            }
        }
        ChangeKind::Removed => {
            ctx.caches.transpile.invalidate(&path);
            if let Some(output) = ctx.output_for(&path) {
                let report = delete_paths(&ctx.root, &[DeleteTarget::from(output)]).await;
                if report.failed > 0 {
                    status_error(&format!("failed to remove output of {name}"), "");
                } else {
                    status_success(&format!("removed {name}"));
                }
            }
        }
    }

    match inject(ctx).await {
        Ok(InjectOutcome::Written(count)) => {
            crate::debug!("inject"; "{} link(s) written", count);
        }
        Ok(_) => {}
        Err(err) => status_error("inject failed", &format!("{:#}", anyhow::Error::new(err))),
    }

    reloader.reload(format!("{} {}", kind.label(), name));
}
