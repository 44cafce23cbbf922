//! FileSystem Actor
//!
//! Watches the source directory and sends debounced, classified events to
//! the Coordinator.
//!
//! Architecture:
//! ```text
//! notify → std thread → Debouncer (pure timing) → Classifier (source glob) → WatchEvent
//! ```
//!
//! The watcher is attached in `new`, so events raised while the caller is
//! still running the initial transpile are buffered, not lost.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use super::messages::WatchEvent;
use crate::pipeline::StageContext;

// Source-glob filtering and existence checks.
mod classifier;
// Pure timing and per-path folding.
mod debouncer;
// Shared fs event types.
mod types;
// Watch root attach/re-attach lifecycle.
mod watch_roots;

#[cfg(test)]
mod tests;

pub use types::ChangeKind;

use classifier::EventClassifier;
use debouncer::Debouncer;
use watch_roots::WatchRoots;

/// Upper bound between watch-root checks while idle.
const MAINTAIN_INTERVAL: Duration = Duration::from_secs(1);

/// FileSystem Actor - watches for source document changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    watch_roots: WatchRoots,
    /// Classified events for the Coordinator
    event_tx: mpsc::Sender<WatchEvent>,
    debouncer: Debouncer,
    ctx: Arc<StageContext>,
}

impl FsActor {
    /// Create the actor and start watching immediately.
    pub fn new(
        paths: Vec<PathBuf>,
        debounce: Duration,
        event_tx: mpsc::Sender<WatchEvent>,
        ctx: Arc<StageContext>,
    ) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let mut watch_roots = WatchRoots::new(paths);
        watch_roots.attach_existing(&mut watcher)?;
        if watch_roots.attached_count() == 0 {
            crate::log!("watch"; "source directory missing, waiting for it to appear");
        }

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            event_tx,
            debouncer: Debouncer::new(debounce),
            ctx,
        })
    }

    /// Run the actor event loop. Returns when the Coordinator goes away.
    pub async fn run(self) {
        let Self {
            notify_rx,
            mut watcher,
            mut watch_roots,
            event_tx,
            mut debouncer,
            ctx,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // notify only offers a sync callback; bridge it on a plain thread
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            let sleep = debouncer.sleep_duration().min(MAINTAIN_INTERVAL);
            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                _ = tokio::time::sleep(sleep) => {
                    watch_roots.maintain(&mut watcher);
                    if process_changes(&mut debouncer, &event_tx, &ctx).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

/// Forward debounced changes.
///
/// Returns `Err(())` if the Coordinator shut down.
async fn process_changes(
    debouncer: &mut Debouncer,
    event_tx: &mpsc::Sender<WatchEvent>,
    ctx: &StageContext,
) -> Result<(), ()> {
    let Some(raw_events) = debouncer.take_if_ready() else {
        return Ok(());
    };

    let Some(events) = EventClassifier::classify(raw_events, ctx) else {
        return Ok(());
    };

    for (path, kind) in events.0 {
        crate::debug!("watch"; "{}: {}", kind.label(), ctx.display(&path));
        event_tx
            .send(WatchEvent::new(kind, path))
            .await
            .map_err(|_| ())?;
    }

    Ok(())
}
