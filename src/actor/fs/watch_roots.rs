use std::path::PathBuf;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;

/// Keeps the recursive watches on the desired roots alive.
///
/// A root that is deleted and recreated (e.g. `rm -rf docs && git checkout
/// docs`) loses its OS watch; `maintain` re-attaches it.
pub(super) struct WatchRoots {
    desired: Vec<PathBuf>,
    attached: FxHashSet<PathBuf>,
}

impl WatchRoots {
    pub(super) fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            desired: paths,
            attached: FxHashSet::default(),
        }
    }

    /// Attach every root that exists now. A missing root is not an error;
    /// it is picked up by `maintain` once it appears.
    pub(super) fn attach_existing(&mut self, watcher: &mut RecommendedWatcher) -> notify::Result<()> {
        for path in self.desired.iter().filter(|p| p.exists()) {
            watcher.watch(path, RecursiveMode::Recursive)?;
            self.attached.insert(path.clone());
            crate::debug!("watch"; "watching {}", path.display());
        }
        Ok(())
    }

    pub(super) fn maintain(&mut self, watcher: &mut RecommendedWatcher) {
        self.attached.retain(|path| path.exists());

        for path in &self.desired {
            if self.attached.contains(path) || !path.exists() {
                continue;
            }
            match watcher.watch(path, RecursiveMode::Recursive) {
                Ok(()) => {
                    self.attached.insert(path.clone());
                    crate::log!("watch"; "re-attached {}", path.display());
                }
                Err(e) => crate::debug!("watch"; "re-attach {} failed: {}", path.display(), e),
            }
        }
    }

    pub(super) fn attached_count(&self) -> usize {
        self.attached.len()
    }
}
