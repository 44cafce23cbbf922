//! Per-process change cache.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;

use super::ContentHash;

/// Maps a path to the hash of the content last processed for it.
///
/// An entry is only written after the caller finished processing that
/// content successfully. A miss is never an error, it only means "go ahead".
#[derive(Debug, Default)]
pub struct ChangeCache {
    name: &'static str,
    hashes: DashMap<PathBuf, ContentHash>,
}

impl ChangeCache {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            hashes: DashMap::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether `path` was last recorded with exactly `hash`.
    pub fn is_unchanged(&self, path: &Path, hash: &ContentHash) -> bool {
        self.hashes.get(path).is_some_and(|seen| *seen == *hash)
    }

    /// Remember `hash` as the last processed content of `path`.
    pub fn record(&self, path: &Path, hash: ContentHash) {
        self.hashes.insert(path.to_path_buf(), hash);
    }

    pub fn invalidate(&self, path: &Path) {
        self.hashes.remove(path);
    }

    /// Forget everything, e.g. after the outputs were wiped.
    pub fn clear(&self) {
        self.hashes.clear();
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

/// The two process-scoped caches, shared by every stage invocation.
#[derive(Debug, Clone)]
pub struct Caches {
    /// Keyed by source document path.
    pub transpile: Arc<ChangeCache>,
    /// Keyed by index document path.
    pub inject: Arc<ChangeCache>,
}

impl Caches {
    pub fn new() -> Self {
        Self {
            transpile: Arc::new(ChangeCache::new("transpile")),
            inject: Arc::new(ChangeCache::new("inject")),
        }
    }
}

impl Default for Caches {
    fn default() -> Self {
        Self::new()
    }
}
