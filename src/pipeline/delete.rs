//! Deletion stage.
//!
//! Targets are literal paths or glob patterns relative to the project root.
//! Directories are removed with everything in them. A target that does not
//! exist counts as removed.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::utils::glob::Glob;
use crate::{debug, log};

/// One entry of a deletion request.
#[derive(Debug, Clone)]
pub enum DeleteTarget {
    /// Exact path, absolute or relative to the root.
    Path(PathBuf),
    /// Every entry matching the pattern under the root.
    Pattern(Glob),
}

impl From<Glob> for DeleteTarget {
    fn from(glob: Glob) -> Self {
        Self::Pattern(glob)
    }
}

impl From<PathBuf> for DeleteTarget {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub removed: usize,
    pub failed: usize,
}

/// Delete every path the targets resolve to.
pub async fn delete_paths(root: &Path, targets: &[DeleteTarget]) -> DeleteReport {
    let mut report = DeleteReport::default();
    // Directories already removed, whose descendants need no second pass
    let mut removed_dirs: Vec<PathBuf> = Vec::new();

    for target in targets {
        let paths = match target {
            DeleteTarget::Path(path) => vec![root.join(path)],
            DeleteTarget::Pattern(glob) => {
                let root = root.to_path_buf();
                let glob = glob.clone();
                tokio::task::spawn_blocking(move || glob.walk(&root))
                    .await
                    .unwrap_or_default()
            }
        };

        for path in paths {
            if removed_dirs.iter().any(|dir| path.starts_with(dir)) {
                continue;
            }
            match remove(&path).await {
                Ok(was_dir) => {
                    debug!("delete"; "{}", path.display());
                    report.removed += 1;
                    if was_dir {
                        removed_dirs.push(path);
                    }
                }
                Err(err) => {
                    log!("delete"; "failed to remove {}: {}", path.display(), err);
                    report.failed += 1;
                }
            }
        }
    }

    report
}

/// Remove a file or a whole directory. Already-missing paths succeed.
///
/// Returns whether `path` was a directory.
async fn remove(path: &Path) -> std::io::Result<bool> {
    let metadata = match tokio::fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };

    let is_dir = metadata.is_dir();
    let result = if is_dir {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };

    match result {
        Ok(()) => Ok(is_dir),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(is_dir),
        Err(err) => Err(err),
    }
}
