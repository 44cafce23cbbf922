//! Document pipeline stages.
//!
//! # Module Structure
//!
//! ```text
//! pipeline/
//! ├── transpile.rs   # source documents → generated documents
//! ├── inject.rs      # generated documents → links in the index page
//! ├── delete.rs      # literal paths and globs → removed from disk
//! └── mod.rs         # StageContext (this file)
//! ```
//!
//! Every stage always completes. Per-document failures are logged and
//! counted in the stage's report, never propagated.

pub mod delete;
pub mod inject;
pub mod transpile;


use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use delete::{DeleteReport, DeleteTarget, delete_paths};
pub use inject::{InjectError, InjectOutcome, inject};
pub use transpile::{TranspileOutcome, TranspileReport, transpile_all};

use crate::config::ProjectConfig;
use crate::freshness::Caches;
use crate::transpiler::TranspileOptions;
use crate::utils::glob::{Glob, GlobError};
use crate::utils::path::{mirror_path, to_slash};

/// Resolved layout and shared state handed to every stage.
///
/// Cheap to clone: spawned tasks each hold an `Arc` of it.
#[derive(Debug, Clone)]
pub struct StageContext {
    pub root: PathBuf,
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub entry_path: PathBuf,
    pub source_glob: Glob,
    pub output_glob: Glob,
    pub clean_glob: Glob,
    pub options: TranspileOptions,
    pub start_tag: String,
    pub end_tag: String,
    pub caches: Caches,
}

impl StageContext {
    pub fn from_config(config: &ProjectConfig, caches: Caches) -> Result<Arc<Self>, GlobError> {
        Ok(Arc::new(Self {
            root: config.get_root().to_path_buf(),
            source_dir: config.source_dir(),
            output_dir: config.output_dir(),
            entry_path: config.entry_path(),
            source_glob: config.source_glob()?,
            output_glob: config.output_glob()?,
            clean_glob: config.clean_glob()?,
            options: config.transpile_options(),
            start_tag: config.inject.start_tag.clone(),
            end_tag: config.inject.end_tag.clone(),
            caches,
        }))
    }

    /// Generated document path for a source document.
    pub fn output_for(&self, source: &Path) -> Option<PathBuf> {
        mirror_path(source, &self.source_dir, &self.output_dir, "html")
    }

    /// Whether `path` (absolute) is a source document.
    pub fn is_source(&self, path: &Path) -> bool {
        self.source_glob.matches_under(&self.root, path)
    }

    /// Root-relative display form used in log lines.
    pub fn display(&self, path: &Path) -> String {
        to_slash(path.strip_prefix(&self.root).unwrap_or(path))
    }
}
