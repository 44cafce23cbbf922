//! `[paths]` section configuration.
//!
//! ```toml
//! [paths]
//! source = "docs"         # documentation sources (*.md, *.apib)
//! output = "dist"         # generated HTML, mirrors `source`
//! entry = "index.html"    # index document that receives the link list
//! ```
//!
//! All three are relative to the project root.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;

/// Project layout, relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub source: PathBuf,
    pub output: PathBuf,
    pub entry: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: "docs".into(),
            output: "dist".into(),
            entry: "index.html".into(),
        }
    }
}

impl PathsConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (field, path) in [
            ("paths.source", &self.source),
            ("paths.output", &self.output),
            ("paths.entry", &self.entry),
        ] {
            if !is_plain_relative(path) {
                diag.error_with_hint(
                    field,
                    format!("`{}` must be a relative path inside the project", path.display()),
                    "remove leading `/` and any `..` segments",
                );
            }
        }

        if self.source == self.output {
            diag.error("paths.output", "output directory must differ from source directory");
        }

        if self.output.as_os_str().is_empty() {
            diag.error("paths.output", "output directory must not be the project root");
        }
    }
}

/// Relative, non-escaping path (no root, no `..`).
fn is_plain_relative(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
