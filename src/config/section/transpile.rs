//! `[transpile]` section configuration.
//!
//! ```toml
//! [transpile]
//! extensions = ["md", "apib"]   # which files under `paths.source` are documents
//! include_path = "docs/shared"  # root for <!-- include(...) --> (default: paths.source)
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;
use crate::transpiler::DocKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranspileConfig {
    /// Source document extensions (without the dot).
    pub extensions: Vec<String>,
    /// Directory include directives resolve against, relative to the root.
    pub include_path: Option<PathBuf>,
}

impl Default for TranspileConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["md".into(), "apib".into()],
            include_path: None,
        }
    }
}

impl TranspileConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.extensions.is_empty() {
            diag.error("transpile.extensions", "at least one extension is required");
        }
        for ext in &self.extensions {
            if DocKind::from_extension(ext).is_none() {
                diag.error_with_hint(
                    "transpile.extensions",
                    format!("no transpiler for `.{ext}`"),
                    "supported: md, markdown, apib",
                );
            }
        }
    }
}
