//! `[inject]` section configuration.
//!
//! ```toml
//! [inject]
//! start_tag = "<!-- inject:html -->"
//! end_tag = "<!-- endinject -->"
//! ```

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;

/// Markers delimiting the region of the index document this tool owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectConfig {
    pub start_tag: String,
    pub end_tag: String,
}

impl Default for InjectConfig {
    fn default() -> Self {
        Self {
            start_tag: "<!-- inject:html -->".into(),
            end_tag: "<!-- endinject -->".into(),
        }
    }
}

impl InjectConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.start_tag.trim().is_empty() || self.end_tag.trim().is_empty() {
            diag.error("inject", "start_tag and end_tag must not be empty");
        } else if self.start_tag == self.end_tag {
            diag.error("inject.end_tag", "end_tag must differ from start_tag");
        }
    }
}
