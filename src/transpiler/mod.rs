//! Source document to HTML page.
//!
//! # Module Structure
//!
//! ```text
//! transpiler/
//! ├── include.rs     # <!-- include(path) --> expansion
//! ├── markdown.rs    # pulldown-cmark rendering + title extraction
//! ├── blueprint.rs   # API Blueprint metadata and resource headings
//! └── mod.rs         # DocKind, TranspileOptions, transpile_bytes()
//! ```
//!
//! Both kinds go through include expansion first and end up in the same
//! page shell, so a `.md` and an `.apib` with the same body render alike.

mod blueprint;
mod include;
mod markdown;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::embed::transpile::{PAGE_HTML, PageVars};
use crate::utils::html::escape;

pub use include::MAX_INCLUDE_DEPTH;

// ============================================================================
// Types
// ============================================================================

/// Source document format, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocKind {
    Markdown,
    Blueprint,
}

impl DocKind {
    /// `md`/`markdown` → Markdown, `apib` → Blueprint (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Some(Self::Markdown),
            "apib" => Some(Self::Blueprint),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Blueprint => "blueprint",
        }
    }
}

/// Options shared by every document of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranspileOptions {
    /// Root that include directives are resolved against.
    pub include_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum TranspileError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8", .0.display())]
    InvalidUtf8(PathBuf),

    #[error("unsupported document type: {}", .0.display())]
    UnsupportedKind(PathBuf),

    #[error("missing include `{target}` in {}", from.display())]
    MissingInclude { from: PathBuf, target: String },

    #[error("include cycle through {}", .0.display())]
    IncludeCycle(PathBuf),

    #[error("includes nested deeper than {MAX_INCLUDE_DEPTH} levels in {}", .0.display())]
    IncludeDepth(PathBuf),

    #[error("unsupported blueprint FORMAT `{format}` in {} (expected 1A)", path.display())]
    UnsupportedFormat { path: PathBuf, format: String },
}

// ============================================================================
// Entry points
// ============================================================================

/// Transpile already-read source bytes. `path` decides the kind and serves
/// as the origin for include errors and the fallback title.
pub fn transpile_bytes(
    path: &Path,
    bytes: &[u8],
    options: &TranspileOptions,
) -> Result<String, TranspileError> {
    let kind =
        DocKind::from_path(path).ok_or_else(|| TranspileError::UnsupportedKind(path.into()))?;
    let source =
        std::str::from_utf8(bytes).map_err(|_| TranspileError::InvalidUtf8(path.into()))?;

    let expanded = include::expand(source, path, &options.include_path)?;

    let rendered = match kind {
        DocKind::Markdown => markdown::render(&expanded),
        DocKind::Blueprint => blueprint::render(&expanded, path)?,
    };

    let title = rendered
        .title
        .unwrap_or_else(|| file_stem(path).to_string());

    Ok(PAGE_HTML.render(&PageVars {
        title: &escape(&title),
        kind: kind.name(),
        body: &rendered.body,
    }))
}

/// Rendered body plus the first level-one heading, if any.
#[derive(Debug)]
pub(crate) struct Rendered {
    pub body: String,
    pub title: Option<String>,
}

fn file_stem(path: &Path) -> std::borrow::Cow<'_, str> {
    path.file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_else(|| "untitled".into())
}

// ============================================================================
// Tests
// ============================================================================
