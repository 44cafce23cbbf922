//! Injector: keep the link list in the index page in sync with the
//! generated documents.
//!
//! Only the region between the start and end markers is owned here:
//!
//! ```html
//! <ul>
//!   <!-- inject:html -->
//!   <li><a href="dist/a.html">a.html</a></li>
//!   <li><a href="dist/sub/b.html">sub/b.html</a></li>
//!   <!-- endinject -->
//! </ul>
//! ```
//!
//! Bytes outside the markers are preserved exactly.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use super::StageContext;
use crate::freshness::{ContentHash, hash_parts};
use crate::utils::html::{escape, escape_attr};
use crate::utils::path::{relative_path, to_slash};

#[derive(Debug, Error)]
pub enum InjectError {
    #[error("failed to read index {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write index {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("marker `{marker}` not found in {}", path.display())]
    MissingMarker { path: PathBuf, marker: String },
}

/// Result of a successful injector run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectOutcome {
    /// Index rewritten with this many links.
    Written(usize),
    /// Rendered region identical to what was on disk.
    Unchanged(usize),
    /// Index content and document list identical to the last run.
    Cached,
}

/// Run the injector once against the context's index page.
pub async fn inject(ctx: &Arc<StageContext>) -> Result<InjectOutcome, InjectError> {
    let documents = discover(ctx).await;
    let index = &ctx.entry_path;

    let content = tokio::fs::read_to_string(index)
        .await
        .map_err(|source| InjectError::Read {
            path: index.clone(),
            source,
        })?;

    let cache = &ctx.caches.inject;
    if cache.is_unchanged(index, &signature(&content, &documents)) {
        return Ok(InjectOutcome::Cached);
    }

    let index_dir = index.parent().unwrap_or(ctx.root.as_path());
    let links = render_links(&documents, index_dir, &ctx.output_dir);
    let rendered = replace_region(&content, &ctx.start_tag, &ctx.end_tag, &links).map_err(
        |marker| InjectError::MissingMarker {
            path: index.clone(),
            marker: marker.to_string(),
        },
    )?;

    let outcome = if rendered == content {
        InjectOutcome::Unchanged(links.len())
    } else {
        tokio::fs::write(index, &rendered)
            .await
            .map_err(|source| InjectError::Write {
                path: index.clone(),
                source,
            })?;
        InjectOutcome::Written(links.len())
    };

    cache.record(index, signature(&rendered, &documents));
    Ok(outcome)
}

/// Generated documents, sorted.
async fn discover(ctx: &Arc<StageContext>) -> Vec<PathBuf> {
    let walker = Arc::clone(ctx);
    tokio::task::spawn_blocking(move || walker.output_glob.walk_files(&walker.root))
        .await
        .unwrap_or_default()
}

/// Hash of the index content together with the document list.
fn signature(content: &str, documents: &[PathBuf]) -> ContentHash {
    let names: Vec<String> = documents.iter().map(|p| to_slash(p)).collect();
    hash_parts(
        std::iter::once(content.as_bytes()).chain(names.iter().map(|n| n.as_bytes())),
    )
}

/// One `<li>` per document. The href is relative to the index page, the
/// text relative to the output root.
pub fn render_links(documents: &[PathBuf], index_dir: &Path, output_dir: &Path) -> Vec<String> {
    documents
        .iter()
        .map(|doc| {
            let href = to_slash(&relative_path(doc, index_dir));
            let text = to_slash(doc.strip_prefix(output_dir).unwrap_or(doc));
            format!(
                r#"<li><a href="{}">{}</a></li>"#,
                escape_attr(&href),
                escape(&text)
            )
        })
        .collect()
}

/// Replace everything between `start` and `end` with `lines`.
///
/// Each line, and the end marker, gets the start marker's indentation.
/// Returns the missing marker on failure.
pub fn replace_region<'a>(
    content: &str,
    start: &'a str,
    end: &'a str,
    lines: &[String],
) -> Result<String, &'a str> {
    let start_at = content.find(start).ok_or(start)?;
    let region_at = start_at + start.len();
    let end_at = content[region_at..]
        .find(end)
        .map(|offset| region_at + offset)
        .ok_or(end)?;

    let indent = indentation_before(content, start_at);

    let extra: usize = lines.iter().map(|l| l.len() + indent.len() + 1).sum();
    let mut out = String::with_capacity(content.len() + extra);
    out.push_str(&content[..region_at]);
    out.push('\n');
    for line in lines {
        out.push_str(indent);
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(indent);
    out.push_str(&content[end_at..]);
    Ok(out)
}

/// Leading whitespace of the line containing `at`, or empty when other
/// text precedes `at` on that line.
fn indentation_before(content: &str, at: usize) -> &str {
    let line_start = content[..at].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &content[line_start..at];
    if prefix.chars().all(|c| c == ' ' || c == '\t') {
        prefix
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "<!-- inject:html -->";
    const END: &str = "<!-- endinject -->";

    #[test]
    fn test_render_links() {
        let docs = vec![
            PathBuf::from("/p/dist/a.html"),
            PathBuf::from("/p/dist/sub/b.html"),
        ];
        let links = render_links(&docs, Path::new("/p"), Path::new("/p/dist"));
        assert_eq!(
            links,
            vec![
                r#"<li><a href="dist/a.html">a.html</a></li>"#,
                r#"<li><a href="dist/sub/b.html">sub/b.html</a></li>"#,
            ]
        );
    }

    #[test]
    fn test_render_links_escapes() {
        let docs = vec![PathBuf::from("/p/dist/a&b.html")];
        let links = render_links(&docs, Path::new("/p"), Path::new("/p/dist"));
        assert_eq!(links[0], r#"<li><a href="dist/a&amp;b.html">a&amp;b.html</a></li>"#);
    }

    #[test]
    fn test_replace_region_indents() {
        let content = "<ul>\n  <!-- inject:html -->\n  old\n  <!-- endinject -->\n</ul>\n";
        let lines = vec!["<li>x</li>".to_string()];
        let out = replace_region(content, START, END, &lines).unwrap();
        assert_eq!(
            out,
            "<ul>\n  <!-- inject:html -->\n  <li>x</li>\n  <!-- endinject -->\n</ul>\n"
        );
    }

    #[test]
    fn test_replace_region_idempotent() {
        let content = "a\n<!-- inject:html --><!-- endinject -->\nb";
        let lines = vec!["<li>1</li>".to_string(), "<li>2</li>".to_string()];
        let once = replace_region(content, START, END, &lines).unwrap();
        let twice = replace_region(&once, START, END, &lines).unwrap();
        assert_eq!(once, twice);
        assert!(once.starts_with("a\n<!-- inject:html -->\n"));
        assert!(once.ends_with("<!-- endinject -->\nb"));
    }

    #[test]
    fn test_replace_region_empty_list() {
        let content = "<!-- inject:html -->\n<li>gone</li>\n<!-- endinject -->";
        let out = replace_region(content, START, END, &[]).unwrap();
        assert_eq!(out, "<!-- inject:html -->\n<!-- endinject -->");
    }

    #[test]
    fn test_missing_markers() {
        assert_eq!(replace_region("no markers", START, END, &[]), Err(START));
        assert_eq!(replace_region("<!-- inject:html -->", START, END, &[]), Err(END));
        assert_eq!(
            replace_region("<!-- endinject --> <!-- inject:html -->", START, END, &[]),
            Err(END)
        );
    }

    #[test]
    fn test_indentation_only_whitespace() {
        assert_eq!(indentation_before("  x", 2), "  ");
        assert_eq!(indentation_before("<ul>x", 4), "");
        assert_eq!(indentation_before("a\n\tx", 3), "\t");
    }
}
