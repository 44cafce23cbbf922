//! API Blueprint documents.
//!
//! A blueprint is Markdown with two additions handled here:
//!
//! - a leading metadata block (`FORMAT: 1A`, `HOST: ...`) ending at the
//!   first blank line, rendered as a definition list
//! - resource and action headings (`## Notes [/notes]`, `### List [GET]`)
//!   whose bracketed part becomes a method badge
//!
//! Everything else is left to the Markdown renderer.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::{Rendered, TranspileError, markdown};
use crate::utils::html::escape;

/// The only blueprint format version accepted.
const SUPPORTED_FORMAT: &str = "1A";

static METADATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9_-]*):[ \t]*(.*?)[ \t]*$").unwrap());

static RESOURCE_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6}[ \t]+.*?)[ \t]*\[([^\]]+)\][ \t]*$").unwrap());

pub fn render(source: &str, path: &Path) -> Result<Rendered, TranspileError> {
    let (metadata, rest) = split_metadata(source);

    if let Some((_, format)) = metadata
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("FORMAT"))
        && *format != SUPPORTED_FORMAT
    {
        return Err(TranspileError::UnsupportedFormat {
            path: path.to_path_buf(),
            format: format.to_string(),
        });
    }

    let rendered = markdown::render(&badge_headings(rest));

    let mut body = render_metadata(&metadata);
    body.push_str(&rendered.body);

    Ok(Rendered {
        body,
        title: rendered.title,
    })
}

/// Split off the leading `Key: Value` lines.
fn split_metadata(source: &str) -> (Vec<(&str, &str)>, &str) {
    let mut metadata = Vec::new();
    let mut offset = 0;

    for line in source.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if trimmed.trim().is_empty() {
            if !metadata.is_empty() {
                offset += line.len();
            }
            break;
        }
        let Some(caps) = METADATA_RE.captures(trimmed) else {
            break;
        };
        let (Some(key), Some(value)) = (caps.get(1), caps.get(2)) else {
            break;
        };
        metadata.push((key.as_str(), value.as_str()));
        offset += line.len();
    }

    (metadata, &source[offset..])
}

fn render_metadata(metadata: &[(&str, &str)]) -> String {
    if metadata.is_empty() {
        return String::new();
    }
    let mut out = String::from("<dl class=\"metadata\">\n");
    for (key, value) in metadata {
        out.push_str(&format!(
            "<dt>{}</dt><dd>{}</dd>\n",
            escape(key),
            escape(value)
        ));
    }
    out.push_str("</dl>\n");
    out
}

/// Rewrite `## Name [X]` into `## Name <code class="method">X</code>`,
/// leaving fenced code blocks alone.
fn badge_headings(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + 64);
    let mut fence: Option<&str> = None;

    for line in source.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        let ending = &line[content.len()..];
        let marker = content.trim_start();

        match fence {
            Some(open) => {
                if marker.starts_with(open) {
                    fence = None;
                }
                out.push_str(line);
                continue;
            }
            None if marker.starts_with("```") || marker.starts_with("~~~") => {
                fence = Some(&marker[..3]);
                out.push_str(line);
                continue;
            }
            None => {}
        }

        match RESOURCE_HEADING_RE.captures(content) {
            Some(caps) => {
                let heading = caps.get(1).map_or("", |m| m.as_str());
                let badge = caps.get(2).map_or("", |m| m.as_str().trim());
                out.push_str(&format!(
                    "{heading} <code class=\"method\">{}</code>{ending}",
                    escape(badge)
                ));
            }
            None => out.push_str(line),
        }
    }
    out
}
