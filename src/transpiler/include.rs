//! `<!-- include(relative/path) -->` expansion.
//!
//! Targets resolve against the include root, not the including file, so a
//! fragment reads the same wherever it is pulled in. Included files are
//! expanded recursively.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use super::TranspileError;
use crate::utils::path::normalize_path;

/// Deepest chain of nested includes accepted.
pub const MAX_INCLUDE_DEPTH: usize = 32;

// ASCII classes only: the regex crate is built without Unicode tables.
static INCLUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!--[ \t\r\n]*include\([ \t]*([^)]+?)[ \t]*\)[ \t\r\n]*-->")
        .expect("include pattern is valid")
});

/// Expand every include directive in `source`.
pub fn expand(source: &str, origin: &Path, include_root: &Path) -> Result<String, TranspileError> {
    let mut stack = vec![normalize_path(origin)];
    expand_inner(source, origin, include_root, &mut stack)
}

fn expand_inner(
    source: &str,
    origin: &Path,
    include_root: &Path,
    stack: &mut Vec<PathBuf>,
) -> Result<String, TranspileError> {
    if !INCLUDE_RE.is_match(source) {
        return Ok(source.to_string());
    }

    let mut out = String::with_capacity(source.len());
    let mut last = 0;

    for caps in INCLUDE_RE.captures_iter(source) {
        let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&source[last..whole.start()]);
        last = whole.end();

        let target = target.as_str();
        let path = normalize_path(&include_root.join(target));

        if stack.contains(&path) {
            return Err(TranspileError::IncludeCycle(path));
        }
        if stack.len() > MAX_INCLUDE_DEPTH {
            return Err(TranspileError::IncludeDepth(origin.to_path_buf()));
        }

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(TranspileError::MissingInclude {
                    from: origin.to_path_buf(),
                    target: target.to_string(),
                });
            }
            Err(source) => return Err(TranspileError::Io { path, source }),
        };
        let text =
            String::from_utf8(bytes).map_err(|_| TranspileError::InvalidUtf8(path.clone()))?;

        stack.push(path.clone());
        let expanded = expand_inner(&text, &path, include_root, stack)?;
        stack.pop();

        out.push_str(expanded.trim_end_matches('\n'));
    }

    out.push_str(&source[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_pattern_compiles() {
        assert!(INCLUDE_RE.is_match("<!--include(a.md)-->"));
        assert!(INCLUDE_RE.is_match("<!--\n  include( parts/a.md )\t-->"));
        assert!(!INCLUDE_RE.is_match("<!-- inject:html -->"));
    }

    #[test]
    fn test_no_directive_is_identity() {
        let dir = TempDir::new().unwrap();
        let out = expand("# plain", &dir.path().join("a.md"), dir.path()).unwrap();
        assert_eq!(out, "# plain");
    }

    #[test]
    fn test_nested_include() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("parts")).unwrap();
        fs::write(dir.path().join("parts/outer.md"), "outer\n<!-- include(parts/inner.md) -->\n")
            .unwrap();
        fs::write(dir.path().join("parts/inner.md"), "inner\n").unwrap();

        let out = expand(
            "start\n<!-- include(parts/outer.md) -->\nend",
            &dir.path().join("a.md"),
            dir.path(),
        )
        .unwrap();
        assert_eq!(out, "start\nouter\ninner\nend");
    }

    #[test]
    fn test_missing_include() {
        let dir = TempDir::new().unwrap();
        let err = expand("<!-- include(nope.md) -->", &dir.path().join("a.md"), dir.path())
            .unwrap_err();
        assert!(matches!(err, TranspileError::MissingInclude { ref target, .. } if target == "nope.md"));
    }

    #[test]
    fn test_include_cycle() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("x.md"), "<!-- include(y.md) -->").unwrap();
        fs::write(dir.path().join("y.md"), "<!-- include(x.md) -->").unwrap();

        let err = expand("<!-- include(x.md) -->", &dir.path().join("a.md"), dir.path())
            .unwrap_err();
        assert!(matches!(err, TranspileError::IncludeCycle(_)));
    }

    #[test]
    fn test_self_include_is_cycle() {
        let dir = TempDir::new().unwrap();
        let origin = dir.path().join("a.md");
        fs::write(&origin, "<!-- include(a.md) -->").unwrap();

        let err = expand("<!-- include(a.md) -->", &origin, dir.path()).unwrap_err();
        assert!(matches!(err, TranspileError::IncludeCycle(_)));
    }

    #[test]
    fn test_include_depth_limit() {
        let dir = TempDir::new().unwrap();
        let levels = MAX_INCLUDE_DEPTH + 2;
        for i in 0..levels {
            fs::write(
                dir.path().join(format!("l{i}.md")),
                format!("<!-- include(l{}.md) -->", i + 1),
            )
            .unwrap();
        }
        fs::write(dir.path().join(format!("l{levels}.md")), "bottom").unwrap();

        let err = expand("<!-- include(l0.md) -->", &dir.path().join("a.md"), dir.path())
            .unwrap_err();
        assert!(matches!(err, TranspileError::IncludeDepth(_)));
    }
}
