//! Glob patterns over slash-separated relative paths.
//!
//! Supports the subset the pipeline needs:
//!
//! | syntax    | matches                                    |
//! |-----------|--------------------------------------------|
//! | `*`       | any run of characters except `/`           |
//! | `?`       | one character except `/`                   |
//! | `**/`     | zero or more whole directories             |
//! | `/**`     | (trailing) everything below the directory  |
//! | `{a,b}`   | either alternative (no nesting)            |
//!
//! Patterns compile to an anchored [`Regex`]. Walking starts at the
//! longest literal directory prefix, so `docs/**/*.md` only visits `docs/`.

use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use regex::Regex;
use thiserror::Error;

use super::path::to_slash;

#[derive(Debug, Error)]
pub enum GlobError {
    #[error("unclosed `{{` in glob `{0}`")]
    UnclosedBrace(String),

    #[error("invalid glob `{pattern}`")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A compiled glob pattern.
#[derive(Debug, Clone)]
pub struct Glob {
    pattern: String,
    regex: Regex,
    base: PathBuf,
}

impl Glob {
    /// Compile a pattern such as `docs/**/*.{md,apib}`.
    pub fn new(pattern: &str) -> Result<Self, GlobError> {
        let pattern = pattern.replace('\\', "/");
        let source = translate(&pattern)?;
        let regex = Regex::new(&source).map_err(|source| GlobError::Regex {
            pattern: pattern.clone(),
            source,
        })?;
        let base = literal_base(&pattern);
        Ok(Self {
            pattern,
            regex,
            base,
        })
    }

    /// Pattern text as given (with `/` separators).
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Whether the pattern contains no wildcards at all.
    pub fn is_literal(&self) -> bool {
        !self.pattern.contains(['*', '?', '{'])
    }

    /// Match a path relative to the pattern's root.
    pub fn is_match(&self, relative: &Path) -> bool {
        self.regex.is_match(&to_slash(relative))
    }

    /// Match an absolute path by first stripping `root`.
    pub fn matches_under(&self, root: &Path, path: &Path) -> bool {
        path.strip_prefix(root)
            .map(|rel| self.is_match(rel))
            .unwrap_or(false)
    }

    /// Walk `root` and return every matching entry (files and directories),
    /// sorted. A missing base directory yields an empty list.
    pub fn walk(&self, root: &Path) -> Vec<PathBuf> {
        let start = root.join(&self.base);
        if self.is_literal() {
            return if start.exists() { vec![start] } else { Vec::new() };
        }
        if !start.is_dir() {
            return Vec::new();
        }

        let mut matched: Vec<PathBuf> = WalkDir::new(&start)
            .min_depth(1)
            .sort(true)
            .into_iter()
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| self.matches_under(root, path))
            .collect();
        matched.sort();
        matched
    }

    /// Like [`Glob::walk`] but regular files only.
    pub fn walk_files(&self, root: &Path) -> Vec<PathBuf> {
        self.walk(root)
            .into_iter()
            .filter(|path| path.is_file())
            .collect()
    }
}

/// Translate glob syntax into an anchored regex source.
fn translate(pattern: &str) -> Result<String, GlobError> {
    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');

    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                let at_segment_start = i == 0 || chars[i - 1] == '/';
                match chars.get(i + 2) {
                    Some('/') if at_segment_start => {
                        out.push_str("(?:.*/)?");
                        i += 3;
                    }
                    None if at_segment_start && i > 0 => {
                        // `dir/**`: the directory itself and everything under it.
                        out.pop();
                        out.push_str("(?:/.*)?");
                        i += 2;
                    }
                    _ => {
                        out.push_str(".*");
                        i += 2;
                    }
                }
            }
            '*' => {
                out.push_str("[^/]*");
                i += 1;
            }
            '?' => {
                out.push_str("[^/]");
                i += 1;
            }
            '{' => {
                let close = chars[i..]
                    .iter()
                    .position(|&c| c == '}')
                    .ok_or_else(|| GlobError::UnclosedBrace(pattern.to_string()))?;
                let inner: String = chars[i + 1..i + close].iter().collect();
                let alternatives: Vec<String> =
                    inner.split(',').map(regex::escape).collect();
                out.push_str("(?:");
                out.push_str(&alternatives.join("|"));
                out.push(')');
                i += close + 1;
            }
            c => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
                i += 1;
            }
        }
    }

    out.push('$');
    Ok(out)
}

/// Directory prefix made only of wildcard-free segments.
fn literal_base(pattern: &str) -> PathBuf {
    let segments: Vec<&str> = pattern.split('/').collect();
    let mut base = PathBuf::new();
    for (index, segment) in segments.iter().enumerate() {
        let is_last = index + 1 == segments.len();
        if segment.contains(['*', '?', '{']) {
            break;
        }
        if is_last && pattern_has_wildcard(pattern) {
            break;
        }
        if !segment.is_empty() && *segment != "." {
            base.push(segment);
        }
    }
    base
}

fn pattern_has_wildcard(pattern: &str) -> bool {
    pattern.contains(['*', '?', '{'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_source_glob() {
        let glob = Glob::new("docs/**/*.{md,apib}").unwrap();
        assert!(glob.is_match(Path::new("docs/a.md")));
        assert!(glob.is_match(Path::new("docs/sub/b.apib")));
        assert!(glob.is_match(Path::new("docs/x/y/z.md")));
        assert!(!glob.is_match(Path::new("docs/a.html")));
        assert!(!glob.is_match(Path::new("other/a.md")));
        assert!(!glob.is_match(Path::new("docs/a.mdx")));
        assert_eq!(glob.base, Path::new("docs"));
    }

    #[test]
    fn test_star_stays_in_segment() {
        let glob = Glob::new("dist/*.html").unwrap();
        assert!(glob.is_match(Path::new("dist/a.html")));
        assert!(!glob.is_match(Path::new("dist/sub/a.html")));
    }

    #[test]
    fn test_clean_glob_excludes_root() {
        let glob = Glob::new("dist/**/*").unwrap();
        assert!(glob.is_match(Path::new("dist/a.html")));
        assert!(glob.is_match(Path::new("dist/sub")));
        assert!(glob.is_match(Path::new("dist/sub/b.html")));
        assert!(!glob.is_match(Path::new("dist")));
    }

    #[test]
    fn test_trailing_double_star() {
        let glob = Glob::new("dist/**").unwrap();
        assert!(glob.is_match(Path::new("dist")));
        assert!(glob.is_match(Path::new("dist/sub/b.html")));
        assert!(!glob.is_match(Path::new("distant")));
    }

    #[test]
    fn test_literal_pattern() {
        let glob = Glob::new("dist/sub/b.html").unwrap();
        assert!(glob.is_literal());
        assert!(glob.is_match(Path::new("dist/sub/b.html")));
        assert_eq!(glob.base, Path::new("dist/sub/b.html"));
    }

    #[test]
    fn test_regex_chars_escaped() {
        let glob = Glob::new("docs/v1.0+beta/*.md").unwrap();
        assert!(glob.is_match(Path::new("docs/v1.0+beta/a.md")));
        assert!(!glob.is_match(Path::new("docs/v1x0+beta/a.md")));
    }

    #[test]
    fn test_unclosed_brace() {
        assert!(matches!(
            Glob::new("docs/*.{md"),
            Err(GlobError::UnclosedBrace(_))
        ));
    }

    #[test]
    fn test_walk_files_sorted() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("docs/sub")).unwrap();
        fs::write(root.join("docs/b.md"), "b").unwrap();
        fs::write(root.join("docs/a.md"), "a").unwrap();
        fs::write(root.join("docs/sub/c.apib"), "c").unwrap();
        fs::write(root.join("docs/skip.txt"), "x").unwrap();

        let glob = Glob::new("docs/**/*.{md,apib}").unwrap();
        let found: Vec<_> = glob
            .walk_files(root)
            .into_iter()
            .map(|p| to_slash(p.strip_prefix(root).unwrap()))
            .collect();
        assert_eq!(found, vec!["docs/a.md", "docs/b.md", "docs/sub/c.apib"]);
    }

    #[test]
    fn test_walk_missing_base() {
        let dir = TempDir::new().unwrap();
        let glob = Glob::new("nothing/**/*.md").unwrap();
        assert!(glob.walk(dir.path()).is_empty());
    }
}
