//! Filesystem path normalization.

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
///
/// The fallback matters for removed files, which can no longer be
/// canonicalized.
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Render a relative path with `/` separators regardless of platform.
pub fn to_slash(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        let part = match component {
            Component::Normal(s) => s.to_string_lossy(),
            Component::CurDir => continue,
            Component::ParentDir => "..".into(),
            Component::RootDir | Component::Prefix(_) => continue,
        };
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(&part);
    }
    out
}

/// Map `path` under `from_root` onto `to_root` with a new extension.
///
/// `docs/sub/b.apib` with roots `docs` → `dist` and extension `html`
/// becomes `dist/sub/b.html`. Returns `None` when `path` is outside
/// `from_root`.
pub fn mirror_path(path: &Path, from_root: &Path, to_root: &Path, extension: &str) -> Option<PathBuf> {
    let relative = path.strip_prefix(from_root).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(to_root.join(relative).with_extension(extension))
}

/// Express `path` relative to `base`, walking up with `..` as needed.
///
/// Both paths should be absolute (or both relative to the same root).
pub fn relative_path(path: &Path, base: &Path) -> PathBuf {
    let path_parts: Vec<_> = path.components().collect();
    let base_parts: Vec<_> = base.components().collect();

    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &path_parts[common..] {
        relative.push(part);
    }
    relative
}
