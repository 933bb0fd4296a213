//! Path helpers confining file access to a working directory

use crate::errors::ReadgoError;
use anyhow::Result;
use std::path::{Component, Path, PathBuf};

/// Lexically clean a path: drop `.` components and fold `..` into the parent
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !cleaned.pop() && !cleaned.has_root() {
                    cleaned.push("..");
                }
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }
    cleaned
}

/// Make a path absolute against the current directory, then clean it
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(clean_path(path));
    }
    let cwd = std::env::current_dir()?;
    Ok(clean_path(&cwd.join(path)))
}

/// Resolve `path` against `work_dir` and require the result to stay inside it
///
/// `work_dir` must already be absolute and clean.
pub fn resolve_within(work_dir: &Path, path: &str) -> Result<PathBuf> {
    if path.trim().is_empty() {
        return Err(ReadgoError::invalid_input("path cannot be empty").into());
    }

    let candidate = Path::new(path);
    let joined = if candidate.is_absolute() {
        clean_path(candidate)
    } else {
        clean_path(&work_dir.join(candidate))
    };

    if !joined.starts_with(work_dir) {
        return Err(ReadgoError::Permission(format!(
            "path {} is outside of working directory {}",
            path,
            work_dir.display()
        ))
        .into());
    }

    Ok(joined)
}

/// Slash-separated path of `path` relative to `base`, `.` when equal
pub fn relative_slash(base: &Path, path: &Path) -> String {
    match path.strip_prefix(base) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}

/// File modification time, if the platform reports one
pub fn modified_time(path: &Path) -> Option<std::time::SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
