//! File-system resource helpers.
use std::path::{Path, PathBuf};

use crate::resources::error::ResourceError;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<(), ResourceError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| ResourceError::io("create parent", parent, e))?;
    }
    Ok(())
}

/// Remove an existing file or symlink at `path`, including broken symlinks.
///
/// Does nothing if `path` does not exist.  Directories are never removed.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_existing(path: &Path) -> Result<(), ResourceError> {
    if path.symlink_metadata().is_ok() {
        std::fs::remove_file(path).map_err(|e| ResourceError::io("remove", path, e))?;
    }
    Ok(())
}

/// Sibling path used to stage a write before renaming it over `path`.
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "acorn".to_string(), |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!(".{name}.acorn_tmp"))
}

/// Write `content` to `path` through a sibling temp file and a rename, so
/// readers see either the old file or the new one, never a partial write.
///
/// Parent directories are created as needed.  When `path` already exists
/// its permissions carry over to the replacement.
///
/// # Errors
///
/// Returns an error if the parent cannot be created, the temp file cannot be
/// written, or the rename fails.  The temp file is removed on failure.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), ResourceError> {
    write_atomic_bytes(path, content.as_bytes())
}

/// [`write_atomic`] for content that need not be UTF-8.
///
/// # Errors
///
/// Same as [`write_atomic`].
pub fn write_atomic_bytes(path: &Path, content: &[u8]) -> Result<(), ResourceError> {
    ensure_parent_dir(path)?;
    let tmp = staging_path(path);
    std::fs::write(&tmp, content).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        ResourceError::io("write", &tmp, e)
    })?;
    if let Ok(existing) = std::fs::metadata(path) {
        std::fs::set_permissions(&tmp, existing.permissions()).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            ResourceError::io("copy permissions", &tmp, e)
        })?;
    }
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        ResourceError::io("rename into place", path, e)
    })
}

/// Read `path` as UTF-8, treating a missing file as `None`.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn read_optional(path: &Path) -> Result<Option<String>, ResourceError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ResourceError::io("read", path, e)),
    }
}

/// Create a symlink at `link` pointing to `target`.
///
/// # Errors
///
/// Returns an error if the link cannot be created (including when `link`
/// already exists).
pub fn create_symlink(target: &Path, link: &Path) -> Result<(), ResourceError> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link)
            .map_err(|e| ResourceError::io("create symlink", link, e))
    }
    #[cfg(windows)]
    {
        let result = if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        };
        result.map_err(|e| ResourceError::io("create symlink", link, e))
    }
}

/// Compare two paths after canonical resolution.
///
/// Returns `false` when either side cannot be resolved (missing or dangling).
#[must_use]
pub fn resolves_to(link: &Path, expected: &Path) -> bool {
    match (dunce::canonicalize(link), dunce::canonicalize(expected)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
