//! Copy and merge sync targets: real files whose content acorn writes.
//!
//! A copy target mirrors the bytes of its source (a directory is copied file
//! by file; extra files already in the target are left alone).  A merge
//! target is the source JSON object overlaid with a user-owned file, so
//! local edits live next to the managed file instead of inside it.
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use super::error::ResourceError;
use super::helpers::fs::{read_optional, remove_existing, write_atomic, write_atomic_bytes};
use super::sync_link::{SyncAction, SyncStatus};
use crate::components::MergeStrategy;

/// What a target is before a copy or merge writes to it.
enum Occupant {
    Nothing,
    Symlink,
    File,
}

impl Occupant {
    fn of(path: &Path) -> Self {
        match path.symlink_metadata() {
            Err(_) => Self::Nothing,
            Ok(meta) if meta.is_symlink() => Self::Symlink,
            Ok(_) => Self::File,
        }
    }

    /// Action for writing over this occupant.
    const fn action(&self) -> SyncAction {
        match self {
            Self::Nothing => SyncAction::Created,
            Self::Symlink => SyncAction::Replaced,
            Self::File => SyncAction::Updated,
        }
    }
}

// ---------------------------------------------------------------------------
// Copy
// ---------------------------------------------------------------------------

/// A target kept as a byte copy of its source.
#[derive(Debug, Clone)]
pub struct SyncCopy {
    /// File or directory in the dotfiles tree.
    pub source: PathBuf,
    /// Canonical location the tool reads.
    pub target: PathBuf,
}

impl SyncCopy {
    /// Create a new copy target.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }

    /// Files whose copy is missing or differs, with the bytes to write.
    fn pending(&self) -> Result<Vec<(PathBuf, Vec<u8>)>, ResourceError> {
        let mut out = Vec::new();
        collect_pending(&self.source, &self.target, &mut out)?;
        Ok(out)
    }

    /// Classify the target.  Read-only.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        match Occupant::of(&self.target) {
            Occupant::Nothing => SyncStatus::Missing,
            Occupant::Symlink => SyncStatus::Stale,
            Occupant::File => match self.pending() {
                Ok(pending) if pending.is_empty() => SyncStatus::Synced,
                _ => SyncStatus::Stale,
            },
        }
    }

    /// Copy every missing or differing file into place.
    ///
    /// A symlink at the target (left by an earlier symlink-mode sync) is
    /// replaced by a real copy.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::SourceMissing`] when the source does not
    /// exist, or an I/O error from reading or writing.
    pub fn sync(&self, dry_run: bool) -> Result<SyncAction, ResourceError> {
        if !self.source.exists() {
            return Err(ResourceError::SourceMissing {
                path: self.source.display().to_string(),
            });
        }

        let occupant = Occupant::of(&self.target);
        if matches!(occupant, Occupant::Symlink) {
            if dry_run {
                return Ok(SyncAction::WouldReplace);
            }
            remove_existing(&self.target)?;
        }

        let pending = self.pending()?;
        if pending.is_empty() {
            return Ok(SyncAction::Unchanged);
        }
        if dry_run {
            return Ok(occupant.action().preview());
        }
        for (path, bytes) in &pending {
            write_atomic_bytes(path, bytes)?;
        }
        Ok(occupant.action())
    }
}

fn collect_pending(
    source: &Path,
    target: &Path,
    out: &mut Vec<(PathBuf, Vec<u8>)>,
) -> Result<(), ResourceError> {
    if source.is_dir() {
        let read_dir_error = |e| ResourceError::io("read dir", source, e);
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(source).map_err(read_dir_error)? {
            entries.push(entry.map_err(read_dir_error)?);
        }
        entries.sort_by_key(std::fs::DirEntry::file_name);
        for entry in entries {
            collect_pending(&entry.path(), &target.join(entry.file_name()), out)?;
        }
        return Ok(());
    }

    let wanted = std::fs::read(source).map_err(|e| ResourceError::io("read", source, e))?;
    let current = match std::fs::read(target) {
        Ok(bytes) => Some(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(ResourceError::io("read", target, e)),
    };
    if current.as_deref() != Some(wanted.as_slice()) {
        out.push((target.to_path_buf(), wanted));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// A JSON target written as the source object overlaid with a user file.
#[derive(Debug, Clone)]
pub struct SyncMerge {
    /// Base JSON object in the dotfiles tree.
    pub source: PathBuf,
    /// Canonical location the tool reads.
    pub target: PathBuf,
    /// User-owned overlay; absent means the source is written as is.
    pub user_file: PathBuf,
    /// How nested objects combine.
    pub strategy: MergeStrategy,
    /// Top-level keys always taken verbatim from the user file.
    pub preserve_user_keys: Vec<String>,
}

impl SyncMerge {
    /// The object sync would write.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::SourceMissing`] when the source does not
    /// exist, or [`ResourceError::InvalidJson`] when the source or the user
    /// file is not a JSON object.
    pub fn merged(&self) -> Result<Value, ResourceError> {
        let base = read_object(&self.source)?.ok_or_else(|| ResourceError::SourceMissing {
            path: self.source.display().to_string(),
        })?;
        let user = read_object(&self.user_file)?.unwrap_or_default();
        Ok(Value::Object(merge_json(
            &base,
            &user,
            self.strategy,
            &self.preserve_user_keys,
        )))
    }

    fn current(&self) -> Option<Value> {
        let text = std::fs::read_to_string(&self.target).ok()?;
        serde_json::from_str(&text).ok()
    }

    /// Classify the target.  Read-only.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        match Occupant::of(&self.target) {
            Occupant::Nothing => SyncStatus::Missing,
            Occupant::Symlink => SyncStatus::Stale,
            Occupant::File => match (self.merged(), self.current()) {
                (Ok(wanted), Some(current)) if wanted == current => SyncStatus::Synced,
                _ => SyncStatus::Stale,
            },
        }
    }

    /// Write the merged object when the target differs from it.
    ///
    /// Targets are compared as JSON values, so formatting-only differences
    /// leave the file alone.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`merged`](Self::merged), or an I/O error from
    /// writing the target.
    pub fn sync(&self, dry_run: bool) -> Result<SyncAction, ResourceError> {
        let merged = self.merged()?;
        let occupant = Occupant::of(&self.target);
        if matches!(occupant, Occupant::File) && self.current().as_ref() == Some(&merged) {
            return Ok(SyncAction::Unchanged);
        }
        if dry_run {
            return Ok(occupant.action().preview());
        }

        let mut text =
            serde_json::to_string_pretty(&merged).map_err(|e| ResourceError::InvalidJson {
                path: self.target.display().to_string(),
                message: e.to_string(),
            })?;
        text.push('\n');
        if matches!(occupant, Occupant::Symlink) {
            remove_existing(&self.target)?;
        }
        write_atomic(&self.target, &text)?;
        Ok(occupant.action())
    }
}

/// Read `path` as a JSON object; a missing file is `None`.
fn read_object(path: &Path) -> Result<Option<Map<String, Value>>, ResourceError> {
    let Some(text) = read_optional(path)? else {
        return Ok(None);
    };
    let invalid = |message: String| ResourceError::InvalidJson {
        path: path.display().to_string(),
        message,
    };
    match serde_json::from_str(&text).map_err(|e| invalid(e.to_string()))? {
        Value::Object(map) => Ok(Some(map)),
        _ => Err(invalid("expected an object".to_string())),
    }
}

/// Overlay `user` onto `base`.
///
/// User values win.  With [`MergeStrategy::Deep`] an object present on both
/// sides is merged key by key; keys in `preserve_user_keys` are always taken
/// from `user` whole.
///
/// # Examples
///
/// ```
/// use acorn_cli::components::MergeStrategy;
/// use acorn_cli::resources::sync_content::merge_json;
/// use serde_json::json;
///
/// let base = json!({"theme": "dark", "editor": {"tabs": 4, "wrap": true}});
/// let user = json!({"editor": {"tabs": 2}});
/// let merged = merge_json(
///     base.as_object().unwrap(),
///     user.as_object().unwrap(),
///     MergeStrategy::Deep,
///     &[],
/// );
/// assert_eq!(
///     serde_json::Value::Object(merged),
///     json!({"theme": "dark", "editor": {"tabs": 2, "wrap": true}})
/// );
/// ```
#[must_use]
pub fn merge_json(
    base: &Map<String, Value>,
    user: &Map<String, Value>,
    strategy: MergeStrategy,
    preserve_user_keys: &[String],
) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in user {
        let combined = match (strategy, merged.get(key), value) {
            (MergeStrategy::Deep, Some(Value::Object(b)), Value::Object(u))
                if !preserve_user_keys.contains(key) =>
            {
                Value::Object(merge_json(b, u, strategy, &[]))
            }
            _ => value.clone(),
        };
        merged.insert(key.clone(), combined);
    }
    merged
}
