//! Config file sync: drift classification, actions and the symlink mode.
use anyhow::Result;
use serde::Serialize;
use std::ffi::OsString;
use std::path::PathBuf;

use super::error::ResourceError;
use super::helpers::fs::{create_symlink, ensure_parent_dir, remove_existing, resolves_to};
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// Drift classification of a sync target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Target matches its source.
    Synced,
    /// Nothing at the target path.
    Missing,
    /// Symlink mode: target is a regular file or directory.
    NotSymlink,
    /// Symlink mode: target is a symlink that does not resolve to the source
    /// (including dangling).
    WrongTarget,
    /// Copy and merge modes: target content differs from what sync would
    /// write, or a symlink sits where a real file belongs.
    Stale,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Synced => "synced",
            Self::Missing => "missing",
            Self::NotSymlink => "not_symlink",
            Self::WrongTarget => "wrong_target",
            Self::Stale => "stale",
        })
    }
}

/// What a sync did to one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    /// Already synced.
    Unchanged,
    /// Link created where nothing was.
    Created,
    /// Wrong symlink replaced.
    Replaced,
    /// Occupant moved to `<target>.backup`, then linked.
    BackedUp,
    /// Content rewritten in place.
    Updated,
    /// Dry run: would create.
    WouldCreate,
    /// Dry run: would replace.
    WouldReplace,
    /// Dry run: would back up and link.
    WouldBackUp,
    /// Dry run: would rewrite.
    WouldUpdate,
}

impl SyncAction {
    /// Whether the target was (or would be) modified.
    #[must_use]
    pub const fn is_change(self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    /// The dry-run form of this action.
    #[must_use]
    pub const fn preview(self) -> Self {
        match self {
            Self::Created => Self::WouldCreate,
            Self::Replaced => Self::WouldReplace,
            Self::BackedUp => Self::WouldBackUp,
            Self::Updated => Self::WouldUpdate,
            other => other,
        }
    }
}

impl std::fmt::Display for SyncAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Unchanged => "unchanged",
            Self::Created => "created",
            Self::Replaced => "replaced",
            Self::BackedUp => "backed up and linked",
            Self::Updated => "updated",
            Self::WouldCreate => "would create",
            Self::WouldReplace => "would replace",
            Self::WouldBackUp => "would back up and link",
            Self::WouldUpdate => "would update",
        })
    }
}

/// A `target -> source` symlink that mirrors a dotfiles file into place.
#[derive(Debug, Clone)]
pub struct SyncLink {
    /// File in the dotfiles tree.
    pub source: PathBuf,
    /// Canonical location the tool reads.
    pub target: PathBuf,
}

impl SyncLink {
    /// Create a new sync link resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }

    /// Where a displaced occupant is moved.
    #[must_use]
    pub fn backup_path(&self) -> PathBuf {
        let mut name: OsString = self.target.clone().into_os_string();
        name.push(".backup");
        PathBuf::from(name)
    }

    /// Classify the target.  Read-only.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        match self.target.symlink_metadata() {
            Err(_) => SyncStatus::Missing,
            Ok(meta) if !meta.is_symlink() => SyncStatus::NotSymlink,
            Ok(_) if resolves_to(&self.target, &self.source) => SyncStatus::Synced,
            Ok(_) => SyncStatus::WrongTarget,
        }
    }

    /// Bring the target in line with the source.
    ///
    /// In dry-run mode every precondition is still checked, so a preview
    /// reports the same errors a real run would hit.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::SourceMissing`] when the source does not
    /// exist, [`ResourceError::BackupExists`] when a non-symlink occupant
    /// cannot be moved aside, or an I/O error from the filesystem.
    pub fn sync(&self, dry_run: bool) -> Result<SyncAction, ResourceError> {
        let status = self.status();
        if status == SyncStatus::Synced {
            return Ok(SyncAction::Unchanged);
        }
        if !self.source.exists() {
            return Err(ResourceError::SourceMissing {
                path: self.source.display().to_string(),
            });
        }

        let action = match status {
            SyncStatus::NotSymlink => {
                let backup = self.backup_path();
                if backup.symlink_metadata().is_ok() {
                    return Err(ResourceError::BackupExists {
                        path: backup.display().to_string(),
                    });
                }
                if dry_run {
                    return Ok(SyncAction::WouldBackUp);
                }
                std::fs::rename(&self.target, &backup)
                    .map_err(|e| ResourceError::io("back up", &self.target, e))?;
                SyncAction::BackedUp
            }
            SyncStatus::WrongTarget => {
                if dry_run {
                    return Ok(SyncAction::WouldReplace);
                }
                remove_existing(&self.target)?;
                SyncAction::Replaced
            }
            SyncStatus::Missing | SyncStatus::Synced | SyncStatus::Stale => {
                if dry_run {
                    return Ok(SyncAction::WouldCreate);
                }
                SyncAction::Created
            }
        };

        ensure_parent_dir(&self.target)?;
        create_symlink(&self.source, &self.target)?;
        Ok(action)
    }
}

impl Applicable for SyncLink {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        Ok(match self.sync(false)? {
            SyncAction::Unchanged => ResourceChange::AlreadyCorrect,
            _ => ResourceChange::Applied,
        })
    }
}

impl Resource for SyncLink {
    fn current_state(&self) -> Result<ResourceState> {
        Ok(match self.status() {
            SyncStatus::Synced => ResourceState::Correct,
            SyncStatus::Missing => ResourceState::Missing,
            SyncStatus::WrongTarget => ResourceState::Incorrect {
                current: "symlink to another path".to_string(),
            },
            SyncStatus::NotSymlink => ResourceState::Incorrect {
                current: "not a symlink".to_string(),
            },
            SyncStatus::Stale => ResourceState::Incorrect {
                current: "stale content".to_string(),
            },
        })
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::path::Path;

    fn setup(dir: &Path) -> SyncLink {
        let source = dir.join("dotfiles/tmux.conf");
        std::fs::create_dir_all(source.parent().unwrap()).unwrap();
        std::fs::write(&source, "set -g mouse on\n").unwrap();
        SyncLink::new(source, dir.join("home/.config/tmux/tmux.conf"))
    }

    #[test]
    fn missing_target_is_created_with_parents() {
        let dir = tempfile::tempdir().unwrap();
        let link = setup(dir.path());
        assert_eq!(link.status(), SyncStatus::Missing);
        assert_eq!(link.sync(false).unwrap(), SyncAction::Created);
        assert_eq!(link.status(), SyncStatus::Synced);
        assert_eq!(link.sync(false).unwrap(), SyncAction::Unchanged);
    }

    #[test]
    fn regular_file_is_backed_up() {
        let dir = tempfile::tempdir().unwrap();
        let link = setup(dir.path());
        std::fs::create_dir_all(link.target.parent().unwrap()).unwrap();
        std::fs::write(&link.target, "mine\n").unwrap();

        assert_eq!(link.status(), SyncStatus::NotSymlink);
        assert_eq!(link.sync(false).unwrap(), SyncAction::BackedUp);
        assert_eq!(std::fs::read_to_string(link.backup_path()).unwrap(), "mine\n");
        assert_eq!(link.status(), SyncStatus::Synced);
    }

    #[test]
    fn existing_backup_blocks_sync() {
        let dir = tempfile::tempdir().unwrap();
        let link = setup(dir.path());
        std::fs::create_dir_all(link.target.parent().unwrap()).unwrap();
        std::fs::write(&link.target, "mine\n").unwrap();
        std::fs::write(link.backup_path(), "older\n").unwrap();

        let err = link.sync(false).unwrap_err();
        assert!(matches!(err, ResourceError::BackupExists { .. }));
        assert_eq!(std::fs::read_to_string(&link.target).unwrap(), "mine\n");
    }

    #[test]
    fn wrong_symlink_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let link = setup(dir.path());
        let other = dir.path().join("other.conf");
        std::fs::write(&other, "").unwrap();
        std::fs::create_dir_all(link.target.parent().unwrap()).unwrap();
        create_symlink(&other, &link.target).unwrap();

        assert_eq!(link.status(), SyncStatus::WrongTarget);
        assert_eq!(link.sync(false).unwrap(), SyncAction::Replaced);
        assert_eq!(std::fs::read_link(&link.target).unwrap(), link.source);
    }

    #[test]
    fn dangling_link_naming_source_is_wrong_target() {
        let dir = tempfile::tempdir().unwrap();
        let link = SyncLink::new(dir.path().join("gone.conf"), dir.path().join("t.conf"));
        create_symlink(&link.source, &link.target).unwrap();
        assert_eq!(link.status(), SyncStatus::WrongTarget);
    }

    #[test]
    fn missing_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let link = SyncLink::new(dir.path().join("absent"), dir.path().join("t"));
        let err = link.sync(true).unwrap_err();
        assert!(matches!(err, ResourceError::SourceMissing { .. }));
    }

    #[test]
    fn dry_run_reports_without_touching() {
        let dir = tempfile::tempdir().unwrap();
        let link = setup(dir.path());
        assert_eq!(link.sync(true).unwrap(), SyncAction::WouldCreate);
        assert!(!link.target.parent().unwrap().exists());

        std::fs::create_dir_all(link.target.parent().unwrap()).unwrap();
        std::fs::write(&link.target, "mine\n").unwrap();
        assert_eq!(link.sync(true).unwrap(), SyncAction::WouldBackUp);
        assert!(!link.backup_path().exists());
    }

    #[test]
    fn resource_state_maps_status() {
        let dir = tempfile::tempdir().unwrap();
        let link = setup(dir.path());
        assert_eq!(link.current_state().unwrap(), ResourceState::Missing);
        assert_eq!(link.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(link.current_state().unwrap(), ResourceState::Correct);
        assert!(!link.needs_change().unwrap());
    }
}
