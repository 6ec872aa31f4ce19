//! Config file sync: drift status and repair for declared file pairs.
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::components::{Registry, SyncFile, SyncMode};
use crate::config::expand_path;
use crate::resources::error::ResourceError;
use crate::resources::sync_content::{SyncCopy, SyncMerge};
use crate::resources::sync_link::{SyncAction, SyncLink, SyncStatus};

/// The resource that keeps one target in line with its source.
#[derive(Debug, Clone)]
pub enum SyncResource {
    /// Symlink mode.
    Link(SyncLink),
    /// Copy mode.
    Copy(SyncCopy),
    /// Merge mode.
    Merge(SyncMerge),
}

impl SyncResource {
    /// Sync mode this resource implements.
    #[must_use]
    pub const fn mode(&self) -> SyncMode {
        match self {
            Self::Link(_) => SyncMode::Symlink,
            Self::Copy(_) => SyncMode::Copy,
            Self::Merge(_) => SyncMode::Merge,
        }
    }

    /// Source path.
    #[must_use]
    pub fn source(&self) -> &Path {
        match self {
            Self::Link(link) => &link.source,
            Self::Copy(copy) => &copy.source,
            Self::Merge(merge) => &merge.source,
        }
    }

    /// Target path.
    #[must_use]
    pub fn target(&self) -> &Path {
        match self {
            Self::Link(link) => &link.target,
            Self::Copy(copy) => &copy.target,
            Self::Merge(merge) => &merge.target,
        }
    }

    /// Classify the target.  Read-only.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        match self {
            Self::Link(link) => link.status(),
            Self::Copy(copy) => copy.status(),
            Self::Merge(merge) => merge.status(),
        }
    }

    /// Bring the target in line with the source.
    ///
    /// # Errors
    ///
    /// Returns the mode-specific [`ResourceError`].
    pub fn sync(&self, dry_run: bool) -> Result<SyncAction, ResourceError> {
        match self {
            Self::Link(link) => link.sync(dry_run),
            Self::Copy(copy) => copy.sync(dry_run),
            Self::Merge(merge) => merge.sync(dry_run),
        }
    }
}

/// A declared sync pair with its owning component.
#[derive(Debug, Clone)]
pub struct SyncPair {
    /// Component that declared the pair.
    pub component: String,
    /// Resolved resource.
    pub resource: SyncResource,
}

/// Read-only status of one pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncEntry {
    /// Owning component.
    pub component: String,
    /// Source path.
    pub source: PathBuf,
    /// Target path.
    pub target: PathBuf,
    /// Sync mode.
    pub mode: SyncMode,
    /// Drift classification.
    pub status: SyncStatus,
}

/// A pair that was processed successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    /// Owning component.
    pub component: String,
    /// Source path.
    pub source: PathBuf,
    /// Target path.
    pub target: PathBuf,
    /// Sync mode.
    pub mode: SyncMode,
    /// What was done.
    pub action: SyncAction,
}

/// A pair that could not be synced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncFailure {
    /// Owning component.
    pub component: String,
    /// Source path.
    pub source: PathBuf,
    /// Target path.
    pub target: PathBuf,
    /// Sync mode.
    pub mode: SyncMode,
    /// Error text.
    pub message: String,
}

/// Result of a sync run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    /// Whether the run was a dry run.
    pub dry_run: bool,
    /// Processed pairs in declaration order.
    pub entries: Vec<SyncOutcome>,
    /// Failures in encounter order.
    pub errors: Vec<SyncFailure>,
}

impl SyncReport {
    /// Number of pairs changed (or that would change).
    #[must_use]
    pub fn changed(&self) -> usize {
        self.entries.iter().filter(|e| e.action.is_change()).count()
    }
}

/// Collect every sync pair the registry declares.
///
/// Relative sources are joined onto `root`; targets and merge user files get
/// `~` and variable expansion.  A merge pair without a user file overlays
/// `<target>.local`.  Pairs are returned in component name order, then
/// declaration order.
#[must_use]
pub fn declared_pairs(
    registry: &Registry,
    root: &Path,
    home: &Path,
    env: &impl Fn(&str) -> Option<String>,
) -> Vec<SyncPair> {
    registry
        .descriptors()
        .flat_map(|descriptor| {
            descriptor.sync_files().iter().map(move |file| SyncPair {
                component: descriptor.name().to_string(),
                resource: resolve_file(file, root, home, env),
            })
        })
        .collect()
}

fn resolve_file(
    file: &SyncFile,
    root: &Path,
    home: &Path,
    env: &impl Fn(&str) -> Option<String>,
) -> SyncResource {
    let source = root.join(&file.source);
    let target = expand_path(&file.target, home, env);
    match file.mode {
        SyncMode::Symlink => SyncResource::Link(SyncLink::new(source, target)),
        SyncMode::Copy => SyncResource::Copy(SyncCopy::new(source, target)),
        SyncMode::Merge => {
            let options = file.merge.clone().unwrap_or_default();
            let user_file = options.user_file.as_deref().map_or_else(
                || {
                    let mut local = target.clone().into_os_string();
                    local.push(".local");
                    PathBuf::from(local)
                },
                |path| expand_path(path, home, env),
            );
            SyncResource::Merge(SyncMerge {
                source,
                target,
                user_file,
                strategy: options.strategy,
                preserve_user_keys: options.preserve_user_keys,
            })
        }
    }
}

/// Classify every pair without touching the filesystem.
#[must_use]
pub fn status(pairs: &[SyncPair]) -> Vec<SyncEntry> {
    pairs
        .iter()
        .map(|pair| SyncEntry {
            component: pair.component.clone(),
            source: pair.resource.source().to_path_buf(),
            target: pair.resource.target().to_path_buf(),
            mode: pair.resource.mode(),
            status: pair.resource.status(),
        })
        .collect()
}

/// Repair every pair that has drifted.
///
/// Each pair is processed independently; a failure is recorded and the next
/// pair is still attempted.
#[must_use]
pub fn sync(pairs: &[SyncPair], dry_run: bool) -> SyncReport {
    let mut report = SyncReport {
        dry_run,
        ..SyncReport::default()
    };
    for pair in pairs {
        let source = pair.resource.source().to_path_buf();
        let target = pair.resource.target().to_path_buf();
        let mode = pair.resource.mode();
        match pair.resource.sync(dry_run) {
            Ok(action) => report.entries.push(SyncOutcome {
                component: pair.component.clone(),
                source,
                target,
                mode,
                action,
            }),
            Err(e) => report.errors.push(SyncFailure {
                component: pair.component.clone(),
                source,
                target,
                mode,
                message: e.to_string(),
            }),
        }
    }
    report
}
