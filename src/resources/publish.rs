//! Publishing generated artifacts into the link directory.
use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::error::ResourceError;
use super::helpers::fs::{create_symlink, ensure_parent_dir, resolves_to};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::generate::GeneratedArtifact;

/// A symlink from the link directory to a generated artifact.
///
/// Publishing is non-destructive: anything already occupying the link path
/// that is not our own symlink is reported as a conflict and left alone.
#[derive(Debug, Clone)]
pub struct PublishLink {
    /// Artifact inside the generated directory.
    pub generated: PathBuf,
    /// Where the symlink lives.
    pub link: PathBuf,
}

impl PublishLink {
    /// Create a new publish link resource.
    #[must_use]
    pub const fn new(generated: PathBuf, link: PathBuf) -> Self {
        Self { generated, link }
    }

    /// Resource for a generated artifact.
    #[must_use]
    pub fn for_artifact(artifact: &GeneratedArtifact) -> Self {
        Self::new(
            artifact.generated_path.clone(),
            artifact.symlink_target.clone(),
        )
    }

    fn points_here(&self, existing: &Path) -> bool {
        existing == self.generated || resolves_to(&self.link, &self.generated)
    }
}

impl Applicable for PublishLink {
    fn description(&self) -> String {
        format!("{} -> {}", self.link.display(), self.generated.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        match self.current_state()? {
            ResourceState::Correct => Ok(ResourceChange::AlreadyCorrect),
            ResourceState::Missing => {
                ensure_parent_dir(&self.link)?;
                create_symlink(&self.generated, &self.link)?;
                Ok(ResourceChange::Applied)
            }
            ResourceState::Conflict { reason } | ResourceState::Incorrect { current: reason } => {
                Err(ResourceError::Conflict {
                    target: self.link.display().to_string(),
                    reason,
                }
                .into())
            }
        }
    }

    /// Remove the link, but only when it is ours.
    fn remove(&self) -> Result<ResourceChange> {
        match self.current_state()? {
            ResourceState::Correct => {
                std::fs::remove_file(&self.link)
                    .map_err(|e| ResourceError::io("remove symlink", &self.link, e))?;
                Ok(ResourceChange::Applied)
            }
            ResourceState::Missing => Ok(ResourceChange::AlreadyCorrect),
            ResourceState::Conflict { reason } | ResourceState::Incorrect { current: reason } => {
                Ok(ResourceChange::Skipped { reason })
            }
        }
    }
}

impl Resource for PublishLink {
    fn current_state(&self) -> Result<ResourceState> {
        let Ok(meta) = self.link.symlink_metadata() else {
            return Ok(ResourceState::Missing);
        };

        if meta.is_symlink() {
            let existing = std::fs::read_link(&self.link)
                .map_err(|e| ResourceError::io("read symlink", &self.link, e))?;
            if self.points_here(&existing) {
                return Ok(ResourceState::Correct);
            }
            return Ok(ResourceState::Conflict {
                reason: format!("symlink to {}", existing.display()),
            });
        }

        let reason = if meta.is_dir() {
            "directory"
        } else {
            "regular file"
        };
        Ok(ResourceState::Conflict {
            reason: reason.to_string(),
        })
    }
}

/// Outcome of publishing one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// Symlink created.
    Linked,
    /// Symlink already pointed at the artifact.
    AlreadyLinked,
    /// Dry run: symlink would be created.
    WouldLink,
    /// Link path occupied by something else; left untouched.
    Conflict {
        /// What occupies the path.
        reason: String,
    },
    /// Filesystem failure.
    Error {
        /// Error text.
        message: String,
    },
}

impl PublishOutcome {
    /// Whether this outcome counts as a failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::Error { .. })
    }
}

/// One published artifact.
#[derive(Debug, Clone, Serialize)]
pub struct PublishEntry {
    /// Owning component.
    pub component: String,
    /// Link path.
    pub link: PathBuf,
    /// Generated artifact path.
    pub generated: PathBuf,
    /// What happened.
    #[serde(flatten)]
    pub outcome: PublishOutcome,
}

/// Result of publishing a set of artifacts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PublishReport {
    /// Entries in artifact order.
    pub entries: Vec<PublishEntry>,
}

impl PublishReport {
    /// Number of failed entries.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_failure()).count()
    }
}

/// Publish every artifact independently.
///
/// A conflict or error on one artifact never stops the others.
#[must_use]
pub fn publish(artifacts: &[GeneratedArtifact], dry_run: bool) -> PublishReport {
    let entries = artifacts
        .iter()
        .map(|artifact| {
            let link = PublishLink::for_artifact(artifact);
            PublishEntry {
                component: artifact.component.clone(),
                outcome: publish_one(&link, dry_run),
                link: link.link,
                generated: link.generated,
            }
        })
        .collect();
    PublishReport { entries }
}

fn publish_one(link: &PublishLink, dry_run: bool) -> PublishOutcome {
    let state = match link.current_state() {
        Ok(state) => state,
        Err(e) => {
            return PublishOutcome::Error {
                message: format!("{e:#}"),
            };
        }
    };
    match state {
        ResourceState::Correct => PublishOutcome::AlreadyLinked,
        ResourceState::Conflict { reason } | ResourceState::Incorrect { current: reason } => {
            PublishOutcome::Conflict { reason }
        }
        ResourceState::Missing if dry_run => PublishOutcome::WouldLink,
        ResourceState::Missing => match link.apply() {
            Ok(_) => PublishOutcome::Linked,
            Err(e) => PublishOutcome::Error {
                message: format!("{e:#}"),
            },
        },
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::generate::{ArtifactKind, ArtifactStatus};

    fn artifact(dir: &Path, name: &str) -> GeneratedArtifact {
        let generated_path = dir.join("generated").join(name);
        ensure_parent_dir(&generated_path).unwrap();
        std::fs::write(&generated_path, "#!/bin/sh\n").unwrap();
        GeneratedArtifact {
            component: name.trim_end_matches(".sh").to_string(),
            kind: ArtifactKind::Script,
            format: None,
            generated_path,
            symlink_target: dir.join("link").join(name),
            content: String::new(),
            status: ArtifactStatus::Written,
        }
    }

    #[test]
    fn missing_link_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let a = artifact(dir.path(), "git.sh");

        let report = publish(std::slice::from_ref(&a), false);

        assert_eq!(report.entries[0].outcome, PublishOutcome::Linked);
        assert_eq!(std::fs::read_link(&a.symlink_target).unwrap(), a.generated_path);
    }

    #[test]
    fn second_publish_is_already_linked() {
        let dir = tempfile::tempdir().unwrap();
        let a = artifact(dir.path(), "git.sh");
        publish(std::slice::from_ref(&a), false);

        let report = publish(std::slice::from_ref(&a), false);

        assert_eq!(report.entries[0].outcome, PublishOutcome::AlreadyLinked);
        assert_eq!(report.failures(), 0);
    }

    #[test]
    fn regular_file_is_a_conflict_and_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let a = artifact(dir.path(), "git.sh");
        ensure_parent_dir(&a.symlink_target).unwrap();
        std::fs::write(&a.symlink_target, "mine").unwrap();

        let report = publish(std::slice::from_ref(&a), false);

        assert_eq!(
            report.entries[0].outcome,
            PublishOutcome::Conflict {
                reason: "regular file".to_string()
            }
        );
        assert_eq!(std::fs::read_to_string(&a.symlink_target).unwrap(), "mine");
        assert_eq!(report.failures(), 1);
    }

    #[test]
    fn foreign_symlink_is_a_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let a = artifact(dir.path(), "git.sh");
        let elsewhere = dir.path().join("elsewhere.sh");
        std::fs::write(&elsewhere, "").unwrap();
        ensure_parent_dir(&a.symlink_target).unwrap();
        create_symlink(&elsewhere, &a.symlink_target).unwrap();

        let report = publish(std::slice::from_ref(&a), false);

        assert!(matches!(report.entries[0].outcome, PublishOutcome::Conflict { .. }));
        assert_eq!(std::fs::read_link(&a.symlink_target).unwrap(), elsewhere);
    }

    #[test]
    fn directory_is_a_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let a = artifact(dir.path(), "git.sh");
        std::fs::create_dir_all(&a.symlink_target).unwrap();

        let report = publish(std::slice::from_ref(&a), false);

        assert_eq!(
            report.entries[0].outcome,
            PublishOutcome::Conflict {
                reason: "directory".to_string()
            }
        );
    }

    #[test]
    fn dry_run_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let a = artifact(dir.path(), "git.sh");

        let report = publish(std::slice::from_ref(&a), true);

        assert_eq!(report.entries[0].outcome, PublishOutcome::WouldLink);
        assert!(a.symlink_target.symlink_metadata().is_err());
        assert!(!dir.path().join("link").exists());
    }

    #[test]
    fn one_conflict_does_not_stop_others() {
        let dir = tempfile::tempdir().unwrap();
        let a = artifact(dir.path(), "a.sh");
        let b = artifact(dir.path(), "b.sh");
        ensure_parent_dir(&a.symlink_target).unwrap();
        std::fs::write(&a.symlink_target, "").unwrap();

        let report = publish(&[a, b.clone()], false);

        assert!(report.entries[0].outcome.is_failure());
        assert_eq!(report.entries[1].outcome, PublishOutcome::Linked);
        assert!(b.symlink_target.symlink_metadata().unwrap().is_symlink());
    }

    #[test]
    fn remove_only_deletes_own_link() {
        let dir = tempfile::tempdir().unwrap();
        let a = artifact(dir.path(), "a.sh");
        let link = PublishLink::for_artifact(&a);
        link.apply().unwrap();

        assert_eq!(link.remove().unwrap(), ResourceChange::Applied);
        assert!(a.symlink_target.symlink_metadata().is_err());
        assert_eq!(link.remove().unwrap(), ResourceChange::AlreadyCorrect);

        std::fs::write(&a.symlink_target, "user").unwrap();
        assert!(matches!(link.remove().unwrap(), ResourceChange::Skipped { .. }));
        assert!(a.symlink_target.exists());
    }

    #[test]
    fn apply_on_conflict_is_typed_error() {
        let dir = tempfile::tempdir().unwrap();
        let a = artifact(dir.path(), "a.sh");
        ensure_parent_dir(&a.symlink_target).unwrap();
        std::fs::write(&a.symlink_target, "").unwrap();

        let err = PublishLink::for_artifact(&a).apply().unwrap_err();
        assert!(err.downcast_ref::<ResourceError>().is_some());
    }
}
