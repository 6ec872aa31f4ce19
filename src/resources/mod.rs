//! Filesystem primitives acorn converges: published links, the rc block and
//! sync targets.
//!
//! Each one can report its [`ResourceState`] without side effects and then
//! be applied or removed.  Applying a resource that is already correct is a
//! no-op, so every command can be re-run safely.
pub mod error;
pub mod helpers;
pub mod publish;
pub mod rc_block;
pub mod sync_content;
pub mod sync_link;

use anyhow::Result;

/// Something acorn can put in place and take away again.
pub trait Applicable {
    /// Short label used in log lines, e.g. `link ~/.config/acorn/git.sh`.
    fn description(&self) -> String;

    /// Converge to the desired state.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure or when the path is occupied by
    /// something acorn does not own.
    fn apply(&self) -> Result<ResourceChange>;

    /// Undo [`apply`](Self::apply).  Only resources acorn owns outright
    /// support this.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure, or always for resources that cannot
    /// be removed.
    fn remove(&self) -> Result<ResourceChange> {
        anyhow::bail!("{} cannot be removed", self.description())
    }
}

/// What is on disk compared to what should be there.
///
/// # Examples
///
/// ```
/// use acorn_cli::resources::ResourceState;
///
/// let stale = ResourceState::Incorrect { current: "old block".into() };
/// let taken = ResourceState::Conflict { reason: "regular file".into() };
///
/// assert!(stale.is_ours());
/// assert!(!taken.is_ours());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Nothing there yet.
    Missing,
    /// Already as desired.
    Correct,
    /// Ours, but out of date.
    Incorrect {
        /// What is there now.
        current: String,
    },
    /// Occupied by something acorn must not touch.
    Conflict {
        /// What occupies the path.
        reason: String,
    },
}

impl ResourceState {
    /// Whether acorn may modify the path.
    #[must_use]
    pub const fn is_ours(&self) -> bool {
        !matches!(self, Self::Conflict { .. })
    }
}

/// What [`Applicable::apply`] or [`Applicable::remove`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Created, updated or removed.
    Applied,
    /// Nothing to do.
    AlreadyCorrect,
    /// Left alone on purpose.
    Skipped {
        /// Why.
        reason: String,
    },
}

/// A resource whose state can be inspected before it is applied.
pub trait Resource: Applicable {
    /// Inspect the path.  Never modifies anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be inspected.
    fn current_state(&self) -> Result<ResourceState>;

    /// Whether [`apply`](Applicable::apply) would change anything.  A
    /// conflict never needs a change: acorn leaves it alone.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`current_state`](Self::current_state).
    fn needs_change(&self) -> Result<bool> {
        Ok(matches!(
            self.current_state()?,
            ResourceState::Missing | ResourceState::Incorrect { .. }
        ))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// In-memory line that should read `want`.
    struct Line {
        have: RefCell<Option<String>>,
        want: &'static str,
        foreign: bool,
    }

    impl Line {
        fn new(have: Option<&str>, foreign: bool) -> Self {
            Self {
                have: RefCell::new(have.map(String::from)),
                want: "source shell.sh",
                foreign,
            }
        }
    }

    impl Applicable for Line {
        fn description(&self) -> String {
            "line".to_string()
        }

        fn apply(&self) -> Result<ResourceChange> {
            if !self.needs_change()? {
                return Ok(ResourceChange::AlreadyCorrect);
            }
            *self.have.borrow_mut() = Some(self.want.to_string());
            Ok(ResourceChange::Applied)
        }
    }

    impl Resource for Line {
        fn current_state(&self) -> Result<ResourceState> {
            Ok(match self.have.borrow().as_deref() {
                _ if self.foreign => ResourceState::Conflict {
                    reason: "foreign".to_string(),
                },
                None => ResourceState::Missing,
                Some(have) if have == self.want => ResourceState::Correct,
                Some(have) => ResourceState::Incorrect {
                    current: have.to_string(),
                },
            })
        }
    }

    #[test]
    fn apply_converges_then_is_a_no_op() {
        let line = Line::new(Some("source old.sh"), false);
        assert!(line.needs_change().unwrap());
        assert_eq!(line.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(line.current_state().unwrap(), ResourceState::Correct);
        assert_eq!(line.apply().unwrap(), ResourceChange::AlreadyCorrect);
    }

    #[test]
    fn missing_needs_change() {
        assert!(Line::new(None, false).needs_change().unwrap());
    }

    #[test]
    fn conflict_never_needs_change() {
        let line = Line::new(None, true);
        assert!(!line.needs_change().unwrap());
        assert!(!line.current_state().unwrap().is_ours());
    }

    #[test]
    fn remove_is_unsupported_by_default() {
        let err = Line::new(None, false).remove().unwrap_err();
        assert_eq!(err.to_string(), "line cannot be removed");
    }
}
