//! Task summary types and the [`Log`] trait tasks write through.
use serde::Serialize;

/// One line of the run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskEntry {
    /// Task name as shown in stage headers.
    pub name: String,
    /// How the task ended.
    pub status: TaskStatus,
    /// Skip reason or error text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// How a task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Ran and everything is in place.
    Ok,
    /// Nothing for this task to look at (no rc file, no sync pairs, ...).
    NotApplicable,
    /// Ran but had nothing to do.
    Skipped,
    /// Previewed only.
    DryRun,
    /// At least one artifact or entry failed.
    Failed,
}

impl TaskStatus {
    /// Summary marker and its ANSI color.
    #[must_use]
    pub const fn marker(self) -> (&'static str, &'static str) {
        match self {
            Self::Ok => ("✓", "\x1b[32m"),
            Self::NotApplicable => ("·", "\x1b[2m"),
            Self::Skipped => ("○", "\x1b[33m"),
            Self::DryRun => ("~", "\x1b[37m"),
            Self::Failed => ("✗", "\x1b[31m"),
        }
    }

    /// Word used in the summary totals line.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NotApplicable => "n/a",
            Self::Skipped => "skipped",
            Self::DryRun => "dry-run",
            Self::Failed => "failed",
        }
    }

    /// Every status, in summary order.
    pub const ALL: [Self; 5] = [
        Self::Ok,
        Self::NotApplicable,
        Self::Skipped,
        Self::DryRun,
        Self::Failed,
    ];
}

/// Logging sink used by tasks.
///
/// [`Logger`](super::Logger) is the production implementation; the trait
/// keeps task code independent of it.
pub trait Log: Send + Sync {
    /// Stage header, one per task.
    fn stage(&self, msg: &str);
    /// Progress line.
    fn info(&self, msg: &str);
    /// Detail shown only with `--verbose` (always written to the log file).
    fn debug(&self, msg: &str);
    /// Something the user should look at.
    fn warn(&self, msg: &str);
    /// A failed artifact, entry or task.
    fn error(&self, msg: &str);
    /// A change that would be made without `--dry-run`.
    fn dry_run(&self, msg: &str);
    /// Record how a task ended.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_distinct() {
        let mut labels = TaskStatus::ALL.map(TaskStatus::label).to_vec();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), TaskStatus::ALL.len());
    }

    #[test]
    fn entry_serializes_without_empty_message() {
        let entry = TaskEntry {
            name: "Inject rc block".to_string(),
            status: TaskStatus::NotApplicable,
            message: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"name":"Inject rc block","status":"not_applicable"}"#);
    }
}
