use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::components::Registry;
use crate::config::Settings;
use crate::generate::GenerateReport;
use crate::logging::{Log, TaskEntry};
use crate::resolver::Resolution;
use crate::resources::publish::PublishReport;
use crate::resources::rc_block::RcAction;
use crate::sync::{SyncEntry, SyncReport};

/// Environment variable lookup used for path expansion.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Outcome of an rc-file task.
#[derive(Debug, Clone, Serialize)]
pub struct RcReport {
    /// File that was inspected.
    pub rc_file: std::path::PathBuf,
    /// What happened.
    pub action: RcAction,
}

/// Reports collected from the tasks of one run, for structured output.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Artifact generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generate: Option<GenerateReport>,
    /// Symlink publishing (or unpublishing).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish: Option<PublishReport>,
    /// Rc file injection or ejection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rc: Option<RcReport>,
    /// Config file sync.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncReport>,
    /// Config file sync status (check mode).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_status: Option<Vec<SyncEntry>>,
    /// How each task ended; filled in once the run is over.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<TaskEntry>,
}

/// Shared context for task execution.
pub struct Context {
    /// Resolved paths and shell.
    pub settings: Arc<Settings>,
    /// Registered components.
    pub registry: Arc<Registry>,
    /// Shell order resolved from the scaffold.
    pub resolution: Arc<Resolution>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// Environment lookup for sync target expansion.
    pub env: EnvLookup,
    reports: Mutex<RunReport>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("settings", &self.settings)
            .field("registry", &self.registry)
            .field("resolution", &self.resolution)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("env", &"<env>")
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Creates a new context reading the process environment.
    #[must_use]
    pub fn new(
        settings: Arc<Settings>,
        registry: Arc<Registry>,
        resolution: Arc<Resolution>,
        log: Arc<dyn Log>,
        dry_run: bool,
    ) -> Self {
        Self {
            settings,
            registry,
            resolution,
            log,
            dry_run,
            env: Arc::new(|key| std::env::var(key).ok()),
            reports: Mutex::new(RunReport::default()),
        }
    }

    /// Replace the environment lookup.
    #[must_use]
    pub fn with_env(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }

    /// Replace the logger.
    #[must_use]
    pub fn with_log(mut self, log: Arc<dyn Log>) -> Self {
        self.log = log;
        self
    }

    /// Update the collected reports.
    pub fn record(&self, update: impl FnOnce(&mut RunReport)) {
        let mut guard = self
            .reports
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        update(&mut guard);
    }

    /// Snapshot of the collected reports.
    #[must_use]
    pub fn report(&self) -> RunReport {
        self.reports
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}
