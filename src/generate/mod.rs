//! Shell script and config artifact generation.
//!
//! Rendering is pure (see [`render`]); this module decides which artifacts a
//! run produces, compares them against what is on disk and writes only the
//! ones whose content changed.
pub mod render;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::components::{
    CodecTable, ComponentDescriptor, ConfigFormat, ENTRYPOINT_STEM, Platform, Registry,
};
use crate::config::{Settings, Shell};
use crate::error::ConfigError;
use crate::resources::error::ResourceError;
use crate::resources::helpers::fs::{read_optional, write_atomic};

pub use render::{render_config, render_entrypoint, render_script};

/// What an artifact is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// `<component>.sh`.
    Script,
    /// `<component>.<ext>`.
    Config,
    /// `shell.sh`.
    Entrypoint,
}

/// Outcome of a single artifact write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    /// Content changed and was written.
    Written,
    /// On-disk content already matched.
    Unchanged,
    /// Dry run: would have been written.
    Planned,
}

/// A rendered file and where it lives.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedArtifact {
    /// Owning component (`shell` for the entrypoint).
    pub component: String,
    /// Artifact kind.
    pub kind: ArtifactKind,
    /// Config format, for config artifacts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ConfigFormat>,
    /// Path inside the generated directory.
    pub generated_path: PathBuf,
    /// Path the artifact is published to.
    pub symlink_target: PathBuf,
    /// Rendered content.
    #[serde(skip)]
    pub content: String,
    /// Write outcome.
    pub status: ArtifactStatus,
}

/// A per-artifact failure.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactError {
    /// Owning component.
    pub component: String,
    /// Artifact path, when one was computed.
    pub path: Option<PathBuf>,
    /// Error text.
    pub message: String,
}

/// Result of a generation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateReport {
    /// Whether the run was a dry run.
    pub dry_run: bool,
    /// Artifacts in render order.
    pub artifacts: Vec<GeneratedArtifact>,
    /// Per-artifact failures in encounter order.
    pub errors: Vec<ArtifactError>,
    /// Shell-order names left out of the entrypoint because nothing registers them.
    pub skipped: Vec<String>,
}

impl GenerateReport {
    /// Number of artifacts with the given status.
    #[must_use]
    pub fn count(&self, status: ArtifactStatus) -> usize {
        self.artifacts.iter().filter(|a| a.status == status).count()
    }

    /// Whether any artifact failed.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Renders and writes artifacts for a registry.
#[derive(Debug)]
pub struct Generator<'a> {
    registry: &'a Registry,
    shell_order: &'a [String],
    generated_dir: &'a Path,
    link_dir: &'a Path,
    shell: Shell,
    platform: Option<Platform>,
    dry_run: bool,
    codecs: CodecTable,
}

impl<'a> Generator<'a> {
    /// Create a generator writing into the directories named by `settings`.
    #[must_use]
    pub fn new(registry: &'a Registry, settings: &'a Settings, shell_order: &'a [String]) -> Self {
        Self {
            registry,
            shell_order,
            generated_dir: &settings.generated_dir,
            link_dir: &settings.link_dir,
            shell: settings.shell,
            platform: Platform::current(),
            dry_run: false,
            codecs: CodecTable::new(),
        }
    }

    /// Render platform-restricted `PATH` entries for `platform` instead of
    /// the running one.
    #[must_use]
    pub const fn platform(mut self, platform: Option<Platform>) -> Self {
        self.platform = platform;
        self
    }

    /// Preview only: nothing is written and no directory is created.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Render every registered component and the entrypoint.
    ///
    /// # Errors
    ///
    /// This variant never fails on configuration; the `Result` keeps the
    /// signature aligned with [`generate_components`](Self::generate_components).
    /// Per-artifact failures are collected in the report.
    pub fn generate_all(&self) -> Result<GenerateReport, ConfigError> {
        let mut report = self.empty_report();
        for descriptor in self.registry.descriptors() {
            self.generate_component(descriptor, &mut report);
        }
        self.generate_entrypoint(&mut report);
        Ok(report)
    }

    /// Render only the named components.  The entrypoint is left alone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownComponent`] for the first unknown name,
    /// before anything is written.
    pub fn generate_components(&self, names: &[String]) -> Result<GenerateReport, ConfigError> {
        let mut selected: Vec<&ComponentDescriptor> = Vec::with_capacity(names.len());
        for name in names {
            let descriptor = &self.registry.require(name)?.descriptor;
            if !selected.iter().any(|d| d.name() == descriptor.name()) {
                selected.push(descriptor);
            }
        }

        let mut report = self.empty_report();
        for descriptor in selected {
            self.generate_component(descriptor, &mut report);
        }
        Ok(report)
    }

    fn empty_report(&self) -> GenerateReport {
        GenerateReport {
            dry_run: self.dry_run,
            ..GenerateReport::default()
        }
    }

    fn generate_component(&self, descriptor: &ComponentDescriptor, report: &mut GenerateReport) {
        let name = descriptor.name();
        self.emit(
            report,
            name,
            ArtifactKind::Script,
            None,
            &format!("{name}.sh"),
            Ok(render_script(descriptor, self.platform)),
        );

        if let Some(spec) = descriptor.config() {
            self.emit(
                report,
                name,
                ArtifactKind::Config,
                Some(spec.format),
                &format!("{name}.{}", spec.format.extension()),
                render_config(name, spec, &self.codecs),
            );
        }
    }

    fn generate_entrypoint(&self, report: &mut GenerateReport) {
        let mut sourced: Vec<&str> = Vec::with_capacity(self.shell_order.len());
        for name in self.shell_order {
            if self.registry.get(name).is_some() {
                sourced.push(name.as_str());
            } else {
                report.skipped.push(name.clone());
            }
        }
        let content = render_entrypoint(self.generated_dir, &sourced, self.shell);
        self.emit(
            report,
            ENTRYPOINT_STEM,
            ArtifactKind::Entrypoint,
            None,
            &format!("{ENTRYPOINT_STEM}.sh"),
            Ok(content),
        );
    }

    fn emit(
        &self,
        report: &mut GenerateReport,
        component: &str,
        kind: ArtifactKind,
        format: Option<ConfigFormat>,
        file_name: &str,
        rendered: Result<String, ResourceError>,
    ) {
        let generated_path = self.generated_dir.join(file_name);
        let outcome = rendered.and_then(|content| {
            let status = self.write_if_changed(&generated_path, &content)?;
            Ok((content, status))
        });
        match outcome {
            Ok((content, status)) => report.artifacts.push(GeneratedArtifact {
                component: component.to_string(),
                kind,
                format,
                symlink_target: self.link_dir.join(file_name),
                generated_path,
                content,
                status,
            }),
            Err(e) => report.errors.push(ArtifactError {
                component: component.to_string(),
                path: Some(generated_path),
                message: e.to_string(),
            }),
        }
    }

    fn write_if_changed(&self, path: &Path, content: &str) -> Result<ArtifactStatus, ResourceError> {
        // An unreadable existing file counts as changed; the write reports the real error.
        let current = read_optional(path).unwrap_or(None);
        if current.as_deref() == Some(content) {
            return Ok(ArtifactStatus::Unchanged);
        }
        if self.dry_run {
            return Ok(ArtifactStatus::Planned);
        }
        write_atomic(path, content)?;
        Ok(ArtifactStatus::Written)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(root: &Path) -> Settings {
        Settings {
            home: root.join("home"),
            root: root.to_path_buf(),
            generated_dir: root.join("generated"),
            link_dir: root.join("link"),
            rc_file: root.join("home/.bashrc"),
            shell: Shell::Bash,
            config_file: root.join("acorn.toml"),
            acorn_dir: None,
        }
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        let core = ComponentDescriptor::builder("core")
            .alias("ll", "ls -l")
            .build()
            .unwrap();
        let k9s = ComponentDescriptor::builder("k9s")
            .config(ConfigFormat::Yaml, json!({"k9s": {"refreshRate": 2}}))
            .build()
            .unwrap();
        registry.register(core, || clap::Command::new("core")).unwrap();
        registry.register(k9s, || clap::Command::new("k9s")).unwrap();
        registry
    }

    fn order(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn generate_all_writes_scripts_configs_and_entrypoint() {
        let dir = tempfile::tempdir().unwrap();
        let s = settings(dir.path());
        let registry = registry();
        let shell_order = order(&["core", "k9s"]);

        let report = Generator::new(&registry, &s, &shell_order)
            .generate_all()
            .unwrap();

        let paths: Vec<_> = report
            .artifacts
            .iter()
            .map(|a| a.generated_path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(paths, vec!["core.sh", "k9s.sh", "k9s.yaml", "shell.sh"]);
        assert!(report.artifacts.iter().all(|a| a.status == ArtifactStatus::Written));
        assert!(s.generated_dir.join("k9s.yaml").exists());
        assert_eq!(
            report.artifacts[3].symlink_target,
            s.link_dir.join("shell.sh")
        );
    }

    #[test]
    fn second_run_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let s = settings(dir.path());
        let registry = registry();
        let shell_order = order(&["core"]);
        let generator = Generator::new(&registry, &s, &shell_order);

        generator.generate_all().unwrap();
        let before = std::fs::read_to_string(s.generated_dir.join("shell.sh")).unwrap();
        let second = generator.generate_all().unwrap();
        let after = std::fs::read_to_string(s.generated_dir.join("shell.sh")).unwrap();

        assert_eq!(before, after);
        assert_eq!(second.count(ArtifactStatus::Unchanged), second.artifacts.len());
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let s = settings(dir.path());
        let registry = registry();
        let shell_order = order(&["core"]);

        let report = Generator::new(&registry, &s, &shell_order)
            .dry_run(true)
            .generate_all()
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.count(ArtifactStatus::Planned), 4);
        assert!(!s.generated_dir.exists());
    }

    #[test]
    fn unregistered_shell_order_names_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let s = settings(dir.path());
        let registry = registry();
        let shell_order = order(&["core", "ghost"]);

        let report = Generator::new(&registry, &s, &shell_order)
            .generate_all()
            .unwrap();

        assert_eq!(report.skipped, vec!["ghost"]);
        let entry = std::fs::read_to_string(s.generated_dir.join("shell.sh")).unwrap();
        assert!(entry.contains("core.sh"));
        assert!(!entry.contains("ghost"));
    }

    #[test]
    fn partial_generation_leaves_other_artifacts_alone() {
        let dir = tempfile::tempdir().unwrap();
        let s = settings(dir.path());
        let registry = registry();
        let shell_order = order(&["core"]);

        let report = Generator::new(&registry, &s, &shell_order)
            .generate_components(&order(&["k9s"]))
            .unwrap();

        assert_eq!(report.artifacts.len(), 2);
        assert!(!s.generated_dir.join("core.sh").exists());
        assert!(!s.generated_dir.join("shell.sh").exists());
    }

    #[test]
    fn unknown_component_fails_before_any_write() {
        let dir = tempfile::tempdir().unwrap();
        let s = settings(dir.path());
        let registry = registry();
        let shell_order = order(&[]);

        let err = Generator::new(&registry, &s, &shell_order)
            .generate_components(&order(&["core", "nope"]))
            .unwrap_err();

        assert!(matches!(err, ConfigError::UnknownComponent { .. }));
        assert!(!s.generated_dir.exists());
    }

    #[test]
    fn encode_failure_is_collected_per_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let s = settings(dir.path());
        let mut registry = Registry::new();
        let bad = ComponentDescriptor::builder("bad")
            .config(ConfigFormat::Toml, json!([1, 2]))
            .build()
            .unwrap();
        registry.register(bad, || clap::Command::new("bad")).unwrap();
        let shell_order = order(&["bad"]);

        let report = Generator::new(&registry, &s, &shell_order)
            .generate_all()
            .unwrap();

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].component, "bad");
        assert!(s.generated_dir.join("bad.sh").exists());
        assert!(s.generated_dir.join("shell.sh").exists());
    }

    #[test]
    fn changed_content_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let s = settings(dir.path());
        let registry = registry();
        let shell_order = order(&["core"]);
        let generator = Generator::new(&registry, &s, &shell_order);
        generator.generate_all().unwrap();

        std::fs::write(s.generated_dir.join("core.sh"), "stale").unwrap();
        let report = generator.generate_all().unwrap();

        assert_eq!(report.artifacts[0].status, ArtifactStatus::Written);
        assert_eq!(report.count(ArtifactStatus::Written), 1);
    }
}
