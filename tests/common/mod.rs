// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed home plus dotfiles root and a fluent
// builder so each integration test can set up an isolated environment without
// repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use acorn_cli::components::{ComponentDescriptor, ConfigFormat, Registry};
use acorn_cli::config::{Settings, Shell};
use acorn_cli::logging::{Log, Logger};
use acorn_cli::resolver::Resolution;
use acorn_cli::tasks::Context;

/// An isolated home directory and dotfiles root backed by a
/// [`tempfile::TempDir`].
///
/// Everything is deleted when the context is dropped.
pub struct IntegrationTestContext {
    /// Temporary directory holding `home/` and `dotfiles/`.
    pub dir: tempfile::TempDir,
    /// Settings with every path inside the temporary directory.
    pub settings: Settings,
    /// Components available to the run.
    pub registry: Arc<Registry>,
    /// Shell load order.
    pub resolution: Arc<Resolution>,
    /// Logger shared by every context built from this environment.
    pub log: Arc<Logger>,
}

impl IntegrationTestContext {
    /// Home directory.
    pub fn home(&self) -> &Path {
        &self.settings.home
    }

    /// Dotfiles root.
    pub fn root(&self) -> &Path {
        &self.settings.root
    }

    /// Build a task context.  `$HOME` resolves to the temporary home and every
    /// other variable is unset.
    pub fn context(&self, dry_run: bool) -> Context {
        let home = self.home().display().to_string();
        Context::new(
            Arc::new(self.settings.clone()),
            Arc::clone(&self.registry),
            Arc::clone(&self.resolution),
            Arc::clone(&self.log) as Arc<dyn Log>,
            dry_run,
        )
        .with_env(Arc::new(move |key| (key == "HOME").then(|| home.clone())))
    }

    /// Read a file that must exist.
    pub fn read(&self, path: &Path) -> String {
        std::fs::read_to_string(path).expect("read file")
    }

    /// Every file in the generated directory with its content, sorted by name.
    pub fn generated_snapshot(&self) -> Vec<(String, String)> {
        let mut files: Vec<(String, String)> = std::fs::read_dir(&self.settings.generated_dir)
            .expect("read generated dir")
            .map(|entry| {
                let entry = entry.expect("dir entry");
                let content = self.read(&entry.path());
                (entry.file_name().to_string_lossy().into_owned(), content)
            })
            .collect();
        files.sort();
        files
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    dir: tempfile::TempDir,
    home: PathBuf,
    root: PathBuf,
    registry: Registry,
    shell_order: Vec<String>,
}

impl TestContextBuilder {
    /// Begin with empty `home/` and `dotfiles/` directories and no components.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let home = dir.path().join("home");
        let root = dir.path().join("dotfiles");
        std::fs::create_dir_all(&home).expect("create home");
        std::fs::create_dir_all(&root).expect("create dotfiles root");
        Self {
            dir,
            home,
            root,
            registry: Registry::new(),
            shell_order: Vec::new(),
        }
    }

    /// Register a component and append it to the shell order.
    pub fn with_component(mut self, descriptor: ComponentDescriptor) -> Self {
        self.shell_order.push(descriptor.name().to_string());
        self.registry
            .register(descriptor, || clap::Command::new("component"))
            .expect("register component");
        self
    }

    /// `core` (script only) and `k9s` (script plus YAML config).
    pub fn with_sample_components(self) -> Self {
        self.with_component(
            ComponentDescriptor::builder("core")
                .env("EDITOR", "nvim")
                .path("$HOME/.local/bin")
                .alias("ll", "ls -lah")
                .build()
                .expect("core"),
        )
        .with_component(
            ComponentDescriptor::builder("k9s")
                .alias("k9", "k9s")
                .config(
                    ConfigFormat::Yaml,
                    serde_json::json!({"k9s": {"ui": {"skin": "dracula"}}}),
                )
                .build()
                .expect("k9s"),
        )
    }

    /// Create a file under the dotfiles root.
    pub fn with_dotfile(self, relative: &str, content: &str) -> Self {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create dotfile parent");
        }
        std::fs::write(&path, content).expect("write dotfile");
        self
    }

    /// Create the rc file with `content`.
    pub fn with_rc_content(self, content: &str) -> Self {
        std::fs::write(self.home.join(".bashrc"), content).expect("write rc file");
        self
    }

    /// Finish building.
    pub fn build(self) -> IntegrationTestContext {
        let config = self.home.join(".config/acorn");
        let settings = Settings {
            rc_file: self.home.join(".bashrc"),
            generated_dir: config.join("generated"),
            link_dir: config.clone(),
            config_file: config.join("acorn.toml"),
            shell: Shell::Bash,
            acorn_dir: None,
            home: self.home,
            root: self.root,
        };
        IntegrationTestContext {
            dir: self.dir,
            settings,
            registry: Arc::new(self.registry),
            resolution: Arc::new(Resolution {
                shell_order: self.shell_order,
                unmapped: Vec::new(),
            }),
            log: Arc::new(Logger::new("test")),
        }
    }
}
