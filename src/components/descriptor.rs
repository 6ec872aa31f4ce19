//! Component descriptors: the shell fragments, structured config and sync
//! declarations a component contributes.
use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use super::codec::ConfigFormat;
use crate::error::ConfigError;

/// Name of the generated entrypoint script stem; reserved.
pub const ENTRYPOINT_STEM: &str = "shell";

/// A shell function definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShellFunction {
    /// Function name.
    pub name: String,
    /// Function body, without the surrounding `name() { }`.
    pub body: String,
}

impl ShellFunction {
    /// Functions prefixed with `__` are invoked once after definition.
    #[must_use]
    pub fn is_init(&self) -> bool {
        self.name.starts_with("__")
    }
}

/// A structured config file a component generates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigSpec {
    /// Output format.
    pub format: ConfigFormat,
    /// Content to serialize.
    pub payload: serde_json::Value,
}

/// Operating systems a `PATH` entry can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Linux.
    Linux,
    /// macOS.
    Macos,
}

impl Platform {
    /// The platform acorn is running on, if it is one a path can target.
    #[must_use]
    pub fn current() -> Option<Self> {
        match std::env::consts::OS {
            "linux" => Some(Self::Linux),
            "macos" => Some(Self::Macos),
            _ => None,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Linux => "linux",
            Self::Macos => "macos",
        })
    }
}

/// A directory prepended to `PATH`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathEntry {
    /// Directory; may contain `$VAR` references, expanded by the shell.
    pub dir: String,
    /// Only emitted when generating on this platform.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_on: Option<Platform>,
}

impl PathEntry {
    /// Whether the entry applies on `platform`.
    #[must_use]
    pub fn applies_to(&self, platform: Option<Platform>) -> bool {
        self.only_on.is_none() || self.only_on == platform
    }
}

/// What a wrapper function does after its command succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PostAction {
    /// Change into the directory named by the first argument.
    Cd,
}

/// A shell function that forwards its arguments to a command.
///
/// # Examples
///
/// ```
/// use acorn_cli::components::Wrapper;
///
/// let w = Wrapper::new("ta", "tmux new-session -A -s").default_arg("main");
/// assert_eq!(w.name, "ta");
/// assert!(!w.requires_arg);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Wrapper {
    /// Function name.
    pub name: String,
    /// Command the arguments are forwarded to.
    pub command: String,
    /// Usage line printed when a required argument is missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    /// Substituted for a missing first argument.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_arg: Option<String>,
    /// Run after the command succeeds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_action: Option<PostAction>,
    /// Refuse to run without a first argument.
    pub requires_arg: bool,
}

impl Wrapper {
    /// Wrapper `name` forwarding `"$@"` to `command`.
    #[must_use]
    pub fn new(name: &str, command: &str) -> Self {
        Self {
            name: name.to_string(),
            command: command.to_string(),
            usage: None,
            default_arg: None,
            post_action: None,
            requires_arg: false,
        }
    }

    /// Require a first argument, printing `usage` when it is missing.
    #[must_use]
    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = Some(usage.to_string());
        self.requires_arg = true;
        self
    }

    /// Require a first argument.
    #[must_use]
    pub const fn requires_arg(mut self) -> Self {
        self.requires_arg = true;
        self
    }

    /// Use `arg` when no first argument is given.
    #[must_use]
    pub fn default_arg(mut self, arg: &str) -> Self {
        self.default_arg = Some(arg.to_string());
        self
    }

    /// `cd` into the first argument after the command succeeds.
    #[must_use]
    pub const fn then_cd(mut self) -> Self {
        self.post_action = Some(PostAction::Cd);
        self
    }
}

/// How a sync pair puts its source in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Target is a symlink to the source.
    #[default]
    Symlink,
    /// Target is a byte copy of the source (directories recursively).
    Copy,
    /// Target is the source JSON object overlaid with a user-owned file.
    Merge,
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Symlink => "symlink",
            Self::Copy => "copy",
            Self::Merge => "merge",
        })
    }
}

/// How user values combine with the source in merge mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Nested objects merge key by key.
    #[default]
    Deep,
    /// A user key replaces the source value wholesale.
    Shallow,
}

/// Options for [`SyncMode::Merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeOptions {
    /// User overlay file; defaults to `<target>.local`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_file: Option<String>,
    /// Merge strategy.
    pub strategy: MergeStrategy,
    /// Top-level keys always taken verbatim from the user file.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub preserve_user_keys: Vec<String>,
}

/// A `(source, target)` pair kept in place by `acorn sync`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncFile {
    /// File in the dotfiles tree; relative paths are resolved against the
    /// dotfiles root.
    pub source: PathBuf,
    /// Canonical location; may start with `~/` and contain `$VAR` references.
    pub target: String,
    /// How the target mirrors the source.
    pub mode: SyncMode,
    /// Merge options; only read in merge mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge: Option<MergeOptions>,
}

/// Everything a component contributes to the generated environment.
///
/// Immutable once built; construct with [`ComponentDescriptor::builder`].
///
/// # Examples
///
/// ```
/// use acorn_cli::components::ComponentDescriptor;
///
/// let git = ComponentDescriptor::builder("git")
///     .alias("gs", "git status")
///     .env("GIT_PAGER", "less -FRX")
///     .build()
///     .unwrap();
///
/// assert_eq!(git.name(), "git");
/// assert_eq!(git.aliases().get("gs").map(String::as_str), Some("git status"));
/// assert!(git.config().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentDescriptor {
    name: String,
    description: String,
    aliases: BTreeMap<String, String>,
    env_vars: BTreeMap<String, String>,
    paths: Vec<PathEntry>,
    wrappers: Vec<Wrapper>,
    functions: Vec<ShellFunction>,
    config: Option<ConfigSpec>,
    sync_files: Vec<SyncFile>,
}

impl ComponentDescriptor {
    /// Start building a descriptor for `name`.
    #[must_use]
    pub fn builder(name: &str) -> DescriptorBuilder {
        DescriptorBuilder {
            name: name.to_string(),
            description: String::new(),
            aliases: BTreeMap::new(),
            env_vars: BTreeMap::new(),
            paths: Vec::new(),
            wrappers: Vec::new(),
            functions: Vec::new(),
            config: None,
            sync_files: Vec::new(),
        }
    }

    /// Unique component name; also the generated file stem.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One-line description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Aliases keyed by alias name (iterates sorted).
    #[must_use]
    pub const fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    /// Environment variables keyed by name (iterates sorted).
    #[must_use]
    pub const fn env_vars(&self) -> &BTreeMap<String, String> {
        &self.env_vars
    }

    /// Directories prepended to `PATH`, in declared order.
    #[must_use]
    pub fn paths(&self) -> &[PathEntry] {
        &self.paths
    }

    /// Wrapper functions in declared order.
    #[must_use]
    pub fn wrappers(&self) -> &[Wrapper] {
        &self.wrappers
    }

    /// Functions in declared order.
    #[must_use]
    pub fn functions(&self) -> &[ShellFunction] {
        &self.functions
    }

    /// Structured config, if the component generates one.
    #[must_use]
    pub const fn config(&self) -> Option<&ConfigSpec> {
        self.config.as_ref()
    }

    /// Declared sync pairs.
    #[must_use]
    pub fn sync_files(&self) -> &[SyncFile] {
        &self.sync_files
    }

    /// Whether the component contributes any shell text.
    #[must_use]
    pub fn has_shell(&self) -> bool {
        !(self.aliases.is_empty()
            && self.env_vars.is_empty()
            && self.paths.is_empty()
            && self.wrappers.is_empty()
            && self.functions.is_empty())
    }
}

/// Builder for [`ComponentDescriptor`].
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    name: String,
    description: String,
    aliases: BTreeMap<String, String>,
    env_vars: BTreeMap<String, String>,
    paths: Vec<PathEntry>,
    wrappers: Vec<Wrapper>,
    functions: Vec<ShellFunction>,
    config: Option<ConfigSpec>,
    sync_files: Vec<SyncFile>,
}

impl DescriptorBuilder {
    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Add an alias. A later alias with the same name replaces the earlier one.
    #[must_use]
    pub fn alias(mut self, name: &str, command: &str) -> Self {
        self.aliases.insert(name.to_string(), command.to_string());
        self
    }

    /// Add an environment variable.
    #[must_use]
    pub fn env(mut self, name: &str, value: &str) -> Self {
        self.env_vars.insert(name.to_string(), value.to_string());
        self
    }

    /// Prepend a directory to `PATH` (skipped at shell load if already present).
    #[must_use]
    pub fn path(mut self, dir: &str) -> Self {
        self.paths.push(PathEntry {
            dir: dir.to_string(),
            only_on: None,
        });
        self
    }

    /// Prepend a directory to `PATH` in scripts generated on `platform` only.
    #[must_use]
    pub fn path_on(mut self, platform: Platform, dir: &str) -> Self {
        self.paths.push(PathEntry {
            dir: dir.to_string(),
            only_on: Some(platform),
        });
        self
    }

    /// Add a wrapper function.
    #[must_use]
    pub fn wrapper(mut self, wrapper: Wrapper) -> Self {
        self.wrappers.push(wrapper);
        self
    }

    /// Add a function. Declaration order is preserved.
    #[must_use]
    pub fn function(mut self, name: &str, body: &str) -> Self {
        self.functions.push(ShellFunction {
            name: name.to_string(),
            body: body.to_string(),
        });
        self
    }

    /// Attach a structured config.
    #[must_use]
    pub fn config(mut self, format: ConfigFormat, payload: serde_json::Value) -> Self {
        self.config = Some(ConfigSpec { format, payload });
        self
    }

    /// Declare a `(source, target)` pair mirrored by a symlink.
    #[must_use]
    pub fn sync(self, source: impl Into<PathBuf>, target: &str) -> Self {
        self.sync_with(source.into(), target, SyncMode::Symlink, None)
    }

    /// Declare a `(source, target)` pair mirrored by a copy.
    #[must_use]
    pub fn sync_copy(self, source: impl Into<PathBuf>, target: &str) -> Self {
        self.sync_with(source.into(), target, SyncMode::Copy, None)
    }

    /// Declare a JSON `(source, target)` pair the user can overlay.
    #[must_use]
    pub fn sync_merge(
        self,
        source: impl Into<PathBuf>,
        target: &str,
        options: MergeOptions,
    ) -> Self {
        self.sync_with(source.into(), target, SyncMode::Merge, Some(options))
    }

    fn sync_with(
        mut self,
        source: PathBuf,
        target: &str,
        mode: SyncMode,
        merge: Option<MergeOptions>,
    ) -> Self {
        self.sync_files.push(SyncFile {
            source,
            target: target.to_string(),
            mode,
            merge,
        });
        self
    }

    /// Validate and finish the descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidName`] if the name is empty, contains
    /// characters other than ASCII alphanumerics, `-` and `_`, or is the
    /// reserved entrypoint stem, or if a wrapper name is not a valid shell
    /// function name.
    pub fn build(self) -> Result<ComponentDescriptor, ConfigError> {
        validate_name(&self.name)?;
        for wrapper in &self.wrappers {
            validate_function_name(&self.name, &wrapper.name)?;
        }
        Ok(ComponentDescriptor {
            name: self.name,
            description: self.description,
            aliases: self.aliases,
            env_vars: self.env_vars,
            paths: self.paths,
            wrappers: self.wrappers,
            functions: self.functions,
            config: self.config,
            sync_files: self.sync_files,
        })
    }
}

/// Component names are used verbatim as file stems.
fn validate_name(name: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name == ENTRYPOINT_STEM {
        return Err(invalid("reserved for the entrypoint script"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(invalid("only ASCII letters, digits, '-' and '_' are allowed"));
    }
    Ok(())
}

fn validate_function_name(component: &str, function: &str) -> Result<(), ConfigError> {
    let mut chars = function.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidName {
            name: component.to_string(),
            reason: format!("wrapper '{function}' is not a valid shell function name"),
        })
    }
}
