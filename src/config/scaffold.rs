//! Scaffold loading: group membership and shell load order.
//!
//! A scaffold is a YAML document:
//!
//! ```yaml
//! name: acorn
//! groups:
//!   devops:
//!     description: Containers and clusters
//!     aliases: [ops]
//!     components: [docker, helm]
//! shell_order:
//!   bootstrap: [core]
//!   # optional: [docker]   # omit to derive from groups
//! ```
//!
//! Group order is the order of the keys under `groups`.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Scaffold compiled into the binary, used when no scaffold file is found.
const DEFAULT_SCAFFOLD: &str = include_str!("default_scaffold.yaml");

/// Scaffold file name searched for in `.acorn/` directories.
pub const SCAFFOLD_FILE: &str = "scaffold.yaml";

/// A named group of components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaffoldGroup {
    /// One-line description shown in the command tree.
    pub description: String,
    /// Alternative names for the group's subcommand.
    pub aliases: Vec<String>,
    /// Member components, in load order.
    pub components: Vec<String>,
}

/// Shell load order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellOrder {
    /// Components loaded first, in this exact order.
    #[serde(default)]
    pub bootstrap: Vec<String>,
    /// Components loaded after bootstrap.  `None` derives the list from the
    /// groups; `Some(vec![])` loads no optional components.
    #[serde(default)]
    pub optional: Option<Vec<String>>,
}

/// Declarative description of groups and shell load order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Scaffold {
    /// Scaffold name.
    pub name: String,
    /// Scaffold description.
    pub description: String,
    /// Group names in declaration order.
    pub group_order: Vec<String>,
    /// Groups keyed by name.
    pub groups: BTreeMap<String, ScaffoldGroup>,
    /// Shell load order.
    pub shell_order: ShellOrder,
}

/// On-disk shape; `groups` is kept as a mapping so key order survives.
#[derive(Debug, Deserialize)]
struct RawScaffold {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    groups: serde_yaml::Mapping,
    #[serde(default)]
    shell_order: ShellOrder,
}

/// Where the active scaffold came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "path")]
pub enum ScaffoldSource {
    /// A file on disk.
    File(PathBuf),
    /// The scaffold compiled into the binary.
    Embedded,
}

impl std::fmt::Display for ScaffoldSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Embedded => f.write_str("embedded default"),
        }
    }
}

impl Scaffold {
    /// Parse scaffold YAML.  `origin` names the source in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ScaffoldParse`] if the YAML is malformed, a
    /// group key is not a string, or a group body has the wrong shape.
    pub fn parse(yaml: &str, origin: &str) -> Result<Self, ConfigError> {
        let parse_err = |message: String| ConfigError::ScaffoldParse {
            origin: origin.to_string(),
            message,
        };

        let raw: RawScaffold = serde_yaml::from_str(yaml).map_err(|e| parse_err(e.to_string()))?;

        let mut group_order = Vec::with_capacity(raw.groups.len());
        let mut groups = BTreeMap::new();
        for (key, value) in raw.groups {
            let name = key
                .as_str()
                .ok_or_else(|| parse_err(format!("group key must be a string, got {key:?}")))?
                .to_string();
            let group: ScaffoldGroup = if value.is_null() {
                ScaffoldGroup::default()
            } else {
                serde_yaml::from_value(value)
                    .map_err(|e| parse_err(format!("group '{name}': {e}")))?
            };
            group_order.push(name.clone());
            groups.insert(name, group);
        }

        Ok(Self {
            name: raw.name,
            description: raw.description,
            group_order,
            groups,
            shell_order: raw.shell_order,
        })
    }

    /// The scaffold compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ScaffoldParse`] if the embedded document is
    /// malformed.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::parse(DEFAULT_SCAFFOLD, "embedded default")
    }

    /// Read and parse a scaffold file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ScaffoldRead`] if the file cannot be read, or
    /// [`ConfigError::ScaffoldParse`] if it is not valid scaffold YAML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ScaffoldRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// First group, in group order, that lists `component`.
    #[must_use]
    pub fn component_group(&self, component: &str) -> Option<&str> {
        self.groups_in_order()
            .find(|(_, group)| group.components.iter().any(|c| c == component))
            .map(|(name, _)| name)
    }

    /// Every grouped component, in group order then member order, without
    /// duplicates.
    #[must_use]
    pub fn all_components(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for (_, group) in self.groups_in_order() {
            for component in &group.components {
                if !out.contains(&component.as_str()) {
                    out.push(component);
                }
            }
        }
        out
    }

    /// Groups paired with their names, in declaration order.
    pub fn groups_in_order(&self) -> impl Iterator<Item = (&str, &ScaffoldGroup)> {
        self.group_order
            .iter()
            .filter_map(|name| self.groups.get(name).map(|g| (name.as_str(), g)))
    }
}

/// Locate and load the active scaffold.
///
/// Candidates, first match wins:
/// 1. `explicit` (from `--scaffold`); must exist.
/// 2. `<acorn_dir>/scaffold.yaml` when `acorn_dir` is set and the file exists.
/// 3. `.acorn/scaffold.yaml` in `start` or any ancestor.
/// 4. The embedded default.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the chosen file cannot be read or parsed.
pub fn discover(
    explicit: Option<&Path>,
    acorn_dir: Option<&Path>,
    start: &Path,
) -> Result<(Scaffold, ScaffoldSource), ConfigError> {
    if let Some(path) = explicit {
        return Ok((Scaffold::load(path)?, ScaffoldSource::File(path.to_path_buf())));
    }

    if let Some(dir) = acorn_dir {
        let path = dir.join(SCAFFOLD_FILE);
        if path.is_file() {
            return Ok((Scaffold::load(&path)?, ScaffoldSource::File(path)));
        }
    }

    for dir in start.ancestors() {
        let path = dir.join(".acorn").join(SCAFFOLD_FILE);
        if path.is_file() {
            return Ok((Scaffold::load(&path)?, ScaffoldSource::File(path)));
        }
    }

    Ok((Scaffold::embedded()?, ScaffoldSource::Embedded))
}
