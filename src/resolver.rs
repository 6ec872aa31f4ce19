//! Shell load order and group-based command tree.
use serde::Serialize;

use crate::components::Registry;
use crate::config::scaffold::Scaffold;

/// Result of resolving a scaffold against the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Component names in the order the entrypoint sources them.
    pub shell_order: Vec<String>,
    /// Registered components that neither a group nor the shell order lists,
    /// sorted.
    pub unmapped: Vec<String>,
}

/// Compute the shell load order and the unmapped component list.
///
/// Bootstrap components come first in their declared order.  An explicit
/// `optional` list follows verbatim; when `optional` is unset it is derived
/// from the groups in group order.  Either way, anything already loaded is
/// not repeated.
///
/// # Examples
///
/// ```
/// use acorn_cli::components::{ComponentDescriptor, Registry};
/// use acorn_cli::config::scaffold::Scaffold;
/// use acorn_cli::resolver::resolve;
///
/// let scaffold = Scaffold::parse(
///     "groups:\n  devops:\n    components: [docker, helm]\nshell_order:\n  bootstrap: [core]\n",
///     "example",
/// )
/// .unwrap();
///
/// let mut registry = Registry::new();
/// for name in ["core", "docker", "helm", "stray"] {
///     let d = ComponentDescriptor::builder(name).build().unwrap();
///     registry.register(d, || clap::Command::new("x")).unwrap();
/// }
///
/// let resolution = resolve(&scaffold, &registry);
/// assert_eq!(resolution.shell_order, ["core", "docker", "helm"]);
/// assert_eq!(resolution.unmapped, ["stray"]);
/// ```
#[must_use]
pub fn resolve(scaffold: &Scaffold, registry: &Registry) -> Resolution {
    let mut shell_order: Vec<String> = Vec::new();
    let mut push = |name: &str| {
        if !shell_order.iter().any(|n| n == name) {
            shell_order.push(name.to_string());
        }
    };

    for name in &scaffold.shell_order.bootstrap {
        push(name.as_str());
    }
    match &scaffold.shell_order.optional {
        Some(optional) => optional.iter().for_each(|name| push(name.as_str())),
        None => scaffold.all_components().into_iter().for_each(&mut push),
    }

    let grouped = scaffold.all_components();
    let unmapped = registry
        .names()
        .into_iter()
        .filter(|name| !grouped.contains(name) && !shell_order.iter().any(|n| n == name))
        .map(String::from)
        .collect();

    Resolution {
        shell_order,
        unmapped,
    }
}

/// Build the `acorn <group> <component>` command tree.
///
/// Each scaffold group becomes a subcommand carrying the group's description
/// and aliases; each member component contributes the command its registry
/// builder returns.  Components the registry does not know are skipped.
#[must_use]
pub fn command_tree(root: clap::Command, scaffold: &Scaffold, registry: &Registry) -> clap::Command {
    let mut root = root;
    for (group_name, group) in scaffold.groups_in_order() {
        if root.find_subcommand(group_name).is_some() {
            tracing::warn!("scaffold group '{group_name}' shadows a built-in command, ignored");
            continue;
        }
        let mut group_cmd = clap::Command::new(group_name.to_string())
            .about(group.description.clone())
            .subcommand_required(true)
            .arg_required_else_help(true);
        for alias in &group.aliases {
            group_cmd = group_cmd.visible_alias(alias.clone());
        }
        let mut members = 0usize;
        for component in &group.components {
            match registry.get(component) {
                Some(reg) => {
                    group_cmd = group_cmd.subcommand((reg.command)());
                    members += 1;
                }
                None => tracing::debug!(
                    "scaffold group '{group_name}' lists unregistered component '{component}'"
                ),
            }
        }
        if members > 0 {
            root = root.subcommand(group_cmd);
        }
    }
    root
}
