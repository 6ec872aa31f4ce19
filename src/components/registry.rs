//! Component registry: name → descriptor + command builder.
//!
//! The registry is an explicit object built once at startup and then shared
//! by reference.  Tests construct their own registries with a handful of fake
//! components instead of the built-in set.
use std::collections::BTreeMap;

use super::descriptor::ComponentDescriptor;
use crate::error::ConfigError;

/// Builds the clap command for a component's tool wrapper.
pub type CommandBuilder = fn() -> clap::Command;

/// A registered component.
#[derive(Debug, Clone)]
pub struct Registration {
    /// What the component contributes.
    pub descriptor: ComponentDescriptor,
    /// Builder for the component's subcommand.
    pub command: CommandBuilder,
}

/// Lookup table of every known component, keyed and iterated by name.
///
/// # Examples
///
/// ```
/// use acorn_cli::components::{ComponentDescriptor, Registry};
///
/// let mut registry = Registry::new();
/// let git = ComponentDescriptor::builder("git").build().unwrap();
/// registry.register(git, || clap::Command::new("git")).unwrap();
///
/// assert!(registry.get("git").is_some());
/// assert!(registry.require("hg").is_err());
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    entries: BTreeMap<String, Registration>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateComponent`] if the name is already
    /// registered.  Callers treat this as fatal.
    pub fn register(
        &mut self,
        descriptor: ComponentDescriptor,
        command: CommandBuilder,
    ) -> Result<(), ConfigError> {
        let name = descriptor.name().to_string();
        if self.entries.contains_key(&name) {
            return Err(ConfigError::DuplicateComponent(name));
        }
        self.entries.insert(
            name,
            Registration {
                descriptor,
                command,
            },
        );
        Ok(())
    }

    /// Look up a component by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Registration> {
        self.entries.get(name)
    }

    /// Look up a component that the user named explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownComponent`] listing every registered
    /// name if `name` is not registered.
    pub fn require(&self, name: &str) -> Result<&Registration, ConfigError> {
        self.entries
            .get(name)
            .ok_or_else(|| ConfigError::UnknownComponent {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    /// Snapshot of every registration.
    #[must_use]
    pub const fn all(&self) -> &BTreeMap<String, Registration> {
        &self.entries
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Iterate descriptors in name order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ComponentDescriptor> {
        self.entries.values().map(|r| &r.descriptor)
    }

    /// Number of registered components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no components are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
