//! Domain-specific error types for the acorn engine.
//!
//! Internal modules return typed errors (e.g., [`ConfigError`]) while command
//! handlers at the CLI boundary convert them to [`anyhow::Error`] via the
//! standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! EngineError
//! ├── Config(ConfigError)    : registry, scaffold, settings (fail-fast)
//! ├── Resource(ResourceError): per-artifact / per-entry filesystem failures
//! └── PartialFailure         : aggregate of collected per-entry failures
//! ```

use thiserror::Error;

pub use crate::resources::error::ResourceError;

/// Top-level error type for the acorn engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration-related error (registry, scaffold, settings).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A filesystem operation on a single artifact or entry failed.
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    /// One or more entries of a fail-soft operation failed while the rest
    /// were processed.
    #[error("{failed} of {total} {operation} entries failed")]
    PartialFailure {
        /// Operation name (e.g. `"sync"`, `"publish"`).
        operation: String,
        /// Number of failed entries.
        failed: usize,
        /// Number of entries processed.
        total: usize,
    },
}

/// Errors that indicate a broken setup rather than a transient condition.
///
/// These abort the whole invocation immediately.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A component was requested by name but is not registered.
    #[error("component not found: {name} (available: {available})")]
    UnknownComponent {
        /// Requested component name.
        name: String,
        /// Comma-separated list of registered names.
        available: String,
    },

    /// Two definitions claim the same component name.
    #[error("component '{0}' is registered more than once")]
    DuplicateComponent(String),

    /// A component name cannot be used as a generated file key.
    #[error("invalid component name '{name}': {reason}")]
    InvalidName {
        /// Offending name.
        name: String,
        /// Why the name was rejected.
        reason: String,
    },

    /// A structured config format string is not one of the registered codecs.
    #[error("unknown config format '{0}' (available: yaml, json, toml)")]
    UnknownFormat(String),

    /// The scaffold file could not be read.
    #[error("failed to read scaffold file {path}: {source}")]
    ScaffoldRead {
        /// Path of the scaffold file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The scaffold file is not valid scaffold YAML.
    #[error("failed to parse scaffold {origin}: {message}")]
    ScaffoldParse {
        /// Path of the scaffold file, or `"embedded default"`.
        origin: String,
        /// Parser message.
        message: String,
    },

    /// The settings file is not valid TOML.
    #[error("failed to load settings from {path}: {message}")]
    SettingsParse {
        /// Path of the settings file.
        path: String,
        /// Parser message.
        message: String,
    },

    /// No home directory could be determined from the environment.
    #[error("cannot determine home directory: set HOME")]
    MissingHome,
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    // -----------------------------------------------------------------------
    // ConfigError
    // -----------------------------------------------------------------------

    #[test]
    fn unknown_component_lists_available() {
        let e = ConfigError::UnknownComponent {
            name: "dockr".to_string(),
            available: "docker, git".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "component not found: dockr (available: docker, git)"
        );
    }

    #[test]
    fn duplicate_component_display() {
        let e = ConfigError::DuplicateComponent("git".to_string());
        assert_eq!(e.to_string(), "component 'git' is registered more than once");
    }

    #[test]
    fn unknown_format_display() {
        let e = ConfigError::UnknownFormat("ini".to_string());
        assert!(e.to_string().contains("'ini'"));
        assert!(e.to_string().contains("yaml, json, toml"));
    }

    #[test]
    fn scaffold_read_has_source() {
        use std::error::Error as StdError;
        let e = ConfigError::ScaffoldRead {
            path: "/repo/.acorn/scaffold.yaml".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("/repo/.acorn/scaffold.yaml"));
    }

    // -----------------------------------------------------------------------
    // EngineError conversions
    // -----------------------------------------------------------------------

    #[test]
    fn engine_error_from_config_error() {
        let e: EngineError = ConfigError::MissingHome.into();
        assert!(e.to_string().contains("Configuration error"));
    }

    #[test]
    fn engine_error_from_resource_error() {
        let e: EngineError = ResourceError::SourceMissing {
            path: "/dotfiles/gitconfig".to_string(),
        }
        .into();
        assert!(e.to_string().contains("Resource error"));
    }

    #[test]
    fn partial_failure_display() {
        let e = EngineError::PartialFailure {
            operation: "sync".to_string(),
            failed: 1,
            total: 3,
        };
        assert_eq!(e.to_string(), "1 of 3 sync entries failed");
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<EngineError>();
        assert_send_sync::<ConfigError>();
        assert_send_sync::<ResourceError>();
    }

    #[test]
    fn config_error_converts_to_anyhow() {
        let e = ConfigError::DuplicateComponent("x".to_string());
        let _anyhow_err: anyhow::Error = e.into();
    }
}
