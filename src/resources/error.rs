//! Typed error variants for resource operations.
//!
//! This module provides [`ResourceError`], a structured error type for
//! publish, rc-file and sync operations. These failures are reported per
//! artifact or per entry and never abort processing of the others.

use thiserror::Error;

/// Errors that arise from resource checks and apply operations.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// A path is occupied by something this engine does not own.
    #[error("conflict at {target}: {reason}")]
    Conflict {
        /// Occupied path.
        target: String,
        /// What occupies it.
        reason: String,
    },

    /// A filesystem call failed.
    #[error("{action} {path}: {source}")]
    Io {
        /// Short verb phrase (e.g. `"write"`, `"create symlink"`).
        action: String,
        /// Path the call was made on.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A sync source does not exist.
    #[error("source not found: {path}")]
    SourceMissing {
        /// Missing source path.
        path: String,
    },

    /// The backup path for a displaced file is already taken.
    #[error("backup path already exists: {path}")]
    BackupExists {
        /// Occupied backup path.
        path: String,
    },

    /// A JSON file in a merge pair is malformed or not an object.
    #[error("invalid JSON in {path}: {message}")]
    InvalidJson {
        /// File that failed to parse.
        path: String,
        /// Parser message.
        message: String,
    },

    /// A structured config payload could not be serialized.
    #[error("failed to encode {format} config for '{component}': {message}")]
    Encode {
        /// Component name.
        component: String,
        /// Target format.
        format: String,
        /// Serializer message.
        message: String,
    },
}

impl ResourceError {
    /// Wrap an I/O error with the action and path it occurred on.
    pub fn io(action: &str, path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            action: action.to_string(),
            path: path.display().to_string(),
            source,
        }
    }
}
