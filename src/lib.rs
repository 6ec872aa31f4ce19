//! Shell integration and config synchronization engine.
//!
//! acorn turns a registry of tool components into generated shell scripts
//! and config files, publishes them under one canonical directory, keeps a
//! single sourcing block in the user's shell rc file, and mirrors declared
//! config files into place with symlinks.
//!
//! The crate is organised in layers, leaves first:
//!
//! - **[`config`]**: settings and the scaffold that groups components
//! - **[`components`]**: component descriptors and the registry
//! - **[`resolver`]**: shell load order and the group command tree
//! - **[`generate`]**: rendering scripts and config files
//! - **[`resources`]**: idempotent primitives (publish links, rc block, sync links)
//! - **[`tasks`]**: named units of work wired to resources
//! - **[`commands`]**: top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod components;
pub mod config;
pub mod error;
pub mod generate;
pub mod logging;
pub mod output;
pub mod resolver;
pub mod resources;
pub mod sync;
pub mod tasks;
