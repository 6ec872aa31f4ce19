//! Scaffold inspection commands.
use std::io::Write;

use anyhow::Result;

use super::CommandSetup;
use crate::cli::{GlobalOpts, ScaffoldCommand};
use crate::components::Registry;
use crate::logging::Logger;
use crate::output::Output;

fn write_names(out: &mut dyn Write, names: &[String]) -> std::io::Result<()> {
    for name in names {
        writeln!(out, "{name}")?;
    }
    Ok(())
}

/// Print the resolved shell order or the unmapped components.
///
/// # Errors
///
/// Returns an error if setup fails or stdout cannot be written.
pub fn run(
    global: &GlobalOpts,
    command: ScaffoldCommand,
    registry: &Registry,
    log: &Logger,
) -> Result<()> {
    let setup = CommandSetup::init(global, registry, log)?;
    let names = match command {
        ScaffoldCommand::Order => &setup.resolution.shell_order,
        ScaffoldCommand::Unmapped => &setup.resolution.unmapped,
    };
    Output::new(global.output).emit(names, |out| write_names(out, names))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn names_one_per_line() {
        let mut out = Vec::new();
        write_names(&mut out, &["core".to_string(), "xdg".to_string()]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "core\nxdg\n");
    }

    #[test]
    fn empty_list_prints_nothing() {
        let mut out = Vec::new();
        write_names(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }
}
