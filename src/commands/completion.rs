//! Shell completion script generation.
use std::io::Write;

use anyhow::{Context as _, Result};

use crate::cli::{self, CompletionOpts};
use crate::components::Registry;
use crate::config::scaffold::Scaffold;

/// Write the completion script for `shell` over the full command tree,
/// scaffold groups included.
pub fn write(
    shell: clap_complete::Shell,
    scaffold: &Scaffold,
    registry: &Registry,
    out: &mut dyn Write,
) {
    let mut command = cli::command(scaffold, registry);
    clap_complete::generate(shell, &mut command, "acorn", out);
}

/// Run the completion command.
///
/// # Errors
///
/// Returns an error if stdout cannot be flushed.
pub fn run(opts: &CompletionOpts, scaffold: &Scaffold, registry: &Registry) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write(opts.shell, scaffold, registry, &mut out);
    out.flush().context("write completion script")
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn script(shell: clap_complete::Shell) -> String {
        let mut out = Vec::new();
        write(
            shell,
            &Scaffold::embedded().unwrap(),
            &Registry::builtin().unwrap(),
            &mut out,
        );
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn zsh_script_names_the_binary() {
        let script = script(clap_complete::Shell::Zsh);
        assert!(script.starts_with("#compdef acorn"));
    }

    #[test]
    fn bash_script_includes_scaffold_groups() {
        let script = script(clap_complete::Shell::Bash);
        assert!(script.contains("devops"));
        assert!(script.contains("install"));
    }
}
