use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};

use crate::components::Registry;
use crate::config::Overrides;
use crate::config::scaffold::Scaffold;
use crate::output::OutputFormat;

/// Top-level CLI entry point for the acorn engine.
#[derive(Parser, Debug)]
#[command(
    name = "acorn",
    about = "Shell integration and config sync for developer tools",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Result format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Scaffold file to use instead of discovery
    #[arg(long, global = true, value_name = "PATH")]
    pub scaffold: Option<PathBuf>,

    /// Settings file (default: $XDG_CONFIG_HOME/acorn/acorn.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Dotfiles root that relative sync sources resolve against
    #[arg(long, global = true, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Shell rc file to inject into or eject from
    #[arg(long, global = true, value_name = "PATH")]
    pub rc_file: Option<PathBuf>,
}

impl GlobalOpts {
    /// Path overrides for settings resolution.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            config_file: self.config.clone(),
            rc_file: self.rc_file.clone(),
            root: self.root.clone(),
        }
    }

    /// Best-effort read of the global flags before the full command tree
    /// exists.  Anything unparsable falls back to defaults; the real parse
    /// reports it.
    #[must_use]
    pub fn early(args: &[OsString]) -> Self {
        Cli::command()
            .ignore_errors(true)
            .try_get_matches_from(args)
            .ok()
            .and_then(|matches| Self::from_arg_matches(&matches).ok())
            .unwrap_or_default()
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate shell scripts and config files, then publish them
    Generate(GenerateOpts),
    /// Add the sourcing block to the shell rc file
    Inject,
    /// Remove the sourcing block from the shell rc file
    Eject,
    /// Generate, publish and inject
    #[command(visible_alias = "setup")]
    Install,
    /// Eject the sourcing block (generated files are kept)
    #[command(visible_alias = "remove")]
    Uninstall(UninstallOpts),
    /// Show shell integration status
    Status,
    /// List registered components
    #[command(visible_alias = "ls")]
    List,
    /// Link declared config files into place
    Sync(SyncOpts),
    /// Inspect the active scaffold
    #[command(subcommand)]
    Scaffold(ScaffoldCommand),
    /// Print a shell completion script
    Completion(CompletionOpts),
    /// Print version information
    Version,
}

/// Options for the `generate` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct GenerateOpts {
    /// Components to regenerate (default: all, plus the entrypoint)
    #[arg(value_name = "COMPONENT")]
    pub components: Vec<String>,
}

/// Options for the `uninstall` subcommand.
#[derive(Parser, Debug, Clone, Copy)]
pub struct UninstallOpts {
    /// Also remove the published links that point into the generated dir
    #[arg(long)]
    pub unpublish: bool,
}

/// Options for the `sync` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct SyncOpts {
    /// Report drift without changing anything; fails when any file drifted
    #[arg(long)]
    pub check: bool,
}

/// `scaffold` subcommands.
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ScaffoldCommand {
    /// Print the resolved shell load order
    Order,
    /// Print registered components that no group lists
    Unmapped,
}

/// Options for the `completion` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct CompletionOpts {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// The full command tree: built-in commands plus one subcommand per
/// scaffold group.
#[must_use]
pub fn command(scaffold: &Scaffold, registry: &Registry) -> clap::Command {
    crate::resolver::command_tree(Cli::command(), scaffold, registry)
}

/// A parsed invocation.
#[derive(Debug)]
pub enum Invocation {
    /// One of the built-in commands.
    Builtin(Cli),
    /// `acorn <group> <component> [...]`.
    Component {
        /// Global flags.
        global: GlobalOpts,
        /// `--verbose`.
        verbose: bool,
        /// Group name as declared in the scaffold.
        group: String,
        /// Component name.
        component: String,
        /// Wrapper subcommand, if one was given.
        action: Option<String>,
    },
}

impl Invocation {
    /// Interpret matches produced by [`command`].
    ///
    /// # Errors
    ///
    /// Returns a clap error if the matches do not fit the built-in commands.
    pub fn from_matches(matches: &ArgMatches, scaffold: &Scaffold) -> Result<Self, clap::Error> {
        if let Some((name, group_matches)) = matches.subcommand()
            && scaffold.groups.contains_key(name)
            && let Some((component, component_matches)) = group_matches.subcommand()
        {
            return Ok(Self::Component {
                global: GlobalOpts::from_arg_matches(matches)?,
                verbose: matches.get_flag("verbose"),
                group: name.to_string(),
                component: component.to_string(),
                action: component_matches.subcommand_name().map(String::from),
            });
        }
        Ok(Self::Builtin(Cli::from_arg_matches(matches)?))
    }

    /// Global flags.
    #[must_use]
    pub const fn global(&self) -> &GlobalOpts {
        match self {
            Self::Builtin(cli) => &cli.global,
            Self::Component { global, .. } => global,
        }
    }

    /// Whether `--verbose` was given.
    #[must_use]
    pub const fn verbose(&self) -> bool {
        match self {
            Self::Builtin(cli) => cli.verbose,
            Self::Component { verbose, .. } => *verbose,
        }
    }

    /// Name used for the log file.
    #[must_use]
    pub fn log_name(&self) -> &str {
        match self {
            Self::Builtin(cli) => match &cli.command {
                Command::Generate(_) => "generate",
                Command::Inject => "inject",
                Command::Eject => "eject",
                Command::Install => "install",
                Command::Uninstall(_) => "uninstall",
                Command::Status => "status",
                Command::List => "list",
                Command::Sync(_) => "sync",
                Command::Scaffold(_) => "scaffold",
                Command::Completion(_) => "completion",
                Command::Version => "version",
            },
            Self::Component { component, .. } => component,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Invocation {
        let scaffold = Scaffold::embedded().unwrap();
        let registry = Registry::builtin().unwrap();
        let matches = command(&scaffold, &registry)
            .try_get_matches_from(args)
            .unwrap();
        Invocation::from_matches(&matches, &scaffold).unwrap()
    }

    fn builtin(args: &[&str]) -> Cli {
        match parse(args) {
            Invocation::Builtin(cli) => cli,
            Invocation::Component { .. } => unreachable!("expected a built-in command"),
        }
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verify_full_tree() {
        command(&Scaffold::embedded().unwrap(), &Registry::builtin().unwrap()).debug_assert();
    }

    #[test]
    fn parse_generate_components() {
        let cli = builtin(&["acorn", "generate", "git", "docker"]);
        assert!(matches!(
            &cli.command,
            Command::Generate(opts) if opts.components == ["git", "docker"]
        ));
    }

    #[test]
    fn parse_dry_run_short() {
        let cli = builtin(&["acorn", "-d", "install"]);
        assert!(cli.global.dry_run);
        assert!(matches!(cli.command, Command::Install));
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = builtin(&["acorn", "inject", "--rc-file", "/tmp/rc", "-o", "json"]);
        assert_eq!(cli.global.rc_file, Some(PathBuf::from("/tmp/rc")));
        assert_eq!(cli.global.output, OutputFormat::Json);
    }

    #[test]
    fn parse_sync_check() {
        let cli = builtin(&["acorn", "sync", "--check"]);
        assert!(matches!(cli.command, Command::Sync(SyncOpts { check: true })));
    }

    #[test]
    fn parse_uninstall_unpublish() {
        let cli = builtin(&["acorn", "uninstall"]);
        assert!(matches!(
            cli.command,
            Command::Uninstall(UninstallOpts { unpublish: false })
        ));
        let cli = builtin(&["acorn", "remove", "--unpublish"]);
        assert!(matches!(
            cli.command,
            Command::Uninstall(UninstallOpts { unpublish: true })
        ));
    }

    #[test]
    fn parse_scaffold_order() {
        let cli = builtin(&["acorn", "scaffold", "order"]);
        assert!(matches!(cli.command, Command::Scaffold(ScaffoldCommand::Order)));
    }

    #[test]
    fn parse_completion_shell() {
        let cli = builtin(&["acorn", "completion", "zsh"]);
        assert!(matches!(
            cli.command,
            Command::Completion(CompletionOpts {
                shell: clap_complete::Shell::Zsh
            })
        ));
    }

    #[test]
    fn parse_install_alias() {
        let cli = builtin(&["acorn", "setup"]);
        assert!(matches!(cli.command, Command::Install));
        assert_eq!(parse(&["acorn", "setup"]).log_name(), "install");
    }

    #[test]
    fn parse_group_component() {
        let invocation = parse(&["acorn", "-v", "ops", "docker", "ps"]);
        let Invocation::Component {
            group,
            component,
            action,
            verbose,
            ..
        } = invocation
        else {
            unreachable!("expected a component invocation");
        };
        assert_eq!(group, "devops");
        assert_eq!(component, "docker");
        assert_eq!(action.as_deref(), Some("ps"));
        assert!(verbose);
    }

    #[test]
    fn early_reads_scaffold_before_full_tree() {
        let args: Vec<OsString> = ["acorn", "--scaffold", "/s.yaml", "status"]
            .iter()
            .map(OsString::from)
            .collect();
        let global = GlobalOpts::early(&args);
        assert_eq!(global.scaffold, Some(PathBuf::from("/s.yaml")));
    }

    #[test]
    fn output_defaults_to_text() {
        let cli = builtin(&["acorn", "status"]);
        assert_eq!(cli.global.output, OutputFormat::Text);
    }
}
