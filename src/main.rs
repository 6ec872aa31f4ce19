use std::ffi::OsString;
use std::sync::Arc;

use anyhow::Result;

use acorn_cli::cli::{self, Command, GlobalOpts, Invocation};
use acorn_cli::commands;
use acorn_cli::components::Registry;
use acorn_cli::config::Settings;
use acorn_cli::logging::{self, Logger, Verbosity};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let registry = Arc::new(Registry::builtin()?);

    // Group subcommands come from the scaffold, so it is located before the
    // real parse.
    let args: Vec<OsString> = std::env::args_os().collect();
    let early = GlobalOpts::early(&args);
    let settings = Settings::from_env(&early.overrides()).ok();
    let (scaffold, _) = commands::discover_scaffold(&early, settings.as_ref())?;
    let matches = cli::command(&scaffold, &registry).get_matches_from(&args);
    let invocation = Invocation::from_matches(&matches, &scaffold).unwrap_or_else(|e| e.exit());

    let global = invocation.global();
    let structured = global.output.is_structured();
    logging::init_subscriber(
        Verbosity::from_flags(invocation.verbose(), structured),
        invocation.log_name(),
    );
    let log = Arc::new(Logger::new(invocation.log_name()).quiet(structured));

    match &invocation {
        Invocation::Component {
            group,
            component,
            action,
            ..
        } => commands::component::run(global, group, component, action.as_deref(), &registry),
        Invocation::Builtin(cli) => match &cli.command {
            Command::Generate(opts) => commands::generate::run(global, opts, &registry, &log),
            Command::Inject => commands::rc::inject(global, &registry, &log),
            Command::Eject => commands::rc::eject(global, &registry, &log),
            Command::Install => commands::install::run(global, &registry, &log),
            Command::Uninstall(opts) => {
                commands::uninstall::run(global, *opts, &registry, &log)
            }
            Command::Status => commands::status::run(global, &registry, &log),
            Command::List => commands::list::run(global, &registry, &log),
            Command::Sync(opts) => commands::sync::run(global, opts, &registry, &log),
            Command::Scaffold(command) => {
                commands::scaffold::run(global, *command, &registry, &log)
            }
            Command::Completion(opts) => commands::completion::run(opts, &scaffold, &registry),
            Command::Version => commands::version::run(),
        },
    }
}
