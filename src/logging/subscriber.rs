//! Tracing subscriber setup: console formatter, file layer, and initialisation.
use std::fs;
use std::io::Write as _;
use std::sync::Mutex;

use super::utils::{format_utc_datetime, format_utc_time, log_file_path, strip_ansi};

/// Target used for stage headers.
pub(super) const STAGE_TARGET: &str = "acorn::stage";
/// Target used for dry-run action lines.
pub(super) const DRY_RUN_TARGET: &str = "acorn::dry_run";

/// Extracts the `message` field from a [`tracing::Event`].
#[derive(Default)]
struct MessageExtractor {
    message: String,
}

impl tracing::field::Visit for MessageExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

/// A [`tracing_subscriber::Layer`] that appends all events to the persistent
/// log file with timestamps and ANSI codes stripped.
///
/// Always captures events at `DEBUG` level and above regardless of the
/// console verbosity setting.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Open (or create) the log file for `command`, write a run header, and
    /// return a new `FileLayer` ready to receive events.
    ///
    /// Returns `None` if the cache directory cannot be created or the file
    /// cannot be opened.
    pub(super) fn new(command: &str) -> Option<Self> {
        let path = log_file_path(command)?;
        let version =
            option_env!("ACORN_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let header = format!(
            "==========================================\n\
             acorn {version} {command} {}\n\
             ==========================================\n",
            format_utc_datetime(),
        );
        fs::write(&path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(&path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

/// How an event is rendered, by level and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Stage,
    DryRun,
    Error,
    Warn,
    Info,
    Debug,
}

impl LineKind {
    fn of(metadata: &tracing::Metadata<'_>) -> Self {
        match (*metadata.level(), metadata.target()) {
            (tracing::Level::ERROR, _) => Self::Error,
            (tracing::Level::WARN, _) => Self::Warn,
            (tracing::Level::INFO, STAGE_TARGET) => Self::Stage,
            (tracing::Level::INFO, DRY_RUN_TARGET) => Self::DryRun,
            (tracing::Level::INFO, _) => Self::Info,
            _ => Self::Debug,
        }
    }

    /// Plain-text line for the log file.
    fn file_line(self, ts: &str, msg: &str) -> String {
        match self {
            Self::Stage => format!("[{ts}] ==> {msg}"),
            Self::DryRun => format!("[{ts}]     [dry run] {msg}"),
            Self::Error => format!("[{ts}]     [error] {msg}"),
            Self::Warn => format!("[{ts}]     [warn] {msg}"),
            Self::Info => format!("[{ts}]     {msg}"),
            Self::Debug => format!("[{ts}]     [debug] {msg}"),
        }
    }

    /// Colored line for the terminal.
    fn console_line(self, msg: &str) -> String {
        match self {
            Self::Stage => format!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            Self::DryRun => format!("  \x1b[33m[DRY RUN]\x1b[0m {msg}"),
            Self::Error => format!("\x1b[31mERROR\x1b[0m {msg}"),
            Self::Warn => format!("\x1b[33mWARN\x1b[0m  {msg}"),
            Self::Info => format!("  {msg}"),
            Self::Debug => format!("  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

fn message_of(event: &tracing::Event<'_>) -> String {
    let mut extractor = MessageExtractor::default();
    event.record(&mut extractor);
    extractor.message
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let line = LineKind::of(event.metadata())
            .file_line(&format_utc_time(), &strip_ansi(&message_of(event)));
        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// Console formatter: stage headers, dry-run markers, colored levels.
struct AcornFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for AcornFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let line = LineKind::of(event.metadata()).console_line(&message_of(event));
        writeln!(writer, "{line}")
    }
}

/// Console verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Warnings and errors only; stdout is left to structured output.
    Quiet,
    /// Stage headers, info and above.
    Normal,
    /// Everything, including debug.
    Verbose,
}

impl Verbosity {
    /// Pick a verbosity from the CLI flags.  Structured output wins over `-v`.
    #[must_use]
    pub const fn from_flags(verbose: bool, structured_output: bool) -> Self {
        match (verbose, structured_output) {
            (_, true) => Self::Quiet,
            (true, false) => Self::Verbose,
            (false, false) => Self::Normal,
        }
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Sets up a console subscriber that formats events in acorn's output style
/// and a file subscriber that writes all events (including `debug`) to
/// `$XDG_CACHE_HOME/acorn/<command>.log`.  Must be called once at program
/// startup, before any logging.
pub fn init_subscriber(verbosity: Verbosity, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = match verbosity {
        Verbosity::Quiet => LevelFilter::WARN,
        Verbosity::Normal => LevelFilter::INFO,
        Verbosity::Verbose => LevelFilter::DEBUG,
    };

    let make_writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .and(std::io::stdout.with_min_level(tracing::Level::INFO));

    let console_layer = fmt::layer()
        .event_format(AcornFormatter)
        .with_writer(make_writer)
        .with_filter(console_level);

    let file_layer = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
