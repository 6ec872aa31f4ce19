//! Runtime settings and scaffold loading.
//!
//! Settings are layered, lowest precedence first:
//!
//! 1. built-in defaults (XDG directories, `$SHELL` detection)
//! 2. the TOML settings file (`$XDG_CONFIG_HOME/acorn/acorn.toml` or `--config`)
//! 3. environment variables (`ACORN_GENERATED_DIR`, `ACORN_LINK_DIR`,
//!    `ACORN_RC_FILE`, `ACORN_ROOT`)
//! 4. command-line flags
pub mod scaffold;
pub mod toml_loader;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Shell flavour the rc file and completions are generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shell {
    /// GNU bash.
    Bash,
    /// Z shell.
    Zsh,
}

impl Shell {
    /// Detect from a `$SHELL` value: anything mentioning `zsh` is zsh.
    #[must_use]
    pub fn detect(shell_var: Option<&str>) -> Self {
        match shell_var {
            Some(s) if s.contains("zsh") => Self::Zsh,
            _ => Self::Bash,
        }
    }

    /// Default rc file name under `$HOME`.
    #[must_use]
    pub const fn rc_file_name(self) -> &'static str {
        match self {
            Self::Bash => ".bashrc",
            Self::Zsh => ".zshrc",
        }
    }

    /// Name passed to `acorn completion`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bash => "bash",
            Self::Zsh => "zsh",
        }
    }
}

impl std::fmt::Display for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contents of `acorn.toml`.  Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    /// Directory generated artifacts are written to.
    pub generated_dir: Option<String>,
    /// Directory published symlinks are created in.
    pub link_dir: Option<String>,
    /// Shell startup file the sourcing block is injected into.
    pub rc_file: Option<String>,
    /// Dotfiles root that relative sync sources resolve against.
    pub root: Option<String>,
    /// Shell flavour; overrides `$SHELL` detection.
    pub shell: Option<Shell>,
}

/// Values supplied on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    /// `--config`
    pub config_file: Option<PathBuf>,
    /// `--rc-file`
    pub rc_file: Option<PathBuf>,
    /// `--root`
    pub root: Option<PathBuf>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// User home directory.
    pub home: PathBuf,
    /// Dotfiles root; relative sync sources resolve against it.
    pub root: PathBuf,
    /// Directory generated artifacts are written to.
    pub generated_dir: PathBuf,
    /// Directory published symlinks are created in.
    pub link_dir: PathBuf,
    /// Shell startup file.
    pub rc_file: PathBuf,
    /// Shell flavour.
    pub shell: Shell,
    /// Settings file that was consulted (it may not exist).
    pub config_file: PathBuf,
    /// Value of `$ACORN_DIR`, consulted during scaffold discovery.
    #[serde(skip)]
    pub acorn_dir: Option<PathBuf>,
}

impl Settings {
    /// Resolve settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `HOME` is unset or the settings file is
    /// invalid.
    pub fn from_env(overrides: &Overrides) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::resolve(overrides, &cwd, |key| std::env::var(key).ok())
    }

    /// Resolve settings with an explicit environment lookup.
    ///
    /// `cwd` is the default dotfiles root.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingHome`] if `HOME` is not set, or
    /// [`ConfigError::SettingsParse`] if the settings file is invalid.
    pub fn resolve(
        overrides: &Overrides,
        cwd: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let home = env("HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingHome)?;
        let config_home = env("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map_or_else(|| home.join(".config"), PathBuf::from);
        let acorn_config = config_home.join("acorn");

        let config_file = overrides
            .config_file
            .clone()
            .unwrap_or_else(|| acorn_config.join("acorn.toml"));
        let file: FileSettings = toml_loader::load_config(&config_file)?;

        let expand = |raw: &str| expand_path(raw, &home, &env);
        let pick = |env_key: &str, from_file: Option<&String>| -> Option<PathBuf> {
            env(env_key)
                .filter(|v| !v.is_empty())
                .map(|v| expand(v.as_str()))
                .or_else(|| from_file.map(|v| expand(v.as_str())))
        };

        let shell = file
            .shell
            .unwrap_or_else(|| Shell::detect(env("SHELL").as_deref()));

        let generated_dir = pick("ACORN_GENERATED_DIR", file.generated_dir.as_ref())
            .unwrap_or_else(|| acorn_config.join("generated"));
        let link_dir =
            pick("ACORN_LINK_DIR", file.link_dir.as_ref()).unwrap_or_else(|| acorn_config.clone());
        let rc_file = overrides
            .rc_file
            .clone()
            .or_else(|| pick("ACORN_RC_FILE", file.rc_file.as_ref()))
            .unwrap_or_else(|| home.join(shell.rc_file_name()));
        let root = overrides
            .root
            .clone()
            .or_else(|| pick("ACORN_ROOT", file.root.as_ref()))
            .unwrap_or_else(|| cwd.to_path_buf());
        let acorn_dir = env("ACORN_DIR")
            .filter(|v| !v.is_empty())
            .map(|v| expand(v.as_str()));

        Ok(Self {
            home,
            root,
            generated_dir,
            link_dir,
            rc_file,
            shell,
            config_file,
            acorn_dir,
        })
    }

    /// Path of the generated entrypoint script.
    #[must_use]
    pub fn entrypoint(&self) -> PathBuf {
        self.generated_dir.join(format!(
            "{}.sh",
            crate::components::ENTRYPOINT_STEM
        ))
    }

    /// Path the entrypoint is published at; this is what the rc file sources.
    #[must_use]
    pub fn published_entrypoint(&self) -> PathBuf {
        self.link_dir.join(format!(
            "{}.sh",
            crate::components::ENTRYPOINT_STEM
        ))
    }
}

/// Expand a leading `~` and `$VAR`, `${VAR}` or `${VAR:-default}` references.
///
/// Unset variables expand to the empty string (or the default, if given).
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use acorn_cli::config::expand_path;
///
/// let env = |k: &str| (k == "XDG_CONFIG_HOME").then(|| "/cfg".to_string());
/// let home = Path::new("/home/u");
/// assert_eq!(expand_path("~/.claude", home, &env), PathBuf::from("/home/u/.claude"));
/// assert_eq!(expand_path("$XDG_CONFIG_HOME/nvim", home, &env), PathBuf::from("/cfg/nvim"));
/// assert_eq!(expand_path("${STATE:-/state}/x", home, &env), PathBuf::from("/state/x"));
/// ```
pub fn expand_path(raw: &str, home: &Path, env: &impl Fn(&str) -> Option<String>) -> PathBuf {
    let (prefix, rest) = if raw == "~" {
        (Some(home), "")
    } else if let Some(rest) = raw.strip_prefix("~/") {
        (Some(home), rest)
    } else {
        (None, raw)
    };

    let expanded = expand_vars(rest, env);
    match prefix {
        Some(home) if expanded.is_empty() => home.to_path_buf(),
        Some(home) => home.join(expanded),
        None => PathBuf::from(expanded),
    }
}

fn expand_vars(input: &str, env: &impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('$') {
        out.push_str(rest.get(..pos).unwrap_or_default());
        let after = rest.get(pos + 1..).unwrap_or_default();

        if let Some(braced) = after.strip_prefix('{')
            && let Some(end) = braced.find('}')
        {
            let inner = braced.get(..end).unwrap_or_default();
            let (name, default) = inner
                .split_once(":-")
                .map_or((inner, None), |(n, d)| (n, Some(d)));
            match (env(name).filter(|v| !v.is_empty()), default) {
                (Some(value), _) => out.push_str(&value),
                (None, Some(default)) => out.push_str(default),
                (None, None) => {}
            }
            rest = braced.get(end + 1..).unwrap_or_default();
            continue;
        }

        let name_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        if name_len == 0 {
            out.push('$');
            rest = after;
            continue;
        }
        let name = after.get(..name_len).unwrap_or_default();
        if let Some(value) = env(name) {
            out.push_str(&value);
        }
        rest = after.get(name_len..).unwrap_or_default();
    }
    out.push_str(rest);
    out
}
