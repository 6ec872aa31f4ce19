//! The component set compiled into the binary.
//!
//! Each component contributes shell fragments, an optional structured config
//! and optional sync pairs, plus a clap command for its tool wrapper.  The
//! wrappers' behaviour lives outside this crate; only their command shape is
//! registered here so the group-based command tree can be built.
use clap::{Arg, Command};
use serde_json::json;

use super::codec::ConfigFormat;
use super::descriptor::{ComponentDescriptor, MergeOptions, Platform, Wrapper};
use super::registry::{CommandBuilder, Registry};
use crate::error::ConfigError;

impl Registry {
    /// Build the registry of built-in components.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a built-in descriptor is invalid or two
    /// built-ins share a name.  Either is a programming error and aborts
    /// startup.
    pub fn builtin() -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        let table: [(fn() -> Result<ComponentDescriptor, ConfigError>, CommandBuilder); 14] = [
            (core, core_command),
            (xdg, xdg_command),
            (git, git_command),
            (docker, docker_command),
            (kubernetes, kubernetes_command),
            (helm, helm_command),
            (k9s, k9s_command),
            (fzf, fzf_command),
            (tmux, tmux_command),
            (starship, starship_command),
            (python, python_command),
            (golang, golang_command),
            (neovim, neovim_command),
            (claude, claude_command),
        ];
        for (descriptor, command) in table {
            registry.register(descriptor()?, command)?;
        }
        Ok(registry)
    }
}

fn wrapper(name: &'static str, about: &'static str) -> Command {
    Command::new(name).about(about)
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

fn core() -> Result<ComponentDescriptor, ConfigError> {
    ComponentDescriptor::builder("core")
        .description("Core shell environment")
        .env("EDITOR", "nvim")
        .env("PAGER", "less")
        .env("LESS", "-FRX")
        .path("$HOME/.local/bin")
        .path_on(Platform::Macos, "/opt/homebrew/bin")
        .alias("ll", "ls -lah")
        .alias("..", "cd ..")
        .function("mkcd", "mkdir -p \"$1\" && cd \"$1\"")
        .build()
}

fn core_command() -> Command {
    wrapper("core", "Core environment helpers")
        .subcommand(Command::new("info").about("Show environment summary"))
}

fn xdg() -> Result<ComponentDescriptor, ConfigError> {
    ComponentDescriptor::builder("xdg")
        .description("XDG base directories")
        .env("XDG_CONFIG_HOME", "$HOME/.config")
        .env("XDG_CACHE_HOME", "$HOME/.cache")
        .env("XDG_DATA_HOME", "$HOME/.local/share")
        .env("XDG_STATE_HOME", "$HOME/.local/state")
        .build()
}

fn xdg_command() -> Command {
    wrapper("xdg", "XDG directory helpers")
        .subcommand(Command::new("paths").about("Print resolved XDG directories"))
}

// ---------------------------------------------------------------------------
// Version control
// ---------------------------------------------------------------------------

fn git() -> Result<ComponentDescriptor, ConfigError> {
    ComponentDescriptor::builder("git")
        .description("Git aliases and helpers")
        .alias("g", "git")
        .alias("ga", "git add")
        .alias("gc", "git commit")
        .alias("gd", "git diff")
        .alias("gl", "git log --oneline --graph --decorate")
        .alias("gp", "git push")
        .alias("gs", "git status -sb")
        .function(
            "groot",
            "cd \"$(git rev-parse --show-toplevel 2>/dev/null || pwd)\"",
        )
        .function(
            "gclean",
            "git fetch --prune\ngit branch --merged | grep -v '\\*' | xargs -r git branch -d",
        )
        .build()
}

fn git_command() -> Command {
    wrapper("git", "Git repository helpers")
        .subcommand(Command::new("status").about("Summarize repository status"))
        .subcommand(Command::new("clean").about("Delete merged branches"))
}

// ---------------------------------------------------------------------------
// DevOps
// ---------------------------------------------------------------------------

fn docker() -> Result<ComponentDescriptor, ConfigError> {
    ComponentDescriptor::builder("docker")
        .description("Docker aliases and helpers")
        .env("DOCKER_BUILDKIT", "1")
        .env("COMPOSE_DOCKER_CLI_BUILD", "1")
        .alias("d", "docker")
        .alias("dc", "docker compose")
        .alias("dps", "docker ps --format 'table {{.Names}}\\t{{.Status}}\\t{{.Ports}}'")
        .function("dsh", "docker exec -it \"$1\" sh")
        .function("dclean", "docker system prune -f\ndocker volume prune -f")
        .build()
}

fn docker_command() -> Command {
    wrapper("docker", "Docker helpers")
        .subcommand(Command::new("ps").about("List containers"))
        .subcommand(Command::new("clean").about("Remove stopped containers and dangling images"))
}

fn kubernetes() -> Result<ComponentDescriptor, ConfigError> {
    ComponentDescriptor::builder("kubernetes")
        .description("kubectl aliases and context helpers")
        .env("KUBECONFIG", "$HOME/.kube/config")
        .alias("k", "kubectl")
        .alias("kctx", "kubectl config use-context")
        .alias("kgp", "kubectl get pods")
        .alias("kns", "kubectl config set-context --current --namespace")
        .function("klogs", "kubectl logs -f \"$@\"")
        .build()
}

fn kubernetes_command() -> Command {
    wrapper("kubernetes", "Kubernetes helpers")
        .visible_alias("k8s")
        .subcommand(Command::new("contexts").about("List kubeconfig contexts"))
        .subcommand(
            Command::new("use")
                .about("Switch context")
                .arg(Arg::new("context").required(true)),
        )
}

fn helm() -> Result<ComponentDescriptor, ConfigError> {
    ComponentDescriptor::builder("helm")
        .description("Helm aliases")
        .alias("h", "helm")
        .alias("hls", "helm list -A")
        .alias("hup", "helm repo update")
        .build()
}

fn helm_command() -> Command {
    wrapper("helm", "Helm helpers").subcommand(Command::new("list").about("List releases"))
}

fn k9s() -> Result<ComponentDescriptor, ConfigError> {
    ComponentDescriptor::builder("k9s")
        .description("k9s terminal UI configuration")
        .env("K9S_CONFIG_DIR", "$XDG_CONFIG_HOME/k9s")
        .config(
            ConfigFormat::Yaml,
            json!({
                "k9s": {
                    "liveViewAutoRefresh": true,
                    "refreshRate": 2,
                    "ui": {
                        "enableMouse": false,
                        "headless": false,
                        "logoless": true,
                        "skin": "dracula"
                    }
                }
            }),
        )
        .build()
}

fn k9s_command() -> Command {
    wrapper("k9s", "k9s helpers").subcommand(Command::new("config").about("Show k9s config path"))
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

fn fzf() -> Result<ComponentDescriptor, ConfigError> {
    ComponentDescriptor::builder("fzf")
        .description("fzf defaults and key bindings")
        .env("FZF_DEFAULT_COMMAND", "fd --type f --hidden --exclude .git")
        .env("FZF_DEFAULT_OPTS", "--height 40% --layout=reverse --border")
        .function("fcd", "cd \"$(fd --type d | fzf)\" || return")
        .function(
            "__fzf_init",
            "if [ -n \"$ZSH_VERSION\" ]; then\n    eval \"$(fzf --zsh 2>/dev/null)\"\nelif [ -n \"$BASH_VERSION\" ]; then\n    eval \"$(fzf --bash 2>/dev/null)\"\nfi",
        )
        .build()
}

fn fzf_command() -> Command {
    wrapper("fzf", "fzf helpers").subcommand(Command::new("preview").about("Preview a file"))
}

fn tmux() -> Result<ComponentDescriptor, ConfigError> {
    ComponentDescriptor::builder("tmux")
        .description("tmux session helpers")
        .alias("ta", "tmux attach -t")
        .alias("tls", "tmux list-sessions")
        .function(
            "tn",
            "tmux new-session -A -s \"${1:-$(basename \"$PWD\")}\"",
        )
        .sync("tmux/tmux.conf", "~/.config/tmux/tmux.conf")
        .build()
}

fn tmux_command() -> Command {
    wrapper("tmux", "tmux helpers").subcommand(Command::new("sessions").about("List sessions"))
}

fn starship() -> Result<ComponentDescriptor, ConfigError> {
    ComponentDescriptor::builder("starship")
        .description("starship prompt")
        .env("STARSHIP_CONFIG", "$HOME/.config/acorn/starship.toml")
        .function(
            "__starship_init",
            "if [ -n \"$ZSH_VERSION\" ]; then\n    eval \"$(starship init zsh)\"\nelif [ -n \"$BASH_VERSION\" ]; then\n    eval \"$(starship init bash)\"\nfi",
        )
        .config(
            ConfigFormat::Toml,
            json!({
                "add_newline": false,
                "character": {
                    "error_symbol": "[✗](bold red)",
                    "success_symbol": "[➜](bold green)"
                },
                "git_branch": { "symbol": " " },
                "kubernetes": { "disabled": false }
            }),
        )
        .build()
}

fn starship_command() -> Command {
    wrapper("starship", "starship helpers")
        .subcommand(Command::new("explain").about("Explain the current prompt"))
}

// ---------------------------------------------------------------------------
// Programming
// ---------------------------------------------------------------------------

fn python() -> Result<ComponentDescriptor, ConfigError> {
    ComponentDescriptor::builder("python")
        .description("Python tooling")
        .env("PYTHONDONTWRITEBYTECODE", "1")
        .env("PIP_REQUIRE_VIRTUALENV", "true")
        .alias("py", "python3")
        .function(
            "venv",
            "python3 -m venv \"${1:-.venv}\" && . \"${1:-.venv}/bin/activate\"",
        )
        .build()
}

fn python_command() -> Command {
    wrapper("python", "Python helpers")
        .visible_alias("py")
        .subcommand(Command::new("venv").about("Create a virtual environment"))
}

fn golang() -> Result<ComponentDescriptor, ConfigError> {
    ComponentDescriptor::builder("go")
        .description("Go toolchain")
        .env("GOPATH", "$HOME/go")
        .path("$HOME/go/bin")
        .path("/usr/local/go/bin")
        .alias("gob", "go build ./...")
        .alias("got", "go test ./...")
        .wrapper(
            Wrapper::new("gonew", "go mod init")
                .usage("gonew <module>")
                .then_cd(),
        )
        .build()
}

fn golang_command() -> Command {
    wrapper("go", "Go helpers").subcommand(Command::new("env").about("Show Go environment"))
}

// ---------------------------------------------------------------------------
// IDE / AI
// ---------------------------------------------------------------------------

fn neovim() -> Result<ComponentDescriptor, ConfigError> {
    ComponentDescriptor::builder("neovim")
        .description("Neovim editor")
        .alias("v", "nvim")
        .alias("vim", "nvim")
        .sync("nvim/init.lua", "~/.config/nvim/init.lua")
        .build()
}

fn neovim_command() -> Command {
    wrapper("neovim", "Neovim helpers")
        .visible_alias("nvim")
        .subcommand(Command::new("health").about("Run checkhealth"))
}

fn claude() -> Result<ComponentDescriptor, ConfigError> {
    ComponentDescriptor::builder("claude")
        .description("Claude CLI settings")
        .alias("cc", "claude")
        .config(
            ConfigFormat::Json,
            json!({
                "includeCoAuthoredBy": false,
                "permissions": {
                    "allow": ["Bash(git status)", "Bash(git diff:*)"],
                    "deny": []
                }
            }),
        )
        .sync_merge(
            "claude/settings.json",
            "~/.claude/settings.json",
            MergeOptions {
                preserve_user_keys: vec!["permissions".to_string()],
                ..MergeOptions::default()
            },
        )
        .sync("claude/CLAUDE.md", "~/.claude/CLAUDE.md")
        .build()
}

fn claude_command() -> Command {
    wrapper("claude", "Claude CLI helpers")
        .subcommand(Command::new("stats").about("Show usage statistics"))
}
