//! `acorn <group> <component> [action]`.
//!
//! Tool wrappers live outside this crate; only their command shapes are
//! registered.  Without an action the component's contribution is shown.
use std::io::Write;

use anyhow::{Result, bail};
use serde::Serialize;

use crate::cli::GlobalOpts;
use crate::components::{ComponentDescriptor, Registry};
use crate::output::Output;

/// What `acorn <group> <component>` prints.
#[derive(Debug, Serialize)]
pub struct ComponentDetails<'a> {
    /// Group the component was reached through.
    pub group: &'a str,
    /// Everything the component contributes.
    #[serde(flatten)]
    pub descriptor: &'a ComponentDescriptor,
}

fn write_details(out: &mut dyn Write, details: &ComponentDetails<'_>) -> std::io::Result<()> {
    let d = details.descriptor;
    writeln!(out, "{} ({})", d.name(), details.group)?;
    if !d.description().is_empty() {
        writeln!(out, "  {}", d.description())?;
    }
    for (name, value) in d.env_vars() {
        writeln!(out, "  env      {name}={value}")?;
    }
    for entry in d.paths() {
        match entry.only_on {
            Some(platform) => writeln!(out, "  path     {} ({platform})", entry.dir)?,
            None => writeln!(out, "  path     {}", entry.dir)?,
        }
    }
    for (name, command) in d.aliases() {
        writeln!(out, "  alias    {name} -> {command}")?;
    }
    for wrapper in d.wrappers() {
        writeln!(out, "  wrapper  {} -> {}", wrapper.name, wrapper.command)?;
    }
    for function in d.functions() {
        writeln!(out, "  function {}", function.name)?;
    }
    if let Some(config) = d.config() {
        writeln!(out, "  config   {}.{}", d.name(), config.format)?;
    }
    for file in d.sync_files() {
        writeln!(
            out,
            "  sync     {} -> {} ({})",
            file.source.display(),
            file.target,
            file.mode
        )?;
    }
    Ok(())
}

/// Run a component invocation.
///
/// # Errors
///
/// Returns an error if the component is unknown, an action was requested,
/// or stdout cannot be written.
pub fn run(
    global: &GlobalOpts,
    group: &str,
    component: &str,
    action: Option<&str>,
    registry: &Registry,
) -> Result<()> {
    let registration = registry.require(component)?;
    if let Some(action) = action {
        bail!("`{component} {action}` is provided by the {component} tool wrapper, which is not part of this build");
    }
    let details = ComponentDetails {
        group,
        descriptor: &registration.descriptor,
    };
    Output::new(global.output).emit(&details, |out| write_details(out, &details))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::components::{ConfigFormat, Platform, Wrapper};

    #[test]
    fn details_text() {
        let descriptor = ComponentDescriptor::builder("k9s")
            .description("Kubernetes TUI")
            .env("K9S_CONFIG_DIR", "$HOME/.config/k9s")
            .path_on(Platform::Macos, "/opt/homebrew/bin")
            .alias("k9", "k9s")
            .wrapper(Wrapper::new("k9n", "k9s -n").requires_arg())
            .function("k9ctx", "k9s --context \"$1\"")
            .config(ConfigFormat::Yaml, serde_json::json!({"k9s": {}}))
            .sync_copy("k9s/skins", "~/.config/k9s/skins")
            .build()
            .unwrap();
        let details = ComponentDetails {
            group: "kube",
            descriptor: &descriptor,
        };

        let mut out = Vec::new();
        write_details(&mut out, &details).unwrap();

        insta::assert_snapshot!(String::from_utf8(out).unwrap(), @r"
        k9s (kube)
          Kubernetes TUI
          env      K9S_CONFIG_DIR=$HOME/.config/k9s
          path     /opt/homebrew/bin (macos)
          alias    k9 -> k9s
          wrapper  k9n -> k9s -n
          function k9ctx
          config   k9s.yaml
          sync     k9s/skins -> ~/.config/k9s/skins (copy)
        ");
    }

    #[test]
    fn action_is_refused() {
        let registry = Registry::builtin().unwrap();
        let err = run(
            &GlobalOpts::default(),
            "devops",
            "docker",
            Some("ps"),
            &registry,
        )
        .unwrap_err();
        assert!(err.to_string().contains("`docker ps`"));
    }

    #[test]
    fn unknown_component_fails() {
        let registry = Registry::new();
        assert!(run(&GlobalOpts::default(), "g", "ghost", None, &registry).is_err());
    }

    #[test]
    fn structured_details_flatten_descriptor() {
        let descriptor = ComponentDescriptor::builder("git").build().unwrap();
        let details = ComponentDetails {
            group: "vcs",
            descriptor: &descriptor,
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["group"], "vcs");
        assert_eq!(json["name"], "git");
    }
}
