//! Pure rendering of component scripts, configs and the entrypoint.
use std::fmt::Write as _;
use std::path::Path;

use crate::components::{
    CodecTable, ComponentDescriptor, ConfigSpec, Platform, PostAction, Wrapper,
};
use crate::config::Shell;
use crate::error::ResourceError;

const GENERATED_NOTICE: &str = "# Generated by acorn - do not edit manually";

/// Render a component's shell script for `platform`.
///
/// Environment variables and aliases are emitted sorted by name; `PATH`
/// additions, wrappers and functions keep their declared order.  `PATH`
/// entries restricted to another platform are left out.  Functions whose
/// name starts with `__` are called once after every function is defined.
#[must_use]
pub fn render_script(descriptor: &ComponentDescriptor, platform: Option<Platform>) -> String {
    let mut out = String::new();
    out.push_str("#!/bin/sh\n");
    let _ = writeln!(out, "# acorn shell integration: {}", descriptor.name());
    if !descriptor.description().is_empty() {
        let _ = writeln!(out, "# {}", descriptor.description());
    }
    out.push_str(GENERATED_NOTICE);
    out.push('\n');

    if !descriptor.env_vars().is_empty() {
        out.push_str("\n# Environment\n");
        for (name, value) in descriptor.env_vars() {
            let _ = writeln!(out, "export {name}=\"{}\"", double_quote_escape(value));
        }
    }

    let paths: Vec<&str> = descriptor
        .paths()
        .iter()
        .filter(|entry| entry.applies_to(platform))
        .map(|entry| entry.dir.as_str())
        .collect();
    if !paths.is_empty() {
        out.push_str("\n# PATH\n");
        for dir in paths {
            let dir = double_quote_escape(dir);
            out.push_str("case \":$PATH:\" in\n");
            let _ = writeln!(out, "    *\":{dir}:\"*) ;;");
            let _ = writeln!(out, "    *) export PATH=\"{dir}:$PATH\" ;;");
            out.push_str("esac\n");
        }
    }

    if !descriptor.aliases().is_empty() {
        out.push_str("\n# Aliases\n");
        for (name, command) in descriptor.aliases() {
            let _ = writeln!(out, "alias {name}='{}'", single_quote_escape(command));
        }
    }

    if !descriptor.wrappers().is_empty() {
        out.push_str("\n# Wrappers\n");
        for wrapper in descriptor.wrappers() {
            render_wrapper(&mut out, wrapper);
        }
    }

    if !descriptor.functions().is_empty() {
        out.push_str("\n# Functions\n");
        for function in descriptor.functions() {
            let _ = writeln!(out, "{}() {{", function.name);
            for line in function.body.trim().lines() {
                if line.is_empty() {
                    out.push('\n');
                } else {
                    let _ = writeln!(out, "    {line}");
                }
            }
            out.push_str("}\n");
        }

        let init: Vec<&str> = descriptor
            .functions()
            .iter()
            .filter(|f| f.is_init())
            .map(|f| f.name.as_str())
            .collect();
        if !init.is_empty() {
            out.push_str("\n# Init\n");
            for name in init {
                let _ = writeln!(out, "{name}");
            }
        }
    }

    out
}

fn render_wrapper(out: &mut String, wrapper: &Wrapper) {
    let _ = writeln!(out, "{}() {{", wrapper.name);
    if wrapper.requires_arg {
        let usage = wrapper
            .usage
            .clone()
            .unwrap_or_else(|| format!("{} <arg>", wrapper.name));
        out.push_str("    if [ -z \"$1\" ]; then\n");
        let _ = writeln!(out, "        echo \"Usage: {}\" >&2", double_quote_escape(&usage));
        out.push_str("        return 1\n");
        out.push_str("    fi\n");
    }

    let (call, first) = match &wrapper.default_arg {
        Some(default) => {
            let first = format!("\"${{1:-{}}}\"", double_quote_escape(default));
            (format!("{} {first} \"${{@:2}}\"", wrapper.command), first)
        }
        None => (format!("{} \"$@\"", wrapper.command), "\"$1\"".to_string()),
    };
    match wrapper.post_action {
        Some(PostAction::Cd) => {
            let _ = writeln!(out, "    {call} && cd {first}");
        }
        None => {
            let _ = writeln!(out, "    {call}");
        }
    }
    out.push_str("}\n");
}

/// Render the entrypoint that sources each component script in order.
#[must_use]
pub fn render_entrypoint(generated_dir: &Path, components: &[&str], shell: Shell) -> String {
    let mut out = String::new();
    out.push_str("#!/bin/sh\n");
    out.push_str("# acorn shell integration entrypoint\n");
    out.push_str(GENERATED_NOTICE);
    out.push('\n');
    out.push_str("# Source this file from your shell rc file\n\n");

    let _ = writeln!(
        out,
        "ACORN_GENERATED_DIR=\"{}\"",
        double_quote_escape(&generated_dir.display().to_string())
    );

    if !components.is_empty() {
        out.push('\n');
        for name in components {
            let _ = writeln!(
                out,
                "[ -f \"$ACORN_GENERATED_DIR/{name}.sh\" ] && . \"$ACORN_GENERATED_DIR/{name}.sh\""
            );
        }
    }

    out.push_str("\nif command -v acorn >/dev/null 2>&1; then\n");
    let _ = writeln!(out, "    eval \"$(acorn completion {shell})\"");
    out.push_str("fi\n");
    out
}

/// Serialize a component's structured config.
///
/// # Errors
///
/// Returns [`ResourceError::Encode`] if the payload cannot be represented in
/// the requested format.
pub fn render_config(
    component: &str,
    spec: &ConfigSpec,
    codecs: &CodecTable,
) -> Result<String, ResourceError> {
    codecs
        .get(spec.format)
        .encode(&spec.payload)
        .map_err(|message| ResourceError::Encode {
            component: component.to_string(),
            format: spec.format.to_string(),
            message,
        })
}

fn double_quote_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn single_quote_escape(value: &str) -> String {
    value.replace('\'', "'\\''")
}
