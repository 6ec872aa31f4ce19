use std::path::Path;
use std::process::Command;

/// Release pipelines pin the version through this variable.
const VERSION_VAR: &str = "ACORN_VERSION";

fn main() {
    let version = std::env::var(VERSION_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(git_describe)
        .unwrap_or_else(|| format!("{}-untracked", env!("CARGO_PKG_VERSION")));
    println!("cargo:rustc-env={VERSION_VAR}={version}");

    if let Ok(target) = std::env::var("TARGET") {
        println!("cargo:rustc-env=ACORN_TARGET={target}");
    }

    println!("cargo:rerun-if-env-changed={VERSION_VAR}");
    println!("cargo:rerun-if-changed=src/config/default_scaffold.yaml");
    if Path::new(".git").is_dir() {
        println!("cargo:rerun-if-changed=.git/HEAD");
        println!("cargo:rerun-if-changed=.git/refs/tags");
    }
}

/// `git describe` for checkouts; `None` outside a repository or without git.
fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty=+dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();
    (!described.is_empty()).then(|| described.trim_start_matches('v').to_string())
}
