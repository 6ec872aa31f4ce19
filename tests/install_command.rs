#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the `install` and `uninstall` task lists.
//!
//! These drive the same task lists the commands run, against an isolated
//! home directory, and check the end-to-end effects on disk.

mod common;

use std::collections::HashSet;

use acorn_cli::logging::TaskStatus;
use acorn_cli::resources::rc_block::{BlockState, END_MARKER, RcFile, START_MARKER};
use acorn_cli::tasks;
use common::TestContextBuilder;

fn run_all(list: &[Box<dyn tasks::Task>], ctx: &tasks::Context) {
    for task in list {
        tasks::execute(task.as_ref(), ctx);
    }
}

// ---------------------------------------------------------------------------
// Task list shape
// ---------------------------------------------------------------------------

#[test]
fn install_task_names() {
    let names: Vec<String> = tasks::install_tasks()
        .iter()
        .map(|t| t.name().to_string())
        .collect();
    insta::assert_snapshot!(names.join("\n"), @r"
    Generate artifacts
    Publish artifacts
    Inject rc block
    ");
}

#[test]
fn uninstall_task_names() {
    let names = |unpublish| {
        tasks::uninstall_tasks(unpublish)
            .iter()
            .map(|t| t.name().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    };
    insta::assert_snapshot!(names(false), @"Eject rc block");
    insta::assert_snapshot!(names(true), @r"
    Eject rc block
    Unpublish artifacts
    ");
}

#[test]
fn task_names_are_unique() {
    let list = tasks::install_tasks();
    let mut seen: HashSet<&str> = HashSet::new();
    for task in &list {
        assert!(seen.insert(task.name()), "duplicate task: {}", task.name());
    }
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[test]
fn install_generates_publishes_and_injects() {
    let env = TestContextBuilder::new()
        .with_sample_components()
        .with_rc_content("export USER_LINE=1\n")
        .build();
    let ctx = env.context(false);

    run_all(&tasks::install_tasks(), &ctx);

    assert_eq!(env.log.failure_count(), 0);
    let files: Vec<String> = env
        .generated_snapshot()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(files, ["core.sh", "k9s.sh", "k9s.yaml", "shell.sh"]);
    for name in &files {
        let link = env.settings.link_dir.join(name);
        assert!(link.is_symlink(), "{name} should be published");
    }

    let rc = env.read(&env.settings.rc_file);
    assert!(rc.starts_with("export USER_LINE=1\n"));
    assert!(rc.contains(START_MARKER));
    assert!(rc.contains(END_MARKER));

    let report = ctx.report();
    assert_eq!(report.generate.unwrap().artifacts.len(), 4);
    assert_eq!(report.publish.unwrap().failures(), 0);
}

#[cfg(unix)]
#[test]
fn install_does_not_inject_when_entrypoint_is_taken() {
    let original = "export USER_LINE=1\n";
    let env = TestContextBuilder::new()
        .with_sample_components()
        .with_rc_content(original)
        .build();
    let published = env.settings.published_entrypoint();
    std::fs::create_dir_all(&env.settings.link_dir).unwrap();
    std::fs::write(&published, "echo mine\n").unwrap();
    let ctx = env.context(false);

    run_all(&tasks::install_tasks(), &ctx);

    let statuses: Vec<(String, TaskStatus)> = env
        .log
        .task_entries()
        .into_iter()
        .map(|e| (e.name, e.status))
        .collect();
    assert_eq!(
        statuses,
        [
            ("Generate artifacts".to_string(), TaskStatus::Ok),
            ("Publish artifacts".to_string(), TaskStatus::Failed),
            ("Inject rc block".to_string(), TaskStatus::Failed),
        ]
    );
    assert_eq!(env.read(&published), "echo mine\n");
    assert_eq!(env.read(&env.settings.rc_file), original);
    assert!(env.settings.link_dir.join("core.sh").is_symlink());
}

#[cfg(unix)]
#[test]
fn second_install_changes_nothing() {
    let env = TestContextBuilder::new().with_sample_components().build();
    run_all(&tasks::install_tasks(), &env.context(false));
    let generated = env.generated_snapshot();
    let rc = env.read(&env.settings.rc_file);

    run_all(&tasks::install_tasks(), &env.context(false));

    assert_eq!(env.generated_snapshot(), generated);
    assert_eq!(env.read(&env.settings.rc_file), rc);
    assert_eq!(env.log.failure_count(), 0);
}

#[cfg(unix)]
#[test]
fn dry_run_install_writes_nothing() {
    let env = TestContextBuilder::new().with_sample_components().build();

    run_all(&tasks::install_tasks(), &env.context(true));

    assert!(!env.settings.generated_dir.exists());
    assert!(!env.settings.rc_file.exists());
    assert_eq!(env.log.failure_count(), 0);
}

#[cfg(unix)]
#[test]
fn uninstall_restores_rc_and_keeps_generated_files() {
    let original = "# user config\nalias g=git\n";
    let env = TestContextBuilder::new()
        .with_sample_components()
        .with_rc_content(original)
        .build();
    run_all(&tasks::install_tasks(), &env.context(false));

    run_all(&tasks::uninstall_tasks(false), &env.context(false));

    assert_eq!(env.read(&env.settings.rc_file), original);
    assert!(env.settings.link_dir.join("shell.sh").is_symlink());
    assert!(env.settings.generated_dir.join("shell.sh").is_file());
    let rc = RcFile::new(
        env.settings.rc_file.clone(),
        &env.settings.published_entrypoint(),
    );
    assert_eq!(rc.state().unwrap(), BlockState::NotPresent);
}
