// tests/config_loading.rs

mod common;

use std::io::Write;

use tasktree::config::{from_toml_str, load_and_validate};
use tasktree::{Action, EngineContext, IdStrategy, LogLevel, Task, TaskError, TaskState};
use tempfile::NamedTempFile;

use common::{init_tracing, with_timeout};

#[test]
fn full_config_loads_from_disk() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[ids]
strategy = "sequential"
prefix = "job"

[status]
failed = "Job failed."

[logging]
level = "debug"
"#
    )
    .unwrap();

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.ids.strategy, IdStrategy::Sequential);
    assert_eq!(cfg.ids.prefix, "job");
    assert_eq!(cfg.status.failed, "Job failed.");
    assert_eq!(cfg.logging.level, Some(LogLevel::Debug));
}

#[test]
fn empty_file_uses_defaults() {
    let file = NamedTempFile::new().unwrap();
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.ids.strategy, IdStrategy::Uuid);
    assert_eq!(cfg.status.failed, "The task has failed due to an error.");
    assert_eq!(cfg.logging.level, None);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_and_validate(dir.path().join("Tasktree.toml"));
    assert!(matches!(result, Err(TaskError::IoError(_))));
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let result = from_toml_str("[ids\nstrategy = 1");
    assert!(matches!(result, Err(TaskError::TomlError(_))));
}

#[test]
fn unknown_strategy_is_rejected() {
    let result = from_toml_str("[ids]\nstrategy = \"random\"\n");
    assert!(matches!(result, Err(TaskError::TomlError(_))));
}

#[test]
fn invalid_values_are_config_errors() {
    let result = from_toml_str("[status]\nfailed = \"\"\n");
    match result {
        Err(TaskError::ConfigError(msg)) => assert!(msg.contains("[status].failed")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[tokio::test]
async fn configured_context_drives_ids_and_failure_status() {
    init_tracing();
    let cfg = from_toml_str(
        r#"
[ids]
strategy = "sequential"
prefix = "job"

[status]
failed = "Job failed."
"#,
    )
    .unwrap();
    let ctx = EngineContext::from_config(&cfg);

    let root: Task<u32> = Task::builder("root").context(ctx).build().unwrap();
    root.add(Action::<u32>::named_fn("broken", |_, _| {
        Err(anyhow::anyhow!("nope"))
    }))
    .unwrap();

    assert_eq!(root.id().to_string(), "job-1");
    let child = root.children()[0].clone();
    assert_eq!(child.id().to_string(), "job-2");
    assert_eq!(child.context().failure_status(), "Job failed.");

    let err = with_timeout(root.run()).await.unwrap_err();
    assert!(matches!(err, TaskError::ActionFailure { .. }));
    assert_eq!(child.state(), TaskState::Failed);
    assert_eq!(child.status(), "Job failed.");
}
