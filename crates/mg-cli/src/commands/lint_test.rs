use super::*;
use crate::commands::test_support::{global_for, write_chain_project, write_module};
use std::fs;
use tempfile::tempdir;

fn exit_code(result: Result<()>) -> Option<i32> {
    result
        .err()
        .and_then(|e| e.downcast_ref::<ExitCode>().map(|c| c.0))
}

#[tokio::test]
async fn test_lint_clean_project_succeeds() {
    let dir = tempdir().unwrap();
    write_chain_project(dir.path());
    let args = LintArgs {
        format: LintFormat::Text,
    };
    execute(&args, &global_for(dir.path())).await.unwrap();
}

#[tokio::test]
async fn test_lint_warnings_do_not_fail() {
    let dir = tempdir().unwrap();
    // no config: config-missing is a warning
    write_module(dir.path(), "010_auth", &["users"]);
    let args = LintArgs {
        format: LintFormat::Json,
    };
    execute(&args, &global_for(dir.path())).await.unwrap();
}

#[tokio::test]
async fn test_lint_errors_exit_1() {
    let dir = tempdir().unwrap();
    write_chain_project(dir.path());
    fs::remove_file(dir.path().join("010_auth/0001_authentication_down.surql")).unwrap();

    let args = LintArgs {
        format: LintFormat::Text,
    };
    assert_eq!(exit_code(execute(&args, &global_for(dir.path())).await), Some(1));
}

#[tokio::test]
async fn test_lint_cycle_exits_3() {
    let dir = tempdir().unwrap();
    write_module(dir.path(), "000_a", &["x"]);
    write_module(dir.path(), "010_b", &["y"]);
    fs::write(
        dir.path().join("config.json"),
        r#"{"modules": {
            "000_a": {"name": "A", "dependencies": ["010_b"]},
            "010_b": {"name": "B", "dependencies": ["000_a"]}
        }}"#,
    )
    .unwrap();

    let args = LintArgs {
        format: LintFormat::Json,
    };
    assert_eq!(exit_code(execute(&args, &global_for(dir.path())).await), Some(3));
}

#[tokio::test]
async fn test_lint_missing_root_is_fatal() {
    let dir = tempdir().unwrap();
    let args = LintArgs {
        format: LintFormat::Text,
    };
    let err = execute(&args, &global_for(&dir.path().join("nope")))
        .await
        .unwrap_err();
    assert!(err.downcast_ref::<ExitCode>().is_none());
}
