use super::*;
use crate::commands::common::ExitCode;
use crate::commands::test_support::{global_for, write_chain_project};
use std::fs;
use tempfile::tempdir;

#[tokio::test]
async fn test_validate_accepts_chain() {
    let dir = tempdir().unwrap();
    write_chain_project(dir.path());

    execute(&ValidateArgs::default(), &global_for(dir.path()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_validate_cycle_exits_with_3() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("config.json"),
        r#"{"modules": {
            "000_a": {"name": "A", "dependencies": ["010_b"]},
            "010_b": {"name": "B", "dependencies": ["000_a"]}
        }}"#,
    )
    .unwrap();

    let err = execute(&ValidateArgs::default(), &global_for(dir.path()))
        .await
        .unwrap_err();
    assert_eq!(err.downcast_ref::<ExitCode>().map(|c| c.0), Some(3));
}

#[tokio::test]
async fn test_validate_structure_error_exits_with_1() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("config.json"),
        r#"{"modules": {"010_auth": {"dependencies": []}}}"#,
    )
    .unwrap();

    let err = execute(&ValidateArgs::default(), &global_for(dir.path()))
        .await
        .unwrap_err();
    assert_eq!(err.downcast_ref::<ExitCode>().map(|c| c.0), Some(1));
}

#[tokio::test]
async fn test_validate_missing_config_is_an_error() {
    let dir = tempdir().unwrap();
    let err = execute(&ValidateArgs::default(), &global_for(dir.path()))
        .await
        .unwrap_err();
    assert!(err.downcast_ref::<ExitCode>().is_none());
    assert!(format!("{err:#}").contains("MG001"));
}
