use super::*;
use std::fs;
use tempfile::tempdir;

const CHAIN_CONFIG: &str = r#"{
  "modules": {
    "000_admin": {
      "name": "System Administration",
      "description": "Core database setup",
      "dependencies": [],
      "locked": true,
      "lockReason": "Critical system module"
    },
    "010_auth": { "name": "Authentication", "dependencies": ["000_admin"] },
    "020_schema": { "name": "Application Schema", "dependencies": ["010_auth"] }
  },
  "environments": ["development", "staging", "production"],
  "settings": {
    "configFormat": "json",
    "useTransactions": true,
    "defaultNamespace": "app",
    "defaultDatabase": "development"
  }
}"#;

#[test]
fn test_load_from_root() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.json"), CHAIN_CONFIG).unwrap();

    let config = Config::load(dir.path(), None).unwrap();
    assert_eq!(config.modules().len(), 3);
    let ids: Vec<&str> = config.modules().ids().map(|id| id.as_str()).collect();
    assert_eq!(ids, vec!["000_admin", "010_auth", "020_schema"]);

    let admin = config.module("000_admin").unwrap();
    assert!(admin.locked);
    assert_eq!(admin.lock_reason.as_deref(), Some("Critical system module"));

    let settings = config.settings().unwrap();
    assert_eq!(settings.config_format, Some(ConfigFormat::Json));
    assert_eq!(settings.default_namespace.as_deref(), Some("app"));
}

#[test]
fn test_declaration_order_preserved() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("config.json"),
        r#"{"modules": {
            "020_schema": {"name": "Schema", "dependencies": []},
            "000_admin": {"name": "Admin", "dependencies": []}
        }}"#,
    )
    .unwrap();
    let config = Config::load(dir.path(), None).unwrap();
    let ids: Vec<&str> = config.modules().ids().map(|id| id.as_str()).collect();
    assert_eq!(ids, vec!["020_schema", "000_admin"]);
}

#[test]
fn test_config_not_found() {
    let dir = tempdir().unwrap();
    let err = Config::load(dir.path(), None).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
    assert!(Config::load_optional(dir.path(), None).unwrap().is_none());
}

#[test]
fn test_override_relative_to_root() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("conf")).unwrap();
    fs::write(dir.path().join("conf/modules.json"), CHAIN_CONFIG).unwrap();

    let config = Config::load(dir.path(), Some(Path::new("conf/modules.json"))).unwrap();
    assert_eq!(config.modules().len(), 3);

    let err = Config::load(dir.path(), Some(Path::new("missing.json"))).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { ref path } if path.contains("missing.json")));
}

#[test]
fn test_json_preferred_over_yaml() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.json"), CHAIN_CONFIG).unwrap();
    fs::write(dir.path().join("config.yaml"), "modules: {}").unwrap();
    assert_eq!(Config::find(dir.path()).unwrap(), dir.path().join("config.json"));
    assert!(Config::load(dir.path(), None).is_ok());
}

#[test]
fn test_parse_error_carries_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{ \"modules\": { ").unwrap();

    let err = Config::load(dir.path(), None).unwrap_err();
    match err {
        CoreError::ConfigParse { path: p, .. } => assert_eq!(p, path.display().to_string()),
        other => panic!("expected ConfigParse, got {other:?}"),
    }
}

#[test]
fn test_non_utf8_config_is_parse_error() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.json"), b"{\"modules\": {\xff}}").unwrap();

    match Config::load(dir.path(), None).unwrap_err() {
        CoreError::ConfigParse { message, .. } => assert!(message.contains("UTF-8"), "{message}"),
        other => panic!("expected ConfigParse, got {other:?}"),
    }
}

#[test]
fn test_json_shaped_yaml_accepted() {
    let dir = tempdir().unwrap();
    let content = format!("# migrations config\n{CHAIN_CONFIG}");
    fs::write(dir.path().join("config.yml"), content).unwrap();
    let config = Config::load(dir.path(), None).unwrap();
    assert_eq!(config.modules().len(), 3);
}

#[test]
fn test_real_yaml_rejected() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("config.yaml"),
        "modules:\n  010_auth:\n    name: Auth\n    dependencies: []\n",
    )
    .unwrap();
    let err = Config::load(dir.path(), None).unwrap_err();
    assert!(matches!(err, CoreError::ConfigParse { .. }));
    assert!(err.to_string().contains("YAML syntax is not supported"));
}

#[test]
fn test_unsupported_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "modules = {}").unwrap();
    let err = Config::load_file(&path).unwrap_err();
    assert!(err.to_string().contains("unsupported config format"));
}

#[test]
fn test_validation_error_lists_every_violation() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("config.json"),
        r#"{"modules": {
            "auth": {"name": "Auth", "dependencies": []},
            "010_users": {"dependencies": ["000_missing"]}
        }}"#,
    )
    .unwrap();
    let err = Config::load(dir.path(), None).unwrap_err();
    let CoreError::ConfigValidation { violations, .. } = &err else {
        panic!("expected ConfigValidation, got {err:?}");
    };
    assert_eq!(violations.len(), 3);
    let msg = err.to_string();
    assert!(msg.contains("modules.auth"));
    assert!(msg.contains("modules.010_users.name"));
    assert!(msg.contains("000_missing"));
}

#[test]
fn test_scaffold_chains_modules() {
    let ids: Vec<ModuleId> = ["020_schema", "000_admin", "010_user_auth"]
        .iter()
        .map(|s| ModuleId::parse(s).unwrap())
        .collect();
    let config = Config::scaffold(&ids);

    let order: Vec<&str> = config.modules().ids().map(|id| id.as_str()).collect();
    assert_eq!(order, vec!["000_admin", "010_user_auth", "020_schema"]);

    let auth = config.module("010_user_auth").unwrap();
    assert_eq!(auth.name, "User auth");
    assert_eq!(auth.description.as_deref(), Some("user_auth module"));
    assert!(auth.dependencies.contains("000_admin"));
    assert!(config.module("000_admin").unwrap().dependencies.is_empty());
    assert_eq!(config.settings().unwrap().use_transactions, Some(true));
}

#[test]
fn test_write_atomic_round_trips() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.json"), CHAIN_CONFIG).unwrap();
    let config = Config::load(dir.path(), None).unwrap();

    let out = dir.path().join("rewritten.json");
    config.write_atomic(&out).unwrap();
    let reloaded = Config::load_file(&out).unwrap();
    assert_eq!(reloaded, config);

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("\"lockReason\""));
    assert!(text.ends_with('\n'));
}

#[test]
fn test_add_module_to_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, CHAIN_CONFIG).unwrap();

    let module = ModuleConfig {
        name: "Billing".to_string(),
        description: None,
        dependencies: [ModuleId::parse("010_auth").unwrap()].into_iter().collect(),
        locked: false,
        lock_reason: None,
    };
    let id = ModuleId::parse("030_billing").unwrap();
    assert!(Config::add_module_to_file(&path, id.clone(), module.clone()).unwrap());
    // second add is a no-op
    assert!(!Config::add_module_to_file(&path, id, module).unwrap());

    let config = Config::load_file(&path).unwrap();
    assert_eq!(config.modules().len(), 4);
    let last = config.modules().ids().last().unwrap();
    assert_eq!(last, "030_billing");
}
