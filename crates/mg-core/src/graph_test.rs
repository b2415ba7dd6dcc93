use super::*;
use std::path::Path;

fn config_from(json: &str) -> Config {
    Config::parse(json, Path::new("config.json")).unwrap()
}

fn ids(list: &[ModuleId]) -> Vec<&str> {
    list.iter().map(|m| m.as_str()).collect()
}

fn chain() -> ModuleGraph {
    ModuleGraph::from_config(&config_from(crate::test_utils::CHAIN_CONFIG)).unwrap()
}

#[test]
fn test_apply_order_dependencies_first() {
    let graph = chain();
    assert_eq!(
        ids(&graph.apply_order()),
        vec!["000_admin", "010_auth", "020_schema"]
    );
    assert_eq!(
        ids(&graph.rollback_order()),
        vec!["020_schema", "010_auth", "000_admin"]
    );
}

#[test]
fn test_apply_order_ties_broken_by_id() {
    // declaration order deliberately scrambled
    let graph = ModuleGraph::from_config(&config_from(
        r#"{"modules": {
            "030_reports": {"name": "Reports", "dependencies": ["010_auth", "020_billing"]},
            "020_billing": {"name": "Billing", "dependencies": ["000_admin"]},
            "010_auth": {"name": "Auth", "dependencies": ["000_admin"]},
            "005_audit": {"name": "Audit", "dependencies": []},
            "000_admin": {"name": "Admin", "dependencies": []}
        }}"#,
    ))
    .unwrap();
    assert_eq!(
        ids(&graph.apply_order()),
        vec!["000_admin", "005_audit", "010_auth", "020_billing", "030_reports"]
    );
}

#[test]
fn test_ordinal_does_not_override_dependencies() {
    let graph = ModuleGraph::from_config(&config_from(
        r#"{"modules": {
            "000_views": {"name": "Views", "dependencies": ["090_tables"]},
            "090_tables": {"name": "Tables", "dependencies": []}
        }}"#,
    ))
    .unwrap();
    assert_eq!(ids(&graph.apply_order()), vec!["090_tables", "000_views"]);
}

#[test]
fn test_apply_plan_includes_ancestors() {
    let graph = chain();
    let plan = graph
        .apply_plan(&[ModuleId::parse("010_auth").unwrap()])
        .unwrap();
    assert_eq!(ids(&plan), vec!["000_admin", "010_auth"]);
}

#[test]
fn test_rollback_plan_includes_dependents() {
    let graph = chain();
    let plan = graph
        .rollback_plan(&[ModuleId::parse("010_auth").unwrap()], false)
        .unwrap();
    assert_eq!(ids(&plan), vec!["020_schema", "010_auth"]);
}

#[test]
fn test_rollback_of_locked_module_requires_force() {
    let graph = chain();
    let admin = [ModuleId::parse("000_admin").unwrap()];

    let err = graph.rollback_plan(&admin, false).unwrap_err();
    match err {
        CoreError::ModuleLocked { module, reason } => {
            assert_eq!(module, "000_admin");
            assert_eq!(reason, "Critical system module");
        }
        other => panic!("expected ModuleLocked, got {other:?}"),
    }

    let plan = graph.rollback_plan(&admin, true).unwrap();
    assert_eq!(ids(&plan), vec!["020_schema", "010_auth", "000_admin"]);
}

#[test]
fn test_plan_for_unknown_module() {
    let graph = chain();
    let err = graph
        .apply_plan(&[ModuleId::parse("099_ghost").unwrap()])
        .unwrap_err();
    assert!(matches!(err, CoreError::ModuleNotFound { ref selector } if selector == "099_ghost"));
}

#[test]
fn test_neighbours_and_closure() {
    let graph = chain();
    assert_eq!(graph.dependencies("010_auth"), vec!["000_admin"]);
    assert_eq!(graph.dependents("010_auth"), vec!["020_schema"]);
    assert_eq!(graph.ancestors("020_schema").len(), 2);
    assert!(graph.descendants("000_admin").contains("020_schema"));
    assert!(graph.dependencies("999_none").is_empty());
    assert_eq!(graph.lock_reason("000_admin"), Some("Critical system module"));
    assert_eq!(graph.len(), 3);
}

#[test]
fn test_empty_graph() {
    let graph = ModuleGraph::from_config(&Config::default()).unwrap();
    assert!(graph.is_empty());
    assert!(graph.apply_order().is_empty());
}
