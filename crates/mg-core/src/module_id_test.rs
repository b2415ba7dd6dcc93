use super::*;

#[test]
fn test_valid_ids() {
    for id in ["000_admin", "010_auth", "1_x", "9999_app_schema2", "020_schema_v2"] {
        assert!(ModuleId::is_valid(id), "{id} should be valid");
    }
}

#[test]
fn test_invalid_ids() {
    for id in [
        "",
        "auth",
        "010",
        "010_",
        "10000_too_long",
        "010_Auth",
        "010-auth",
        "010_2fa",
        "_auth",
        "010_auth/",
    ] {
        assert!(!ModuleId::is_valid(id), "{id} should be invalid");
    }
}

#[test]
fn test_prefix_ordinal_and_name() {
    let id = ModuleId::parse("010_user_auth").unwrap();
    assert_eq!(id.prefix(), "010");
    assert_eq!(id.ordinal(), 10);
    assert_eq!(id.name(), "user_auth");
}

#[test]
fn test_parse_error_names_the_id() {
    let err = ModuleId::parse("Auth").unwrap_err();
    assert!(matches!(err, CoreError::InvalidModuleId { ref id } if id == "Auth"));
    assert!(err.to_string().contains("Auth"));
}

#[test]
fn test_deserialize_rejects_invalid() {
    let ok: ModuleId = serde_json::from_str("\"000_admin\"").unwrap();
    assert_eq!(ok, "000_admin");
    assert!(serde_json::from_str::<ModuleId>("\"admin\"").is_err());
}

#[test]
fn test_ordering_is_lexicographic() {
    let mut ids = vec![
        ModuleId::parse("020_schema").unwrap(),
        ModuleId::parse("000_admin").unwrap(),
        ModuleId::parse("010_auth").unwrap(),
    ];
    ids.sort();
    let names: Vec<&str> = ids.iter().map(|i| i.as_str()).collect();
    assert_eq!(names, vec!["000_admin", "010_auth", "020_schema"]);
}
