//! Shared test helpers for building migration roots on disk.

use std::fs;
use std::path::Path;

/// Write a file under `root`, creating parent directories.
pub(crate) fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Create a module directory with an up/down pair per label.
pub(crate) fn write_module(root: &Path, id: &str, labels: &[&str]) {
    fs::create_dir_all(root.join(id)).unwrap();
    for (i, label) in labels.iter().enumerate() {
        let seq = format!("{:04}", i + 1);
        write_file(
            root,
            &format!("{id}/{seq}_{label}_up.surql"),
            &format!("DEFINE TABLE IF NOT EXISTS {label};\n"),
        );
        write_file(
            root,
            &format!("{id}/{seq}_{label}_down.surql"),
            &format!("REMOVE TABLE IF EXISTS {label};\n"),
        );
    }
}

/// The admin -> auth -> schema chain used across tests.
pub(crate) const CHAIN_CONFIG: &str = r#"{
  "modules": {
    "000_admin": {
      "name": "System Administration",
      "dependencies": [],
      "locked": true,
      "lockReason": "Critical system module"
    },
    "010_auth": { "name": "Authentication", "dependencies": ["000_admin"] },
    "020_schema": { "name": "Application Schema", "dependencies": ["010_auth"] }
  }
}"#;

/// A root with the three chain modules on disk and `config.json`.
pub(crate) fn write_chain_project(root: &Path) {
    write_module(root, "000_admin", &["setup"]);
    write_module(root, "010_auth", &["authentication"]);
    write_module(root, "020_schema", &["tables"]);
    write_file(root, "config.json", CHAIN_CONFIG);
}
