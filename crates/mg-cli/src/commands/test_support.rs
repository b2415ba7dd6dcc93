//! Helpers shared by command tests

use std::fs;
use std::path::Path;

use crate::cli::GlobalArgs;

pub(crate) fn global_for(root: &Path) -> GlobalArgs {
    GlobalArgs {
        verbose: false,
        root: root.to_path_buf(),
        config: None,
    }
}

/// Create a module directory with an up/down pair per label.
pub(crate) fn write_module(root: &Path, id: &str, labels: &[&str]) {
    fs::create_dir_all(root.join(id)).unwrap();
    for (i, label) in labels.iter().enumerate() {
        let seq = format!("{:04}", i + 1);
        fs::write(
            root.join(id).join(format!("{seq}_{label}_up.surql")),
            format!("DEFINE TABLE IF NOT EXISTS {label};\n"),
        )
        .unwrap();
        fs::write(
            root.join(id).join(format!("{seq}_{label}_down.surql")),
            format!("REMOVE TABLE IF EXISTS {label};\n"),
        )
        .unwrap();
    }
}

/// `000_admin` (locked) <- `010_auth` <- `020_schema`, on disk and in config.
pub(crate) fn write_chain_project(root: &Path) {
    write_module(root, "000_admin", &["setup"]);
    write_module(root, "010_auth", &["authentication"]);
    write_module(root, "020_schema", &["tables"]);
    fs::write(
        root.join("config.json"),
        r#"{
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
}"#,
    )
    .unwrap();
}
