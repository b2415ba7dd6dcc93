//! Import command implementation

use anyhow::{Context, Result};
use mg_core::{import_module, ImportOptions};

use crate::cli::{GlobalArgs, ImportArgs};
use crate::commands::common;

/// Execute the import command
pub(crate) async fn execute(args: &ImportArgs, global: &GlobalArgs) -> Result<()> {
    let root = common::root(global).to_path_buf();
    let module = args.module.clone();
    let package = args.package.clone();
    let options = ImportOptions {
        overwrite: args.overwrite,
        merge_config: !args.no_merge_config,
        config_path: global.config.clone(),
    };

    let imported =
        tokio::task::spawn_blocking(move || import_module(&root, &module, &package, &options))
            .await
            .context("Import task panicked")?
            .with_context(|| {
                format!(
                    "Failed to import {} as '{}'",
                    args.package.display(),
                    args.module
                )
            })?;

    for warning in &imported.warnings {
        eprintln!("warning: {}", warning);
    }
    println!(
        "Imported {} files into {}",
        imported.files.len(),
        imported.module_id
    );
    if imported.config_updated {
        println!("Added {} to config", imported.module_id);
    }
    Ok(())
}

#[cfg(test)]
#[path = "import_test.rs"]
mod tests;
